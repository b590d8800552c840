/// User interface components
///
/// - `grid.rs` - photo grid and display URL to image handle resolution

pub mod grid;
