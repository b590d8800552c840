/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures and the durable JSON form (data.rs)
/// - The photo gallery store: load, capture, persist, subscribe (gallery.rs)

pub mod data;
pub mod gallery;

pub use data::PhotoRecord;
pub use gallery::PhotoGallery;
