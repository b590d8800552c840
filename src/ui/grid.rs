/// Photo grid
///
/// Two fixed-width columns laid out with iced_aw's Wrap, one cell per photo
/// in gallery order. Photos without a display URL are left out.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use iced::widget::image::Handle;
use iced::widget::{container, Image};
use iced::{ContentFit, Element, Length};
use iced_aw::Wrap;
use std::path::PathBuf;
use tracing::warn;

use crate::platform::{local_path, split_data_url};
use crate::state::PhotoRecord;
use crate::Message;

const CELL_WIDTH: f32 = 240.0;
const CELL_SPACING: f32 = 8.0;
const COLUMNS: f32 = 2.0;

/// Where the bytes behind a display URL come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inlined data URL payload
    Bytes(Vec<u8>),
    /// File on disk
    Path(PathBuf),
}

/// Resolve a display URL into something iced can load
pub fn image_source(display_url: &str) -> Option<ImageSource> {
    if display_url.is_empty() {
        return None;
    }

    if display_url.starts_with("data:") {
        let decoded = split_data_url(display_url)
            .ok()
            .and_then(|(_, payload)| STANDARD.decode(payload).ok());
        if decoded.is_none() {
            warn!("Skipping photo with an unreadable data URL");
        }
        return decoded.map(ImageSource::Bytes);
    }

    Some(ImageSource::Path(local_path(display_url)))
}

/// Image handles for every displayable photo, in order
pub fn handles(photos: &[PhotoRecord]) -> Vec<Handle> {
    photos
        .iter()
        .filter_map(|photo| photo.display_url.as_deref())
        .filter_map(image_source)
        .map(|source| match source {
            ImageSource::Bytes(bytes) => Handle::from_bytes(bytes),
            ImageSource::Path(path) => Handle::from_path(path),
        })
        .collect()
}

pub fn view(handles: &[Handle]) -> Element<'_, Message> {
    let cells: Vec<Element<Message>> = handles
        .iter()
        .map(|handle| {
            Image::new(handle.clone())
                .width(Length::Fixed(CELL_WIDTH))
                .height(Length::Fixed(CELL_WIDTH))
                .content_fit(ContentFit::Cover)
                .into()
        })
        .collect();

    let grid = Wrap::with_elements(cells)
        .spacing(CELL_SPACING)
        .line_spacing(CELL_SPACING);

    container(grid)
        .width(Length::Fixed(COLUMNS * CELL_WIDTH + (COLUMNS - 1.0) * CELL_SPACING))
        .into()
}
