use iced::futures::stream;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, scrollable, text, Column};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod error;
mod platform;
mod state;
mod ui;

#[cfg(test)]
mod test_helpers;

use config::Settings;
use error::GalleryError;
use state::{PhotoGallery, PhotoRecord};

/// Main application state
struct PhotoGalleryApp {
    /// The photo store
    gallery: Arc<PhotoGallery>,
    /// Image handles for the grid, rebuilt whenever the photo list changes
    cells: Vec<Handle>,
    /// True once saved photos were loaded; captures are refused before that
    loaded: bool,
    /// True while a capture is running
    capturing: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Startup load finished
    Loaded(Result<Vec<PhotoRecord>, String>),
    /// User pressed the capture button
    TakePhoto,
    /// Capture finished with a status line
    PhotoTaken(Result<String, String>),
    /// The gallery published a new photo list
    PhotosChanged(Vec<PhotoRecord>),
}

impl PhotoGalleryApp {
    /// Create the application and start loading saved photos
    fn new(gallery: Arc<PhotoGallery>) -> (Self, Task<Message>) {
        let loader = gallery.clone();
        let load = Task::perform(
            async move {
                loader
                    .load()
                    .await
                    .map_err(|e| e.to_string())
            },
            Message::Loaded,
        );

        (
            PhotoGalleryApp {
                gallery,
                cells: Vec::new(),
                loaded: false,
                capturing: false,
                status: "Loading photos...".to_string(),
            },
            load,
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded(Ok(photos)) => {
                // The subscription may have started after load published
                self.cells = ui::grid::handles(&photos);
                self.loaded = true;
                self.status = format!("Ready. {} photos in gallery.", photos.len());
                Task::none()
            }
            Message::Loaded(Err(err)) => {
                warn!("⚠️  Failed to load photos: {}", err);
                self.status = format!("Failed to load photos: {}", err);
                Task::none()
            }
            Message::TakePhoto => {
                if !self.can_capture() {
                    return Task::none();
                }
                self.capturing = true;
                self.status = "Waiting for camera...".to_string();

                let gallery = self.gallery.clone();
                Task::perform(
                    async move {
                        match gallery.take_photo().await {
                            Ok(photo) => Ok(format!("Saved {}", photo.storage_path)),
                            Err(GalleryError::CaptureCancelled) => Ok("Capture cancelled.".to_string()),
                            Err(err) => Err(err.to_string()),
                        }
                    },
                    Message::PhotoTaken,
                )
            }
            Message::PhotoTaken(result) => {
                self.capturing = false;
                self.status = match result {
                    Ok(status) => status,
                    Err(err) => {
                        warn!("⚠️  Capture failed: {}", err);
                        format!("Capture failed: {}", err)
                    }
                };
                Task::none()
            }
            Message::PhotosChanged(photos) => {
                self.cells = ui::grid::handles(&photos);
                Task::none()
            }
        }
    }

    fn can_capture(&self) -> bool {
        self.loaded && !self.capturing
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let content: Column<Message> = column![
            text("Photo Gallery").size(32),
            scrollable(ui::grid::view(&self.cells)).height(Length::Fill),
            text(&self.status).size(16),
            button("Take Photo")
                .on_press_maybe(self.can_capture().then_some(Message::TakePhoto))
                .padding(10),
        ]
        .spacing(20)
        .padding(20)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Forward every photo list change from the gallery
    fn subscription(&self) -> Subscription<Message> {
        let receiver = self.gallery.subscribe();
        Subscription::run_with_id(
            "photos",
            stream::unfold(receiver, |mut receiver| async move {
                receiver.changed().await.ok()?;
                let photos = receiver.borrow_and_update().clone();
                Some((Message::PhotosChanged(photos), receiver))
            }),
        )
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photo_gallery=info".into()),
        )
        .init();

    let settings = Settings::from_env();
    let gallery = Arc::new(PhotoGallery::from_settings(&settings)?);
    info!(
        "🎨 Photo Gallery starting ({} runtime, data in {})",
        gallery.runtime_kind(),
        settings.data_dir.display()
    );

    iced::application("Photo Gallery", PhotoGalleryApp::update, PhotoGalleryApp::view)
        .subscription(PhotoGalleryApp::subscription)
        .theme(PhotoGalleryApp::theme)
        .centered()
        .run_with(move || PhotoGalleryApp::new(gallery))?;

    Ok(())
}
