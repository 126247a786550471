//! UI Components
//!
//! Screens and widgets for the gallery window.

mod ad_overlay;
mod gallery_grid;
mod header;
mod item_card;
mod status_screens;
mod upload_panel;

pub use ad_overlay::AdOverlay;
pub use gallery_grid::GalleryGrid;
pub use header::Header;
pub use status_screens::{ErrorScreen, LoadingScreen};
pub use upload_panel::UploadPanel;
