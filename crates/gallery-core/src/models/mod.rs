//! Data models for Prompt Gallery

mod category;
mod identity;
mod item;
mod upload;

pub use category::Category;
pub use identity::Identity;
pub use item::{sort_newest_first, GalleryItem, ItemId, ItemRecord};
pub use upload::{UploadForm, ValidatedUpload, ValidationError};
