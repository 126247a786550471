//! gallery-core - Core library for Prompt Gallery
//!
//! This crate contains the models, identity and document-store capabilities,
//! and the session, gallery, and unlock state machines shared by the desktop
//! client.

pub mod auth;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod runtime;
pub mod session;
pub mod store;
pub mod subscription;
pub mod unlock;
pub mod util;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::{Category, GalleryItem, Identity, ItemId, UploadForm};
pub use runtime::{Backend, GalleryRuntime, ViewState};
