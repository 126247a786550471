//! Application state shared through the Dioxus context.

use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use gallery_core::models::{GalleryItem, ItemId, UploadForm};
use gallery_core::unlock::UnlockMachine;
use gallery_core::ViewState;

use crate::services::{DesktopClipboard, DesktopRuntime};

/// Signals mirrored from the gallery runtime plus UI-only state.
#[derive(Clone, Copy)]
pub struct AppState {
    pub runtime: Signal<Arc<DesktopRuntime>>,
    pub clipboard: Signal<Rc<DesktopClipboard>>,
    /// Which top-level screen is showing
    pub view: Signal<ViewState>,
    /// Gallery items, newest first
    pub items: Signal<Vec<GalleryItem>>,
    /// Countdown and reward balance
    pub unlock: Signal<UnlockMachine>,
    /// Whether the "copied" flash is up
    pub copied: Signal<bool>,
    /// Item whose prompt was copied last
    pub last_copied: Signal<Option<ItemId>>,
    pub upload_open: Signal<bool>,
    pub upload_form: Signal<UploadForm>,
}

impl AppState {
    #[must_use]
    pub fn runtime(&self) -> Arc<DesktopRuntime> {
        self.runtime.peek().clone()
    }

    #[must_use]
    pub fn clipboard(&self) -> Rc<DesktopClipboard> {
        self.clipboard.peek().clone()
    }

    /// Title of the item currently being unlocked, if any.
    #[must_use]
    pub fn unlocking_title(&self) -> Option<String> {
        let unlock = self.unlock.read();
        let target = &unlock.pending()?.target_id;
        self.items
            .read()
            .iter()
            .find(|item| &item.id == target)
            .map(|item| item.title.clone())
    }
}
