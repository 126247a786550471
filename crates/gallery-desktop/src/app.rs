//! Main application component

use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use gallery_core::models::UploadForm;
use gallery_core::unlock::UnlockMachine;
use gallery_core::ViewState;

use crate::components::{AdOverlay, ErrorScreen, GalleryGrid, Header, LoadingScreen, UploadPanel};
use crate::services::{desktop_clipboard, desktop_runtime};
use crate::state::AppState;
use crate::theme::palette;

/// Root application component
#[component]
pub fn App() -> Element {
    let runtime = use_signal(|| {
        let runtime = Arc::new(desktop_runtime());
        runtime.init();
        runtime
    });
    let clipboard = use_signal(|| Rc::new(desktop_clipboard()));
    let mut view = use_signal(|| ViewState::Loading);
    let mut items = use_signal(Vec::new);
    let mut unlock = use_signal(UnlockMachine::default);
    let mut copied = use_signal(|| false);
    let last_copied = use_signal(|| None);
    let upload_open = use_signal(|| false);
    let upload_form = use_signal(UploadForm::default);

    // Release the session listener, gallery feed, and countdown on unmount
    let teardown = runtime.peek().clone();
    use_drop(move || teardown.dispose());

    // Mirror runtime state into signals
    use_future(move || async move {
        let runtime = runtime.peek().clone();
        let clipboard = clipboard.peek().clone();
        let mut session_rx = runtime.watch_session();
        let mut gallery_rx = runtime.watch_gallery();
        let mut unlock_rx = runtime.watch_unlock();
        let mut copied_rx = clipboard.watch_copied();

        loop {
            session_rx.mark_unchanged();
            let next_view = runtime.view_state();
            if *view.peek() != next_view {
                tracing::info!("View state: {:?}", next_view);
                view.set(next_view);
            }
            items.set(gallery_rx.borrow_and_update().items.clone());
            unlock.set(unlock_rx.borrow_and_update().clone());
            copied.set(*copied_rx.borrow_and_update());

            let closed = tokio::select! {
                changed = session_rx.changed() => changed.is_err(),
                changed = gallery_rx.changed() => changed.is_err(),
                changed = unlock_rx.changed() => changed.is_err(),
                changed = copied_rx.changed() => changed.is_err(),
            };
            if closed {
                tracing::debug!("Runtime channels closed; stopping state bridge");
                break;
            }
        }
    });

    use_context_provider(|| AppState {
        runtime,
        clipboard,
        view,
        items,
        unlock,
        copied,
        last_copied,
        upload_open,
        upload_form,
    });

    let colors = palette();

    rsx! {
        div {
            class: "app-container",
            style: "
                min-height: 100vh;
                font-family: system-ui, -apple-system, sans-serif;
                background: {colors.bg_primary};
                color: {colors.text_primary};
            ",

            match view() {
                ViewState::Loading => rsx! { LoadingScreen {} },
                ViewState::Failed(error) => rsx! { ErrorScreen { message: error.to_string() } },
                ViewState::Ready => rsx! {
                    Header {}
                    GalleryGrid {}
                    if upload_open() {
                        UploadPanel {}
                    }
                    AdOverlay {}
                },
            }
        }
    }
}
