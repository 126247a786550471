//! Gallery card with the lock/unlock and copy controls

use dioxus::prelude::*;
use gallery_core::models::GalleryItem;

use crate::state::AppState;
use crate::theme::palette;

/// Format the posting date, falling back to the raw stored value.
fn posted_label(item: &GalleryItem) -> String {
    item.created_at().map_or_else(
        || item.timestamp.clone(),
        |created| created.format("%b %-d, %Y").to_string(),
    )
}

#[component]
pub fn ItemCard(item: GalleryItem) -> Element {
    let mut state = use_context::<AppState>();
    let colors = palette();
    let mut action_error = use_signal(|| None::<String>);

    let posted = posted_label(&item);
    let is_counting = state
        .unlock
        .read()
        .pending()
        .is_some_and(|pending| pending.target_id == item.id);
    let show_copied = (state.copied)() && (state.last_copied)().as_ref() == Some(&item.id);

    let unlock_id = item.id.clone();
    let copy_id = item.id.clone();
    let prompt = item.prompt.clone();

    rsx! {
        article {
            class: "item-card",
            style: "
                display: flex;
                flex-direction: column;
                border: 1px solid {colors.border};
                border-radius: 12px;
                overflow: hidden;
                background: {colors.bg_secondary};
            ",

            img {
                src: "{item.url}",
                alt: "{item.title}",
                style: "width: 100%; aspect-ratio: 1 / 1; object-fit: cover; background: {colors.bg_tertiary};",
            }

            div {
                style: "display: flex; flex-direction: column; gap: 10px; padding: 14px;",

                div {
                    style: "display: flex; align-items: center; justify-content: space-between; gap: 8px;",
                    h3 {
                        style: "margin: 0; font-size: 16px; font-weight: 600;",
                        "{item.title}"
                    }
                    span {
                        style: "
                            padding: 2px 8px;
                            border-radius: 999px;
                            font-size: 11px;
                            background: {colors.bg_tertiary};
                            color: {colors.text_secondary};
                        ",
                        "{item.category}"
                    }
                }

                span {
                    style: "font-size: 12px; color: {colors.text_muted};",
                    "{posted}"
                }

                if item.is_unlocked {
                    p {
                        class: "item-prompt",
                        style: "margin: 0; font-size: 13px; line-height: 1.5; color: {colors.text_primary}; user-select: text;",
                        "{item.prompt}"
                    }
                    button {
                        style: "
                            padding: 8px;
                            border: 1px solid {colors.border};
                            border-radius: 8px;
                            background: {colors.bg_tertiary};
                            color: {colors.text_primary};
                            cursor: pointer;
                        ",
                        onclick: move |_| {
                            let clipboard = state.clipboard();
                            let prompt = prompt.clone();
                            let id = copy_id.clone();
                            spawn(async move {
                                match clipboard.copy(&prompt).await {
                                    Ok(()) => {
                                        action_error.set(None);
                                        state.last_copied.set(Some(id));
                                    }
                                    Err(e) => action_error.set(Some(e.to_string())),
                                }
                            });
                        },
                        if show_copied { "Copied!" } else { "Copy prompt" }
                    }
                } else {
                    p {
                        class: "item-prompt locked",
                        style: "margin: 0; font-size: 13px; line-height: 1.5; filter: blur(5px); user-select: none;",
                        "{item.prompt}"
                    }
                    button {
                        disabled: is_counting,
                        style: "
                            padding: 8px;
                            border: none;
                            border-radius: 8px;
                            background: {colors.accent};
                            color: {colors.accent_text};
                            font-weight: 600;
                            cursor: pointer;
                        ",
                        onclick: move |_| {
                            match state.runtime().request_unlock(&unlock_id) {
                                Ok(()) => action_error.set(None),
                                Err(e) => {
                                    tracing::warn!("Unlock request rejected: {}", e);
                                    action_error.set(Some(e.to_string()));
                                }
                            }
                        },
                        if is_counting { "Unlocking..." } else { "Watch ad to unlock" }
                    }
                }

                if let Some(error) = action_error() {
                    span {
                        style: "font-size: 12px; color: {colors.error};",
                        "{error}"
                    }
                }
            }
        }
    }
}
