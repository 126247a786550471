//! Responsive grid of gallery cards

use dioxus::prelude::*;

use super::item_card::ItemCard;
use crate::state::AppState;
use crate::theme::palette;

#[component]
pub fn GalleryGrid() -> Element {
    let state = use_context::<AppState>();
    let colors = palette();
    let items = (state.items)();

    if items.is_empty() {
        return rsx! {
            div {
                style: "padding: 96px 32px; text-align: center; color: {colors.text_muted};",
                "No prompts yet. Add the first one!"
            }
        };
    }

    rsx! {
        div {
            class: "gallery-grid",
            style: "
                display: grid;
                grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
                gap: 20px;
                padding: 24px 32px;
            ",
            for item in items {
                ItemCard { key: "{item.id}", item: item.clone() }
            }
        }
    }
}
