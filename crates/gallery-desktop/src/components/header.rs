//! Header with the coin balance and upload button

use dioxus::prelude::*;

use crate::state::AppState;
use crate::theme::palette;

#[component]
pub fn Header() -> Element {
    let mut state = use_context::<AppState>();
    let colors = palette();
    let balance = state.unlock.read().balance();

    rsx! {
        header {
            style: "
                display: flex;
                align-items: center;
                justify-content: space-between;
                padding: 20px 32px;
                border-bottom: 1px solid {colors.border};
                background: {colors.bg_secondary};
            ",

            div {
                h1 {
                    style: "margin: 0; font-size: 24px; font-weight: 700;",
                    "Prompt Gallery"
                }
                p {
                    style: "margin: 4px 0 0; font-size: 13px; color: {colors.text_secondary};",
                    "Watch a short ad to reveal the prompt behind each image"
                }
            }

            div {
                style: "display: flex; align-items: center; gap: 16px;",

                span {
                    class: "coin-balance",
                    title: "Coins earned from unlocks",
                    style: "
                        padding: 6px 12px;
                        border-radius: 999px;
                        background: {colors.bg_tertiary};
                        color: {colors.coin};
                        font-weight: 600;
                    ",
                    "🪙 {balance}"
                }

                button {
                    style: "
                        padding: 8px 16px;
                        border: none;
                        border-radius: 8px;
                        background: {colors.accent};
                        color: {colors.accent_text};
                        font-weight: 600;
                        cursor: pointer;
                    ",
                    onclick: move |_| state.upload_open.set(true),
                    "+ Add Prompt"
                }
            }
        }
    }
}
