//! Simulated ad shown while an unlock countdown runs

use dioxus::prelude::*;
use gallery_core::unlock::UNLOCK_COUNTDOWN_SECS;

use crate::state::AppState;
use crate::theme::palette;

/// Share of the countdown already watched, 0 to 100.
fn progress_percent(remaining_seconds: u32) -> u32 {
    let remaining = remaining_seconds.min(UNLOCK_COUNTDOWN_SECS);
    (UNLOCK_COUNTDOWN_SECS - remaining) * 100 / UNLOCK_COUNTDOWN_SECS
}

#[component]
pub fn AdOverlay() -> Element {
    let state = use_context::<AppState>();
    let colors = palette();

    let Some(remaining) = state
        .unlock
        .read()
        .pending()
        .map(|pending| pending.remaining_seconds)
    else {
        return rsx! {};
    };
    let title = state
        .unlocking_title()
        .unwrap_or_else(|| "this prompt".to_string());
    let progress = progress_percent(remaining);

    rsx! {
        div {
            class: "ad-overlay",
            style: "
                position: fixed;
                inset: 0;
                display: flex;
                align-items: center;
                justify-content: center;
                background: {colors.overlay};
                z-index: 100;
            ",

            div {
                style: "
                    width: 420px;
                    padding: 28px;
                    border-radius: 16px;
                    background: {colors.bg_secondary};
                    text-align: center;
                ",

                p {
                    style: "margin: 0 0 8px; font-size: 12px; letter-spacing: 0.1em; color: {colors.text_muted};",
                    "ADVERTISEMENT"
                }
                h2 {
                    style: "margin: 0 0 12px; font-size: 20px;",
                    "Unlocking \"{title}\""
                }
                p {
                    style: "margin: 0 0 16px; color: {colors.text_secondary};",
                    "Reward in {remaining}s"
                }
                div {
                    style: "height: 6px; border-radius: 3px; background: {colors.bg_tertiary}; overflow: hidden;",
                    div {
                        style: "height: 100%; width: {progress}%; background: {colors.accent}; transition: width 0.9s linear;",
                    }
                }
            }
        }
    }
}
