//! Full-window loading and error screens

use dioxus::prelude::*;

use crate::theme::palette;

const SCREEN_STYLE: &str = "
    min-height: 100vh;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    gap: 12px;
    padding: 32px;
    text-align: center;
";

#[component]
pub fn LoadingScreen() -> Element {
    let colors = palette();

    rsx! {
        div {
            style: SCREEN_STYLE,
            div {
                style: "font-size: 18px; color: {colors.text_secondary};",
                "Loading gallery..."
            }
        }
    }
}

/// Terminal failure. There is no retry; restarting the app is the only way
/// out.
#[component]
pub fn ErrorScreen(message: String) -> Element {
    let colors = palette();

    rsx! {
        div {
            style: SCREEN_STYLE,
            h2 {
                style: "margin: 0; color: {colors.error};",
                "Something went wrong"
            }
            p {
                style: "margin: 0; max-width: 520px; color: {colors.text_secondary};",
                "{message}"
            }
            p {
                style: "margin: 0; font-size: 12px; color: {colors.text_muted};",
                "Restart Prompt Gallery to try again."
            }
        }
    }
}
