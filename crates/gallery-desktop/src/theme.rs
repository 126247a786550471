//! Color palette for the desktop app
//!
//! The gallery is dark-only: artwork reads better on a dark backdrop.

/// Color palette for the application
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub bg_primary: &'static str,
    pub bg_secondary: &'static str,
    pub bg_tertiary: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub coin: &'static str,
    pub error: &'static str,
    pub success: &'static str,
    pub overlay: &'static str,
}

pub const PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#0f0f14",
    bg_secondary: "#181820",
    bg_tertiary: "#23232e",
    text_primary: "#f1f1f4",
    text_secondary: "#a6a6b4",
    text_muted: "#6b6b7b",
    border: "#2f2f3c",
    accent: "#a855f7",
    accent_text: "#ffffff",
    coin: "#facc15",
    error: "#f87171",
    success: "#4ade80",
    overlay: "rgba(5, 5, 10, 0.85)",
};

#[must_use]
pub const fn palette() -> &'static ColorPalette {
    &PALETTE
}
