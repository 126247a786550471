//! Prompt Gallery Desktop Application
//!
//! Save AI art prompts next to their images and unlock them with a
//! simulated rewarded view.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod components;
mod services;
mod state;
mod theme;

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};

fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prompt_gallery=debug,gallery_core=debug".into()),
        )
        .init();

    tracing::info!("Starting Prompt Gallery...");

    let config = Config::new().with_window(
        WindowBuilder::new()
            .with_title("Prompt Gallery")
            .with_inner_size(LogicalSize::new(1200.0, 860.0)),
    );

    dioxus::LaunchBuilder::new()
        .with_cfg(config)
        .launch(app::App);
}
