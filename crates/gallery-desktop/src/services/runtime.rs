//! Builds the gallery runtime from the process environment.

use gallery_core::config::AppConfig;
use gallery_core::runtime::{firebase_backend, FirebaseRuntime};
use gallery_core::GalleryRuntime;

use super::KeyringSessionStore;

pub type DesktopRuntime = FirebaseRuntime<KeyringSessionStore>;

/// Read configuration and wire up Firebase.
///
/// An unusable environment falls back to defaults, which leaves Firebase
/// unconfigured and shows the "configuration missing" screen.
pub fn desktop_runtime() -> DesktopRuntime {
    let config = AppConfig::from_env().unwrap_or_else(|error| {
        tracing::error!("Invalid configuration: {}", error);
        AppConfig::default()
    });
    tracing::debug!(
        "Gallery config: app_id={}, firebase={}, poll={:?}, retention={:?}",
        config.app_id,
        config.firebase.is_some(),
        config.sync_poll_interval,
        config.retention
    );

    let persistence = KeyringSessionStore::for_project(
        config
            .firebase
            .as_ref()
            .map(|firebase| firebase.project_id.as_str()),
    );
    GalleryRuntime::new(firebase_backend(&config, persistence))
}
