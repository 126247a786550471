//! Copying unlocked prompts to the clipboard.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::subscription::Subscription;

/// How long the "copied" flag stays up after a successful copy.
pub const COPIED_FLASH: Duration = Duration::from_secs(2);

/// One way of putting text on the clipboard.
///
/// Futures need not be `Send`: webview-backed writers run on the UI thread.
pub trait ClipboardWriter {
    fn write_text(&self, text: &str) -> impl Future<Output = std::result::Result<(), String>>;
}

/// Tries the native clipboard first and the fallback writer second.
pub struct ClipboardExporter<N, F> {
    native: Option<N>,
    fallback: F,
    copied: Arc<watch::Sender<bool>>,
    reset: Subscription,
}

impl<N: ClipboardWriter, F: ClipboardWriter> ClipboardExporter<N, F> {
    /// `native` is `None` when the platform clipboard could not be opened.
    pub fn new(native: Option<N>, fallback: F) -> Self {
        let (copied, _) = watch::channel(false);
        Self {
            native,
            fallback,
            copied: Arc::new(copied),
            reset: Subscription::default(),
        }
    }

    /// Copy `text`, raising the "copied" flag for [`COPIED_FLASH`] on success.
    pub async fn copy(&self, text: &str) -> Result<()> {
        let written = match &self.native {
            Some(native) => match native.write_text(text).await {
                Ok(()) => Ok(()),
                Err(error) => {
                    tracing::warn!("Native clipboard write failed, using fallback: {}", error);
                    self.fallback.write_text(text).await
                }
            },
            None => self.fallback.write_text(text).await,
        };

        match written {
            Ok(()) => {
                self.flash();
                Ok(())
            }
            Err(error) => {
                tracing::error!("Copy to clipboard failed: {}", error);
                Err(Error::ClipboardFailed(error))
            }
        }
    }

    pub fn is_copied(&self) -> bool {
        *self.copied.borrow()
    }

    pub fn watch_copied(&self) -> watch::Receiver<bool> {
        self.copied.subscribe()
    }

    /// A newer copy restarts the window.
    fn flash(&self) {
        self.copied.send_replace(true);
        let copied = Arc::clone(&self.copied);
        self.reset.replace(async move {
            tokio::time::sleep(COPIED_FLASH).await;
            copied.send_replace(false);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        fail_with: Option<&'static str>,
        written: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn failing(message: &'static str) -> Self {
            Self {
                fail_with: Some(message),
                ..Self::default()
            }
        }

        fn written(&self) -> Vec<String> {
            self.written
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl ClipboardWriter for &Recorder {
        async fn write_text(&self, text: &str) -> std::result::Result<(), String> {
            if let Some(message) = self.fail_with {
                return Err(message.to_string());
            }
            self.written
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn native_write_flashes_copied_for_two_seconds() {
        let native = Recorder::default();
        let fallback = Recorder::default();
        let exporter = ClipboardExporter::new(Some(&native), &fallback);

        exporter.copy("a samurai in neon rain").await.unwrap();
        assert!(exporter.is_copied());
        assert_eq!(native.written(), vec!["a samurai in neon rain".to_string()]);
        assert!(fallback.written().is_empty());

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert!(exporter.is_copied());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!exporter.is_copied());
    }

    #[tokio::test(start_paused = true)]
    async fn second_copy_restarts_the_window() {
        let native = Recorder::default();
        let fallback = Recorder::default();
        let exporter = ClipboardExporter::new(Some(&native), &fallback);

        exporter.copy("first").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        exporter.copy("second").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(exporter.is_copied());
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(!exporter.is_copied());
    }

    #[tokio::test(start_paused = true)]
    async fn falls_back_when_native_is_missing_or_fails() {
        let fallback = Recorder::default();
        let exporter = ClipboardExporter::<&Recorder, _>::new(None, &fallback);
        exporter.copy("via fallback").await.unwrap();
        assert_eq!(fallback.written(), vec!["via fallback".to_string()]);

        let broken = Recorder::failing("clipboard busy");
        let exporter = ClipboardExporter::new(Some(&broken), &fallback);
        exporter.copy("after failure").await.unwrap();
        assert_eq!(fallback.written().len(), 2);
        assert!(exporter.is_copied());
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_is_reported_without_flash() {
        let native = Recorder::failing("no display");
        let fallback = Recorder::failing("execCommand returned false");
        let exporter = ClipboardExporter::new(Some(&native), &fallback);

        let error = exporter.copy("text").await.unwrap_err();

        assert_eq!(
            error,
            Error::ClipboardFailed("execCommand returned false".to_string())
        );
        assert!(!error.is_terminal());
        assert!(!exporter.is_copied());
    }
}
