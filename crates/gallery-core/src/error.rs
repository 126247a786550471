//! Error types for gallery-core

use thiserror::Error;

use crate::models::ValidationError;
use crate::store::StoreError;
use crate::unlock::UnlockError;

/// Result type alias using gallery-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the application shell.
///
/// The first three variants are terminal: they end the session's usefulness
/// and are shown full-screen. Everything else is recovered where it happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No identity provider or document store could be configured
    #[error("configuration missing")]
    ConfigurationMissing,

    /// The identity provider rejected sign-in
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The live gallery query failed
    #[error("gallery subscription failed: {0}")]
    SubscriptionFailed(String),

    /// Upload form input was rejected
    #[error("invalid upload: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Clipboard write failed on every available path
    #[error("copy failed: {0}")]
    ClipboardFailed(String),

    /// An operation needed a signed-in identity or configured store
    #[error("not ready: {0}")]
    NotReady(&'static str),

    /// Document store request failed
    #[error("store error: {0}")]
    Store(String),

    /// Unlock request was rejected
    #[error(transparent)]
    Unlock(#[from] UnlockError),
}

impl Error {
    /// Terminal errors have no recovery path short of a full restart.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing | Self::AuthenticationFailed(_) | Self::SubscriptionFailed(_)
        )
    }
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}
