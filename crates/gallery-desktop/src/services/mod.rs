//! Application services
//!
//! Platform glue for the gallery runtime: keyring persistence, clipboard
//! access, and runtime construction.

mod clipboard;
mod runtime;
mod session_store;

pub use clipboard::{desktop_clipboard, DesktopClipboard};
pub use runtime::{desktop_runtime, DesktopRuntime};
pub use session_store::KeyringSessionStore;
