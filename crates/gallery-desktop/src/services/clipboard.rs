//! Clipboard writers for the desktop shell.

use std::sync::{Mutex, PoisonError};

use dioxus::prelude::*;
use gallery_core::clipboard::{ClipboardExporter, ClipboardWriter};
use serde::Deserialize;

pub type DesktopClipboard = ClipboardExporter<NativeClipboard, WebviewClipboard>;

/// Open the clipboard exporter, using the OS clipboard when it is reachable.
pub fn desktop_clipboard() -> DesktopClipboard {
    let native = match arboard::Clipboard::new() {
        Ok(clipboard) => Some(NativeClipboard {
            clipboard: Mutex::new(clipboard),
        }),
        Err(error) => {
            tracing::warn!("Native clipboard unavailable: {}", error);
            None
        }
    };
    ClipboardExporter::new(native, WebviewClipboard)
}

/// OS clipboard through `arboard`.
pub struct NativeClipboard {
    clipboard: Mutex<arboard::Clipboard>,
}

impl ClipboardWriter for NativeClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        self.clipboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_text(text.to_string())
            .map_err(|error| error.to_string())
    }
}

/// Selection-and-copy inside the webview, for when the OS clipboard is
/// unavailable.
pub struct WebviewClipboard;

#[derive(Debug, Deserialize)]
struct CopyResult {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl ClipboardWriter for WebviewClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        let result: CopyResult = document::eval(&copy_script(text)?)
            .join()
            .await
            .map_err(|error| format!("Clipboard script failed: {error}"))?;
        if result.ok {
            Ok(())
        } else {
            Err(result
                .error
                .unwrap_or_else(|| "Copy was rejected by the webview".to_string()))
        }
    }
}

/// Off-screen textarea, select, `execCommand('copy')`, remove.
fn copy_script(text: &str) -> Result<String, String> {
    let literal = serde_json::to_string(text).map_err(|error| error.to_string())?;
    Ok(format!(
        r#"
return (() => {{
    const textarea = document.createElement("textarea");
    textarea.value = {literal};
    textarea.setAttribute("readonly", "");
    textarea.style.position = "fixed";
    textarea.style.top = "0";
    textarea.style.left = "-9999px";
    textarea.style.opacity = "0";
    document.body.appendChild(textarea);
    textarea.focus();
    textarea.select();
    try {{
        const copied = document.execCommand("copy");
        return copied ? {{ ok: true }} : {{ ok: false, error: "execCommand('copy') returned false" }};
    }} catch (error) {{
        return {{ ok: false, error: error && error.message ? error.message : String(error) }};
    }} finally {{
        document.body.removeChild(textarea);
    }}
}})();
"#
    ))
}
