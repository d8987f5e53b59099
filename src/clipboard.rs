use copypasta::{ClipboardContext, ClipboardProvider};
use log::debug;

use crate::error::{Error, Result};

/// Write text to the system clipboard
pub fn copy(text: &str) -> Result<()> {
    let mut clipboard =
        ClipboardContext::new().map_err(|err| Error::ClipboardWriteFailed(format!("create clipboard context: {err}")))?;
    copy_with(&mut clipboard, text)
}

/// Write text through an already opened clipboard
pub fn copy_with<P: ClipboardProvider + ?Sized>(clipboard: &mut P, text: &str) -> Result<()> {
    debug!("Copying {} bytes to clipboard", text.len());
    clipboard
        .set_contents(text.to_string())
        .map_err(|err| Error::ClipboardWriteFailed(err.to_string()))
}
