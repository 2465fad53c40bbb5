use crate::error::Result;
use arboard::Clipboard;
use log::debug;

pub struct ClipboardManager {
    clipboard: Clipboard,
}

impl ClipboardManager {
    pub fn new() -> Result<Self> {
        Ok(Self {
            clipboard: Clipboard::new()?,
        })
    }

    /// Copy a shareable address, e.g. `/search?query=water&page=2`.
    pub fn copy_address(&mut self, address: &str) -> Result<()> {
        self.clipboard.set_text(address)?;
        debug!("copied {address} to clipboard");
        Ok(())
    }
}
