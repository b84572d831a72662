//! Clipboard access for text widgets.
//!
//! `SystemClipboard` wraps the `arboard` crate; `MemoryClipboard` keeps the
//! text in-process and backs headless runs and tests.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard backend error: {0}")]
    Backend(#[from] arboard::Error),
    #[error("clipboard is empty")]
    Empty,
}

pub trait Clipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError>;
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard. A backend is opened per call, since some platforms
/// invalidate long-lived handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    /// Whether a clipboard backend can be opened at all.
    pub fn available() -> bool {
        arboard::Clipboard::new().is_ok()
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        let mut cb = arboard::Clipboard::new()?;
        cb.get_text().map_err(ClipboardError::from)
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut cb = arboard::Clipboard::new()?;
        cb.set_text(text.to_owned()).map_err(ClipboardError::from)
    }
}

/// In-process clipboard. Clones share the same contents.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    text: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.text.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.text.borrow().clone().ok_or(ClipboardError::Empty)
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        *self.text.borrow_mut() = Some(text.to_owned());
        Ok(())
    }
}

/// `SystemClipboard` when a backend is reachable, otherwise an in-memory one.
pub fn default_clipboard() -> Box<dyn Clipboard> {
    if SystemClipboard::available() {
        Box::new(SystemClipboard)
    } else {
        tracing::debug!("no system clipboard, using in-memory clipboard");
        Box::new(MemoryClipboard::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_is_shared_between_clones() {
        let mut a = MemoryClipboard::new();
        let mut b = a.clone();
        assert!(matches!(b.get_text(), Err(ClipboardError::Empty)));
        a.set_text("hello").unwrap();
        assert_eq!(b.get_text().unwrap(), "hello");
    }
}
