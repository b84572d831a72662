//! Modal window stack: the top window is live, windows below it are shown
//! through darkened backdrop snapshots.

pub mod backdrop;
mod stack;
pub mod tooltip;

pub use stack::{ModalOptions, WindowStack};
