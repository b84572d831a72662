//! Small widgets built on the component tree.

mod button;
mod confirm_dialog;
mod label;
mod panel;
mod text_field;

pub use button::{Button, ClickHandler};
pub use confirm_dialog::{ConfirmAction, ConfirmDialog, ConfirmHandle};
pub use label::Label;
pub use panel::Panel;
pub use text_field::TextField;
