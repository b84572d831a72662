//! Engine-level input and lifecycle events.
//!
//! Drivers translate raw terminal input into these values; the window stack
//! and component tree only ever see `Event`.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton};

use crate::geom::Point;

/// A single key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub repeat: bool,
}

impl KeyInput {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            repeat: false,
        }
    }

    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(KeyModifiers::CONTROL)
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SHIFT)
    }

    pub fn alt(&self) -> bool {
        self.modifiers.contains(KeyModifiers::ALT)
    }
}

impl From<KeyEvent> for KeyInput {
    fn from(key: KeyEvent) -> Self {
        Self {
            code: key.code,
            modifiers: key.modifiers,
            repeat: key.kind == KeyEventKind::Repeat,
        }
    }
}

/// Why a button release was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseUpReason {
    /// The button was physically released.
    Normal,
    /// The pressed component lost its capture (removed, hidden, disabled,
    /// or its window was covered, popped or lost OS focus) before the button
    /// came up.
    CaptureLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tick,
    Draw,
    Quit,
    FocusGain,
    FocusLose,
    MouseEnter {
        pos: Point,
    },
    MouseLeave,
    MouseMove {
        pos: Point,
        delta: Point,
    },
    MouseDown {
        pos: Point,
        button: MouseButton,
    },
    MouseUp {
        pos: Point,
        button: MouseButton,
        reason: MouseUpReason,
    },
    MouseWheel {
        pos: Point,
        dx: i32,
        dy: i32,
    },
    KeyPress(KeyInput),
    KeyRelease(KeyInput),
    TextInput(String),
    TextEditing(String),
    FileDrop(PathBuf),
    RendererUp,
    RendererDown,
}

impl Event {
    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            Event::MouseEnter { pos }
            | Event::MouseMove { pos, .. }
            | Event::MouseDown { pos, .. }
            | Event::MouseUp { pos, .. }
            | Event::MouseWheel { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            Event::MouseEnter { .. }
                | Event::MouseLeave
                | Event::MouseMove { .. }
                | Event::MouseDown { .. }
                | Event::MouseUp { .. }
                | Event::MouseWheel { .. }
        )
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(
            self,
            Event::KeyPress(_)
                | Event::KeyRelease(_)
                | Event::TextInput(_)
                | Event::TextEditing(_)
        )
    }

    /// Short name used in tracing output.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Tick => "tick",
            Event::Draw => "draw",
            Event::Quit => "quit",
            Event::FocusGain => "focus_gain",
            Event::FocusLose => "focus_lose",
            Event::MouseEnter { .. } => "mouse_enter",
            Event::MouseLeave => "mouse_leave",
            Event::MouseMove { .. } => "mouse_move",
            Event::MouseDown { .. } => "mouse_down",
            Event::MouseUp { .. } => "mouse_up",
            Event::MouseWheel { .. } => "mouse_wheel",
            Event::KeyPress(_) => "key_press",
            Event::KeyRelease(_) => "key_release",
            Event::TextInput(_) => "text_input",
            Event::TextEditing(_) => "text_editing",
            Event::FileDrop(_) => "file_drop",
            Event::RendererUp => "renderer_up",
            Event::RendererDown => "renderer_down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_only_for_pointer_events() {
        let down = Event::MouseDown {
            pos: Point::new(3, 4),
            button: MouseButton::Left,
        };
        assert_eq!(down.position(), Some(Point::new(3, 4)));
        assert!(down.is_mouse());
        assert_eq!(Event::MouseLeave.position(), None);
        assert_eq!(Event::Tick.position(), None);
    }

    #[test]
    fn key_input_from_crossterm_tracks_repeat() {
        let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        key.kind = KeyEventKind::Repeat;
        let input = KeyInput::from(key);
        assert!(input.repeat);
        assert!(input.ctrl());
        assert!(Event::KeyPress(input).is_keyboard());
    }
}
