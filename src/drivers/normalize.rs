//! Turns raw crossterm input into engine events.
//!
//! Shift+Tab becomes BackTab, key releases are filtered the way each
//! platform needs, printable keys also produce TEXTINPUT, and mouse drags
//! become moves carrying a delta from the previous report.

use crossterm::event::{
    Event as RawEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::event::{Event, KeyInput, MouseUpReason};
use crate::geom::Point;

/// One normalized input item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Event(Event),
    /// The terminal changed size; the render surface must be recreated.
    Resize { width: u16, height: u16 },
}

#[derive(Debug, Default)]
pub struct InputNormalizer {
    esc_down: bool,
    last_pointer: Option<Point>,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: RawEvent) -> Vec<Input> {
        match evt {
            RawEvent::Key(key) => self.key(key),
            RawEvent::Mouse(mouse) => self.mouse(mouse).into_iter().map(Input::Event).collect(),
            RawEvent::Paste(text) => vec![Input::Event(Event::TextInput(text))],
            RawEvent::FocusGained => vec![Input::Event(Event::FocusGain)],
            RawEvent::FocusLost => vec![Input::Event(Event::FocusLose)],
            RawEvent::Resize(width, height) => vec![Input::Resize { width, height }],
        }
    }

    fn key(&mut self, mut key: KeyEvent) -> Vec<Input> {
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        if cfg!(windows) {
            match key.kind {
                KeyEventKind::Release => {
                    if key.code == KeyCode::Esc {
                        self.esc_down = false;
                    }
                    return vec![Input::Event(Event::KeyRelease(key.into()))];
                }
                KeyEventKind::Repeat => return Vec::new(),
                KeyEventKind::Press => {}
            }
            if key.code == KeyCode::Esc {
                if self.esc_down {
                    return Vec::new();
                }
                self.esc_down = true;
            } else {
                self.esc_down = false;
            }
        } else if key.kind == KeyEventKind::Release {
            return Vec::new();
        }

        let input = KeyInput::from(key);
        let mut out = vec![Input::Event(Event::KeyPress(input))];
        if let Some(text) = typed_text(&input) {
            out.push(Input::Event(Event::TextInput(text)));
        }
        out
    }

    fn mouse(&mut self, mouse: MouseEvent) -> Option<Event> {
        let pos = Point::new(i32::from(mouse.column), i32::from(mouse.row));
        let last = self.last_pointer.replace(pos);
        let delta = last.map_or(Point::ZERO, |last| pos - last);
        let event = match mouse.kind {
            MouseEventKind::Down(button) => Event::MouseDown { pos, button },
            MouseEventKind::Up(button) => Event::MouseUp {
                pos,
                button,
                reason: MouseUpReason::Normal,
            },
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                if last == Some(pos) {
                    return None;
                }
                Event::MouseMove { pos, delta }
            }
            MouseEventKind::ScrollUp => Event::MouseWheel { pos, dx: 0, dy: -1 },
            MouseEventKind::ScrollDown => Event::MouseWheel { pos, dx: 0, dy: 1 },
            MouseEventKind::ScrollLeft => Event::MouseWheel { pos, dx: -1, dy: 0 },
            MouseEventKind::ScrollRight => Event::MouseWheel { pos, dx: 1, dy: 0 },
        };
        Some(event)
    }
}

/// Text a key press types, if any: printable characters without Ctrl/Alt.
fn typed_text(key: &KeyInput) -> Option<String> {
    if key.ctrl() || key.alt() {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if !c.is_control() => Some(c.to_string()),
        _ => None,
    }
}
