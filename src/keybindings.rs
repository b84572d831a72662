use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};

use crate::event::KeyInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    // Caret movement
    CaretLeft,
    CaretRight,
    CaretUp,
    CaretDown,
    CaretHome,
    CaretEnd,
    // Selection-extending movement
    SelectLeft,
    SelectRight,
    SelectUp,
    SelectDown,
    SelectAll,
    // Editing
    DeleteBack,
    DeleteForward,
    Newline,
    Copy,
    Cut,
    Paste,
    // Confirm dialog navigation/actions
    ConfirmToggle,
    ConfirmLeft,
    ConfirmRight,
    ConfirmAccept,
    ConfirmCancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::CaretLeft => "Caret left",
            Action::CaretRight => "Caret right",
            Action::CaretUp => "Caret up",
            Action::CaretDown => "Caret down",
            Action::CaretHome => "Caret to line start",
            Action::CaretEnd => "Caret to line end",
            Action::SelectLeft => "Extend selection left",
            Action::SelectRight => "Extend selection right",
            Action::SelectUp => "Extend selection up",
            Action::SelectDown => "Extend selection down",
            Action::SelectAll => "Select all",
            Action::DeleteBack => "Delete before caret",
            Action::DeleteForward => "Delete after caret",
            Action::Newline => "Insert line break",
            Action::Copy => "Copy selection",
            Action::Cut => "Cut selection",
            Action::Paste => "Paste",
            Action::ConfirmToggle => "Confirm toggle (Tab)",
            Action::ConfirmLeft => "Confirm left",
            Action::ConfirmRight => "Confirm right",
            Action::ConfirmAccept => "Confirm accept",
            Action::ConfirmCancel => "Confirm cancel",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyInput) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let none = KeyModifiers::NONE;
        let shift = KeyModifiers::SHIFT;
        let ctrl = KeyModifiers::CONTROL;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), ctrl));
        // Caret
        kb.add(CaretLeft, KeyCombo::new(KeyCode::Left, none));
        kb.add(CaretRight, KeyCombo::new(KeyCode::Right, none));
        kb.add(CaretUp, KeyCombo::new(KeyCode::Up, none));
        kb.add(CaretDown, KeyCombo::new(KeyCode::Down, none));
        kb.add(CaretHome, KeyCombo::new(KeyCode::Home, none));
        kb.add(CaretEnd, KeyCombo::new(KeyCode::End, none));
        kb.add(SelectLeft, KeyCombo::new(KeyCode::Left, shift));
        kb.add(SelectRight, KeyCombo::new(KeyCode::Right, shift));
        kb.add(SelectUp, KeyCombo::new(KeyCode::Up, shift));
        kb.add(SelectDown, KeyCombo::new(KeyCode::Down, shift));
        kb.add(SelectAll, KeyCombo::new(KeyCode::Char('a'), ctrl));
        // Editing
        kb.add(DeleteBack, KeyCombo::new(KeyCode::Backspace, none));
        kb.add(DeleteForward, KeyCombo::new(KeyCode::Delete, none));
        kb.add(Newline, KeyCombo::new(KeyCode::Enter, shift));
        kb.add(Copy, KeyCombo::new(KeyCode::Char('c'), ctrl));
        kb.add(Cut, KeyCombo::new(KeyCode::Char('x'), ctrl));
        kb.add(Paste, KeyCombo::new(KeyCode::Char('v'), ctrl));
        // Confirm dialog
        kb.add(ConfirmToggle, KeyCombo::new(KeyCode::Tab, none));
        kb.add(ConfirmToggle, KeyCombo::new(KeyCode::BackTab, none));
        kb.add(ConfirmLeft, KeyCombo::new(KeyCode::Left, none));
        kb.add(ConfirmRight, KeyCombo::new(KeyCode::Right, none));
        kb.add(ConfirmAccept, KeyCombo::new(KeyCode::Enter, none));
        kb.add(ConfirmAccept, KeyCombo::new(KeyCode::Char('y'), none));
        kb.add(ConfirmCancel, KeyCombo::new(KeyCode::Esc, none));
        kb.add(ConfirmCancel, KeyCombo::new(KeyCode::Char('n'), none));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    /// Drop every combo bound to `action`.
    pub fn clear(&mut self, action: Action) {
        self.map.remove(&action);
    }

    pub fn matches(&self, action: Action, key: &KeyInput) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }

    /// Return the first `KeyCombo` mapped to `action`, if any.
    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_quit() {
        let kb = KeyBindings::default();
        let ev = KeyInput::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(kb.matches(Action::Quit, &ev));
        let plain = KeyInput::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!kb.matches(Action::Quit, &plain));
    }

    #[test]
    fn shift_arrows_extend_selection() {
        let kb = KeyBindings::default();
        let ev = KeyInput::new(KeyCode::Left, KeyModifiers::SHIFT);
        assert!(kb.matches(Action::SelectLeft, &ev));
        assert!(!kb.matches(Action::CaretLeft, &ev));
        assert_eq!(kb.combos_for(Action::SelectLeft), vec!["Shift+Left"]);
    }

    #[test]
    fn clear_removes_binding() {
        let mut kb = KeyBindings::default();
        kb.clear(Action::Quit);
        assert!(kb.first_combo(Action::Quit).is_none());
    }
}
