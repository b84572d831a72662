use std::ops::Range;

use crossterm::event::MouseButton;

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::component::{Component, Ctx, Cursor};
use crate::event::{KeyInput, MouseUpReason};
use crate::geom::{Point, Rect};
use crate::keybindings::{Action, KeyBindings};
use crate::text::{Index, TextWrapper, WrappedText};
use crate::theme;
use crate::ui::UiFrame;

const EDIT_ACTIONS: &[Action] = &[
    Action::CaretLeft,
    Action::CaretRight,
    Action::CaretUp,
    Action::CaretDown,
    Action::CaretHome,
    Action::CaretEnd,
    Action::SelectLeft,
    Action::SelectRight,
    Action::SelectUp,
    Action::SelectDown,
    Action::SelectAll,
    Action::DeleteBack,
    Action::DeleteForward,
    Action::Newline,
    Action::Copy,
    Action::Cut,
    Action::Paste,
];

/// Editable text. The caret and selection anchor are raw character
/// indices; everything visual goes through the wrapped layout.
pub struct TextField {
    text: String,
    caret: usize,
    anchor: Option<usize>,
    /// Column vertical movement aims for, kept across consecutive moves.
    desired_x: Option<i32>,
    scroll: i32,
    multiline: bool,
    placeholder: Option<String>,
    composing: String,
    wrapper: TextWrapper,
    layout: WrappedText,
    dirty: bool,
    clipboard: Box<dyn Clipboard>,
    bindings: KeyBindings,
}

impl std::fmt::Debug for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextField")
            .field("text", &self.text)
            .field("caret", &self.caret)
            .field("anchor", &self.anchor)
            .field("multiline", &self.multiline)
            .finish()
    }
}

impl TextField {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = text.chars().count();
        Self {
            text,
            caret,
            anchor: None,
            desired_x: None,
            scroll: 0,
            multiline: false,
            placeholder: None,
            composing: String::new(),
            wrapper: TextWrapper::new(None),
            layout: WrappedText::default(),
            dirty: true,
            clipboard: Box::new(MemoryClipboard::new()),
            bindings: KeyBindings::default(),
        }
    }

    /// Wrap to the field width and accept line breaks.
    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self.dirty = true;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.caret = self.char_len();
        self.anchor = None;
        self.desired_x = None;
        self.dirty = true;
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.char_len());
        self.anchor = None;
        self.desired_x = None;
    }

    /// Selected raw range, if non-empty.
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let range = anchor.min(self.caret)..anchor.max(self.caret);
        (!range.is_empty()).then_some(range)
    }

    pub fn select(&mut self, range: Range<usize>) {
        let len = self.char_len();
        self.anchor = Some(range.start.min(len));
        self.caret = range.end.min(len);
    }

    pub fn selected_text(&self) -> Option<String> {
        let range = self.selection()?;
        Some(self.text.chars().skip(range.start).take(range.len()).collect())
    }

    /// Uncommitted IME text shown at the caret.
    pub fn composing(&self) -> &str {
        &self.composing
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn ensure_layout(&mut self, width: i32) {
        let max_width = self.multiline.then_some(width.max(1));
        if self.wrapper.max_width() != max_width {
            self.wrapper.set_max_width(max_width);
            self.dirty = true;
        }
        if self.dirty {
            self.layout = self.wrapper.wrap(&self.text);
            self.dirty = false;
        }
    }

    fn caret_index(&self) -> Index {
        self.layout.raw_to_index(self.caret)
    }

    fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return false;
        };
        let (start, end) = (self.byte_at(range.start), self.byte_at(range.end));
        self.text.replace_range(start..end, "");
        self.caret = range.start;
        self.anchor = None;
        self.dirty = true;
        true
    }

    /// Replace the selection (if any) with `text` and move the caret past it.
    pub fn insert(&mut self, text: &str) {
        self.delete_selection();
        let at = self.byte_at(self.caret);
        self.text.insert_str(at, text);
        self.caret += text.chars().count();
        self.desired_x = None;
        self.dirty = true;
    }

    fn accepts(&self, c: char) -> bool {
        if c == '\n' {
            self.multiline
        } else {
            !c.is_control()
        }
    }

    fn sanitize(&self, text: &str) -> String {
        text.chars()
            .map(|c| if c == '\n' && !self.multiline { ' ' } else { c })
            .filter(|c| self.accepts(*c))
            .collect()
    }

    /// Move the caret, extending the selection when `select` is set.
    fn move_to(&mut self, caret: usize, select: bool) {
        if select {
            self.anchor.get_or_insert(self.caret);
        } else {
            self.anchor = None;
        }
        self.caret = caret.min(self.char_len());
    }

    fn move_vertical(&mut self, delta: isize, select: bool) -> bool {
        if self.layout.line_count() < 2 {
            return false;
        }
        let from = self.caret_index();
        let x = self
            .desired_x
            .unwrap_or_else(|| self.layout.index_to_point_line(from.wrapped).0.x);
        let to = self.layout.caret_vertical(from, delta, x);
        self.move_to(to.raw, select);
        self.desired_x = Some(x);
        true
    }

    fn line_edge(&self, end: bool) -> usize {
        let (start, stop) = self.layout.line_bounds(self.caret_index().wrapped);
        if !end {
            return start.raw;
        }
        // A wrapped line ends where the next begins; stay before its
        // trailing space so the caret remains on this line.
        let soft = self
            .layout
            .entries()
            .get(stop.wrapped)
            .is_some_and(|e| e.raw.is_none());
        if soft && stop.raw > start.raw {
            stop.raw - 1
        } else {
            stop.raw
        }
    }

    fn copy(&mut self) -> bool {
        let Some(text) = self.selected_text() else {
            return false;
        };
        if let Err(err) = self.clipboard.set_text(&text) {
            tracing::warn!(%err, "copy failed");
        }
        true
    }

    fn paste(&mut self) -> bool {
        match self.clipboard.get_text() {
            Ok(text) => {
                let text = self.sanitize(&text);
                self.insert(&text);
            }
            Err(err) => tracing::warn!(%err, "paste failed"),
        }
        true
    }

    fn apply(&mut self, action: Action) -> bool {
        let len = self.char_len();
        let handled = match action {
            Action::CaretLeft => {
                let to = match self.selection() {
                    Some(range) => range.start,
                    None => self.caret.saturating_sub(1),
                };
                self.move_to(to, false);
                true
            }
            Action::CaretRight => {
                let to = match self.selection() {
                    Some(range) => range.end,
                    None => self.caret + 1,
                };
                self.move_to(to, false);
                true
            }
            Action::SelectLeft => {
                self.move_to(self.caret.saturating_sub(1), true);
                true
            }
            Action::SelectRight => {
                self.move_to(self.caret + 1, true);
                true
            }
            Action::CaretUp => return self.move_vertical(-1, false),
            Action::CaretDown => return self.move_vertical(1, false),
            Action::SelectUp => return self.move_vertical(-1, true),
            Action::SelectDown => return self.move_vertical(1, true),
            Action::CaretHome => {
                self.move_to(self.line_edge(false), false);
                true
            }
            Action::CaretEnd => {
                self.move_to(self.line_edge(true), false);
                true
            }
            Action::SelectAll => {
                self.select(0..len);
                true
            }
            Action::DeleteBack => {
                if !self.delete_selection() && self.caret > 0 {
                    self.select(self.caret - 1..self.caret);
                    self.delete_selection();
                }
                true
            }
            Action::DeleteForward => {
                if !self.delete_selection() && self.caret < len {
                    self.select(self.caret..self.caret + 1);
                    self.delete_selection();
                }
                true
            }
            Action::Newline => {
                if !self.multiline {
                    return false;
                }
                self.insert("\n");
                true
            }
            Action::Copy => return self.copy(),
            Action::Cut => {
                let copied = self.copy();
                self.delete_selection();
                return copied;
            }
            Action::Paste => return self.paste(),
            _ => return false,
        };
        self.desired_x = None;
        handled
    }

    fn index_at(&self, ctx: &Ctx<'_>, pos: Point) -> usize {
        let local = ctx.to_local(pos) + Point::new(0, self.scroll);
        self.layout.point_to_index(local).raw
    }

    fn scroll_to_caret(&mut self, height: i32) {
        let (point, _) = self.layout.index_to_point_line(self.caret_index().wrapped);
        let lh = self.layout.line_height();
        if point.y < self.scroll {
            self.scroll = point.y;
        } else if point.y + lh > self.scroll + height {
            self.scroll = point.y + lh - height;
        }
        let max = (self.layout.height() - height).max(0);
        self.scroll = self.scroll.clamp(0, max);
    }
}

impl Component for TextField {
    fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        let rect = ctx.rect();
        self.ensure_layout(rect.size.width);
        self.scroll_to_caret(rect.size.height);
        let focused = ctx.focused();
        frame.fill_rect(rect, theme::field());
        let origin = rect.pos - Point::new(0, self.scroll);

        frame.with_clip(rect, |frame| {
            if self.text.is_empty()
                && !focused
                && let Some(placeholder) = &self.placeholder
            {
                frame.text_run(origin, placeholder, theme::button_disabled());
            }
            self.layout.draw(frame, origin, theme::field());

            if let Some(range) = self.selection() {
                for (i, entry) in self.layout.entries().iter().enumerate() {
                    if entry.raw.is_some_and(|r| range.contains(&r))
                        && let Some(cell) = self.layout.entry_rect(i, origin)
                    {
                        frame.for_each_cell(cell, |c| {
                            c.set_style(theme::field_selection());
                        });
                    }
                }
            }

            if focused {
                let (point, _) = self.layout.index_to_point_line(self.caret_index().wrapped);
                let at = origin + point;
                if !self.composing.is_empty() {
                    frame.text_run(at, &self.composing, theme::field_selection());
                }
                frame.for_each_cell(Rect::new(at.x, at.y, 1, 1), |c| {
                    c.set_style(theme::caret());
                });
            }
        });
    }

    fn focus_lose(&mut self, _ctx: &mut Ctx<'_>) {
        self.composing.clear();
    }

    fn mouse_enter(&mut self, ctx: &mut Ctx<'_>, _pos: Point) {
        ctx.set_hover_cursor(Cursor::IBeam);
    }

    fn mouse_down(&mut self, ctx: &mut Ctx<'_>, pos: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        self.ensure_layout(ctx.size().width);
        let at = self.index_at(ctx, pos);
        self.move_to(at, false);
        self.anchor = Some(at);
        self.desired_x = None;
        true
    }

    fn drag_move(&mut self, ctx: &mut Ctx<'_>, pos: Point, _delta: Point) {
        self.ensure_layout(ctx.size().width);
        self.caret = self.index_at(ctx, pos);
    }

    fn mouse_up(
        &mut self,
        _ctx: &mut Ctx<'_>,
        _pos: Point,
        button: MouseButton,
        _reason: MouseUpReason,
    ) -> bool {
        if self.anchor == Some(self.caret) {
            self.anchor = None;
        }
        button == MouseButton::Left
    }

    fn mouse_wheel(&mut self, ctx: &mut Ctx<'_>, _pos: Point, _dx: i32, dy: i32) -> bool {
        if !self.multiline {
            return false;
        }
        let size = ctx.size();
        self.ensure_layout(size.width);
        let max = (self.layout.height() - size.height).max(0);
        self.scroll = (self.scroll + dy).clamp(0, max);
        true
    }

    fn key_press(&mut self, ctx: &mut Ctx<'_>, key: &KeyInput) -> bool {
        self.ensure_layout(ctx.size().width);
        let action = EDIT_ACTIONS
            .iter()
            .copied()
            .find(|a| self.bindings.matches(*a, key));
        if let Some(action) = action {
            let handled = self.apply(action);
            self.ensure_layout(ctx.size().width);
            return handled;
        }
        // Printable keys arrive again as TEXTINPUT; claim them here so they
        // don't trigger shortcuts further up.
        !key.ctrl()
            && !key.alt()
            && matches!(key.code, crossterm::event::KeyCode::Char(c) if !c.is_control())
    }

    fn text_input(&mut self, ctx: &mut Ctx<'_>, text: &str) -> bool {
        self.composing.clear();
        let text = self.sanitize(text);
        if text.is_empty() {
            return false;
        }
        self.insert(&text);
        self.ensure_layout(ctx.size().width);
        true
    }

    fn text_editing(&mut self, _ctx: &mut Ctx<'_>, text: &str) -> bool {
        self.composing = text.to_owned();
        true
    }
}
