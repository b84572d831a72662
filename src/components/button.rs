use crossterm::event::{KeyCode, MouseButton};

use crate::component::{Component, Ctx, Cursor};
use crate::event::KeyInput;
use crate::geom::Point;
use crate::text::{Align, strip};
use crate::theme;
use crate::ui::UiFrame;

pub type ClickHandler = Box<dyn FnMut(&mut Ctx<'_>)>;

/// Single-line push button. Activates on a left click or, while focused,
/// on Enter/Space.
pub struct Button {
    label: String,
    on_click: Option<ClickHandler>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on_click: None,
        }
    }

    pub fn on_click(mut self, handler: impl FnMut(&mut Ctx<'_>) + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    fn activate(&mut self, ctx: &mut Ctx<'_>) {
        tracing::trace!(button = %self.label, "activated");
        if let Some(handler) = self.on_click.as_mut() {
            handler(ctx);
        }
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button").field("label", &self.label).finish()
    }
}

impl Component for Button {
    fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        let rect = ctx.rect();
        let style = if !ctx.is_enabled(ctx.id()) {
            theme::button_disabled()
        } else if ctx.capturing() {
            theme::button_pressed()
        } else if ctx.hovered() || ctx.focused() {
            theme::button_hover()
        } else {
            theme::button()
        };
        frame.fill_rect(rect, style);
        let text = strip(&self.label);
        let width = unicode_width::UnicodeWidthStr::width(text.as_str()) as i32;
        let x = rect.pos.x + Align::Center.offset(width, rect.size.width);
        let y = rect.pos.y + (rect.size.height - 1).max(0) / 2;
        frame.with_clip(rect, |frame| frame.text_run(Point::new(x, y), &text, style));
    }

    fn mouse_enter(&mut self, ctx: &mut Ctx<'_>, _pos: Point) {
        ctx.set_hover_cursor(Cursor::Hand);
    }

    fn mouse_down(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, button: MouseButton) -> bool {
        button == MouseButton::Left
    }

    fn click(&mut self, ctx: &mut Ctx<'_>, _pos: Point, button: MouseButton) {
        if button == MouseButton::Left {
            self.activate(ctx);
        }
    }

    fn key_press(&mut self, ctx: &mut Ctx<'_>, key: &KeyInput) -> bool {
        if key.ctrl() || key.alt() {
            return false;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.activate(ctx);
                true
            }
            _ => false,
        }
    }
}
