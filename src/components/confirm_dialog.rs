use std::cell::Cell;
use std::rc::Rc;

use unicode_width::UnicodeWidthStr;

use super::{Button, Label};
use crate::component::{Component, ComponentId, Ctx, Tree};
use crate::error::StackError;
use crate::event::KeyInput;
use crate::geom::{Point, Rect};
use crate::keybindings::{Action, KeyBindings};
use crate::text::{TextWrapper, strip};
use crate::theme;
use crate::ui::UiFrame;
use crate::window::{ModalOptions, WindowStack};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

const MIN_WIDTH: i32 = 24;
const CONFIRM_LABEL: &str = "OK";
const CANCEL_LABEL: &str = "Cancel";

type Outcome = Rc<Cell<Option<ConfirmAction>>>;

/// What the caller keeps of an open dialog.
#[derive(Debug, Clone)]
pub struct ConfirmHandle {
    root: ComponentId,
    outcome: Outcome,
}

impl ConfirmHandle {
    pub fn root(&self) -> ComponentId {
        self.root
    }

    /// The chosen action once the dialog has closed.
    pub fn result(&self) -> Option<ConfirmAction> {
        self.outcome.get()
    }
}

/// Yes/no question in a bordered box. The dialog destroys its own root once
/// answered; the window stack drops it on the next frame.
#[derive(Debug)]
pub struct ConfirmDialog {
    title: String,
    confirm: ComponentId,
    cancel: ComponentId,
    outcome: Outcome,
    bindings: KeyBindings,
}

fn finish(ctx: &mut Ctx<'_>, outcome: &Outcome, action: ConfirmAction) {
    if outcome.get().is_some() {
        return;
    }
    tracing::debug!(?action, "confirm dialog answered");
    outcome.set(Some(action));
    let root = ctx.root_of(ctx.id());
    ctx.destroy(root);
}

impl ConfirmDialog {
    /// Build the dialog subtree centred in `area` and push it with a
    /// darkened backdrop.
    pub fn open(
        stack: &mut WindowStack,
        title: &str,
        body: &str,
        area: Rect,
    ) -> Result<ConfirmHandle, StackError> {
        let bindings = stack.config().bindings.clone();
        let handle = Self::build(stack.tree_mut(), title, body, area, bindings);
        stack.push(handle.root, ModalOptions::with_backdrop())?;
        Ok(handle)
    }

    /// Build the dialog subtree without pushing it.
    pub fn build(
        tree: &mut Tree,
        title: &str,
        body: &str,
        area: Rect,
        bindings: KeyBindings,
    ) -> ConfirmHandle {
        let body_width = strip(body)
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0) as i32;
        let title_width = UnicodeWidthStr::width(strip(title).as_str()) as i32;
        let width = (body_width + 4)
            .max(title_width + 6)
            .max(MIN_WIDTH)
            .min(area.size.width.max(MIN_WIDTH));
        let text_width = width - 4;
        let body_lines = TextWrapper::new(Some(text_width)).wrap(body).line_count() as i32;
        let height = body_lines + 4;
        let rect = Rect::new(
            area.pos.x + (area.size.width - width).max(0) / 2,
            area.pos.y + (area.size.height - height).max(0) / 2,
            width,
            height,
        );

        let outcome: Outcome = Rc::new(Cell::new(None));
        let cancel_width = CANCEL_LABEL.len() as i32 + 4;
        let confirm_width = CONFIRM_LABEL.len() as i32 + 4;
        let button_y = height - 2;

        let label = tree.create(Label::new(body).with_style(theme::dialog()));
        tree.set_rect(label, Rect::new(2, 1, text_width, body_lines));

        let on_cancel = outcome.clone();
        let cancel = tree.create(
            Button::new(CANCEL_LABEL)
                .on_click(move |ctx| finish(ctx, &on_cancel, ConfirmAction::Cancel)),
        );
        let confirm_x = width - 2 - confirm_width;
        tree.set_rect(
            cancel,
            Rect::new(confirm_x - 1 - cancel_width, button_y, cancel_width, 1),
        );

        let on_confirm = outcome.clone();
        let confirm = tree.create(
            Button::new(CONFIRM_LABEL)
                .on_click(move |ctx| finish(ctx, &on_confirm, ConfirmAction::Confirm)),
        );
        tree.set_rect(confirm, Rect::new(confirm_x, button_y, confirm_width, 1));

        let root = tree.create(ConfirmDialog {
            title: title.to_owned(),
            confirm,
            cancel,
            outcome: outcome.clone(),
            bindings,
        });
        tree.set_rect(root, rect);
        tree.set_child_clip(root, Some(Rect::new(1, 1, width - 2, height - 2)));
        for child in [label, cancel, confirm] {
            if let Err(err) = tree.insert_child(root, child) {
                tracing::warn!(%err, "confirm dialog child not attached");
            }
        }
        tree.focus(confirm);
        ConfirmHandle { root, outcome }
    }

    /// The button currently answering ACCEPT.
    pub fn selected(&self, tree: &Tree, root: ComponentId) -> ConfirmAction {
        if tree.focused_child(root) == Some(self.cancel) {
            ConfirmAction::Cancel
        } else {
            ConfirmAction::Confirm
        }
    }

    fn select(&self, ctx: &mut Ctx<'_>, action: ConfirmAction) {
        let target = match action {
            ConfirmAction::Confirm => self.confirm,
            ConfirmAction::Cancel => self.cancel,
        };
        ctx.focus(target);
    }
}

impl Component for ConfirmDialog {
    fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        frame.fill_rect(ctx.rect(), theme::dialog());
    }

    fn draw_after_children(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        let rect = ctx.rect();
        let border = theme::panel_border_focused();
        frame.outline_rect(rect, border);
        let sep_y = rect.pos.y + rect.size.height - 3;
        frame.line(
            Point::new(rect.pos.x + 1, sep_y),
            Point::new(rect.pos.x + rect.size.width - 2, sep_y),
            "─",
            theme::dialog_separator(),
        );
        if rect.size.width > 4 {
            let title: String = strip(&self.title)
                .chars()
                .take((rect.size.width - 4) as usize)
                .collect();
            frame.text_run(rect.pos + Point::new(2, 0), &title, border);
        }
    }

    fn key_press(&mut self, ctx: &mut Ctx<'_>, key: &KeyInput) -> bool {
        let id = ctx.id();
        let selected = self.selected(ctx, id);
        if self.bindings.matches(Action::ConfirmToggle, key) {
            let other = match selected {
                ConfirmAction::Confirm => ConfirmAction::Cancel,
                ConfirmAction::Cancel => ConfirmAction::Confirm,
            };
            self.select(ctx, other);
        } else if self.bindings.matches(Action::ConfirmLeft, key) {
            self.select(ctx, ConfirmAction::Cancel);
        } else if self.bindings.matches(Action::ConfirmRight, key) {
            self.select(ctx, ConfirmAction::Confirm);
        } else if self.bindings.matches(Action::ConfirmAccept, key) {
            finish(ctx, &self.outcome, selected);
        } else if self.bindings.matches(Action::ConfirmCancel, key) {
            finish(ctx, &self.outcome, ConfirmAction::Cancel);
        } else {
            return false;
        }
        true
    }
}
