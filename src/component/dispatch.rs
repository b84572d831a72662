//! Event routing and drawing over the component tree.

use crossterm::event::MouseButton;

use super::guard::Forbid;
use super::node::Press;
use super::tree::Order;
use super::{ComponentId, NodeFlags, Tree};
use crate::event::{Event, MouseUpReason};
use crate::geom::Point;
use crate::ui::UiFrame;

impl Tree {
    /// Route `event` into the subtree rooted at `id`.
    ///
    /// Returns whether some component consumed it. Lifecycle events (Tick,
    /// Quit, focus and renderer notifications) always report `false`.
    pub fn handle_event(&mut self, id: ComponentId, event: &Event) -> bool {
        if !self.contains(id) {
            return false;
        }
        match event {
            Event::Tick | Event::Quit => {
                self.broadcast(id, event);
                false
            }
            Event::Draw => {
                tracing::warn!(component = ?id, "Draw needs a frame; use Tree::draw");
                false
            }
            Event::RendererUp => {
                let mut guard = self.forbid(Forbid::STRUCTURE);
                guard.deliver_renderer_up(id);
                false
            }
            Event::RendererDown => {
                let mut guard = self.forbid(Forbid::STRUCTURE);
                guard.deliver_renderer_down(id);
                false
            }
            Event::FocusGain | Event::FocusLose => {
                for node in self.focus_chain(id) {
                    self.notify(node, event);
                }
                false
            }
            Event::MouseEnter { pos } => {
                self.on_mouse_enter(id, *pos);
                false
            }
            Event::MouseLeave => {
                self.on_mouse_leave(id);
                false
            }
            Event::MouseMove { pos, delta } => self.on_mouse_move(id, *pos, *delta),
            Event::MouseDown { pos, button } => self.on_mouse_down(id, *pos, *button),
            Event::MouseUp {
                pos,
                button,
                reason,
            } => self.on_mouse_up(id, *pos, *button, *reason),
            Event::MouseWheel { pos, dx, dy } => self.on_mouse_wheel(id, *pos, *dx, *dy),
            Event::KeyPress(_)
            | Event::KeyRelease(_)
            | Event::TextInput(_)
            | Event::TextEditing(_)
            | Event::FileDrop(_) => self.on_focus_routed(id, event),
        }
    }

    /// Tick and Quit reach every node, parents first, in ownership order.
    fn broadcast(&mut self, id: ComponentId, event: &Event) {
        self.notify(id, event);
        self.for_each_child(id, Order::Ownership, |tree, child| {
            tree.broadcast(child, event)
        });
    }

    /// Front-most visible child of `id` under `pos`, or the capturing child
    /// regardless of position.
    pub fn hit_test(&self, id: ComponentId, pos: Point) -> Option<ComponentId> {
        let node = self.nodes.get(id)?;
        if let Some(captured) = node.with_capture
            && self.contains(captured)
        {
            return Some(captured);
        }
        let clip = self.child_clip_abs(id);
        node.z_order.iter().rev().flatten().copied().find(|&child| {
            let Some(child) = self.nodes.get(child) else {
                return false;
            };
            if !child.visible() {
                return false;
            }
            if child.flags.contains(NodeFlags::STEALS_MOUSE) {
                return true;
            }
            clip.is_none_or(|c| c.contains(pos)) && child.hit_rect().contains(pos)
        })
    }

    /// Deepest node under `pos` starting from `id`.
    pub fn deepest_at(&self, id: ComponentId, pos: Point) -> ComponentId {
        let mut current = id;
        while let Some(child) = self.hit_test(current, pos) {
            current = child;
        }
        current
    }

    /// Re-resolve the hover chain below `id` for `pos` without delivering a
    /// move, sending leave/enter pairs where it changed.
    pub fn refresh_hover(&mut self, id: ComponentId, pos: Point) {
        if !self.is_enabled(id) {
            return;
        }
        let under = self.hit_test(id, pos);
        self.set_under(id, under, pos);
        if let Some(child) = self.under_mouse(id) {
            self.refresh_hover(child, pos);
        }
    }

    fn set_under(&mut self, id: ComponentId, under: Option<ComponentId>, pos: Point) {
        let old = self.under_mouse(id);
        if old == under {
            return;
        }
        self.set_under_mouse(id, under);
        {
            let mut guard = self.forbid(Forbid::STRUCTURE);
            if let Some(old) = old {
                guard.on_mouse_leave(old);
            }
            if let Some(new) = under {
                guard.on_mouse_enter(new, pos);
            }
        }
        if let Some(new) = under
            && self.flags(new).contains(NodeFlags::TO_FRONT_ON_HOVER)
            && self.under_mouse(id) == Some(new)
        {
            let _ = self.child_to_front(id, new);
        }
    }

    pub(crate) fn on_mouse_enter(&mut self, id: ComponentId, pos: Point) {
        self.notify(id, &Event::MouseEnter { pos });
        if !self.is_enabled(id) {
            return;
        }
        let under = self.hit_test(id, pos);
        self.set_under(id, under, pos);
    }

    /// Leaf of the hover chain first, then upwards.
    pub(crate) fn on_mouse_leave(&mut self, id: ComponentId) {
        if let Some(child) = self.under_mouse(id) {
            self.set_under_mouse(id, None);
            self.on_mouse_leave(child);
        }
        self.notify(id, &Event::MouseLeave);
    }

    fn on_mouse_move(&mut self, id: ComponentId, pos: Point, delta: Point) -> bool {
        if !self.is_enabled(id) {
            return false;
        }
        let under = self.hit_test(id, pos);
        self.set_under(id, under, pos);
        self.track_drag(id, pos, delta);
        let own = self
            .call(id, |w, ctx| w.mouse_move(ctx, pos, delta))
            .unwrap_or(false);
        let below = match self.under_mouse(id) {
            Some(child) => self.on_mouse_move(child, pos, delta),
            None => false,
        };
        own || below
    }

    fn track_drag(&mut self, id: ComponentId, pos: Point, delta: Point) {
        let Some(mut press) = self.press(id) else {
            return;
        };
        let begins = !press.dragging;
        press.dragging = true;
        press.last = pos;
        self.set_press(id, Some(press));
        if begins {
            self.call(id, |w, ctx| w.drag_begin(ctx, press.origin, press.button));
        }
        self.call(id, |w, ctx| w.drag_move(ctx, pos, delta));
    }

    /// The child under the pointer sees the press first; if nothing below
    /// consumes it the node's own handler runs. The deepest enabled node
    /// hit gains focus and mouse capture.
    fn on_mouse_down(&mut self, id: ComponentId, pos: Point, button: MouseButton) -> bool {
        if !self.is_enabled(id) || !self.is_visible(id) {
            return false;
        }
        let under = self.hit_test(id, pos);
        self.set_under(id, under, pos);
        let target = self
            .under_mouse(id)
            .filter(|child| self.is_enabled(*child));
        let consumed = match target {
            Some(child) => self.on_mouse_down(child, pos, button),
            None => {
                self.begin_press(id, pos, button);
                false
            }
        };
        if consumed {
            return true;
        }
        self.call(id, |w, ctx| w.mouse_down(ctx, pos, button))
            .unwrap_or(false)
    }

    fn begin_press(&mut self, id: ComponentId, pos: Point, button: MouseButton) {
        if self.press(id).is_some() {
            return;
        }
        self.focus(id);
        self.capture_mouse(id, true);
        self.set_press(
            id,
            Some(Press {
                button,
                origin: pos,
                last: pos,
                dragging: false,
            }),
        );
    }

    fn on_mouse_up(
        &mut self,
        id: ComponentId,
        pos: Point,
        button: MouseButton,
        reason: MouseUpReason,
    ) -> bool {
        if !self.contains(id) {
            return false;
        }
        let target = self
            .hit_test(id, pos)
            .filter(|child| self.is_enabled(*child));
        let consumed_below = match target {
            Some(child) => self.on_mouse_up(child, pos, button, reason),
            None => false,
        };
        let consumed = consumed_below
            || self
                .call(id, |w, ctx| w.mouse_up(ctx, pos, button, reason))
                .unwrap_or(false);
        self.end_press(id, pos, button, reason);
        consumed
    }

    /// Releasing the held button ends capture and drag. A click fires only
    /// if the release lands inside the node.
    fn end_press(&mut self, id: ComponentId, pos: Point, button: MouseButton, reason: MouseUpReason) {
        let Some(press) = self.press(id) else {
            return;
        };
        if press.button != button {
            return;
        }
        self.set_press(id, None);
        self.capture_mouse(id, false);
        if press.dragging {
            self.call(id, |w, ctx| w.drag_end(ctx, pos, button));
        }
        let inside = self.hit_rect(id).is_some_and(|r| r.contains(pos));
        if reason == MouseUpReason::Normal && inside && self.is_visible(id) {
            self.call(id, |w, ctx| w.click(ctx, pos, button));
        }
    }

    fn on_mouse_wheel(&mut self, id: ComponentId, pos: Point, dx: i32, dy: i32) -> bool {
        if !self.is_enabled(id) || !self.is_visible(id) {
            return false;
        }
        let under = self.hit_test(id, pos);
        self.set_under(id, under, pos);
        let target = self
            .under_mouse(id)
            .filter(|child| self.is_enabled(*child));
        if let Some(child) = target
            && self.on_mouse_wheel(child, pos, dx, dy)
        {
            return true;
        }
        self.call(id, |w, ctx| w.mouse_wheel(ctx, pos, dx, dy))
            .unwrap_or(false)
    }

    /// Keyboard, text and file-drop events walk the focus chain: the focused
    /// child is offered the event first, then each ancestor on the way back.
    fn on_focus_routed(&mut self, id: ComponentId, event: &Event) -> bool {
        if !self.is_enabled(id) || !self.is_visible(id) {
            return false;
        }
        if let Some(child) = self.focused_child(id)
            && self.on_focus_routed(child, event)
        {
            return true;
        }
        self.call(id, |w, ctx| match event {
            Event::KeyPress(key) => w.key_press(ctx, key),
            Event::KeyRelease(key) => w.key_release(ctx, key),
            Event::TextInput(text) => w.text_input(ctx, text),
            Event::TextEditing(text) => w.text_editing(ctx, text),
            Event::FileDrop(path) => w.file_drop(ctx, path),
            _ => false,
        })
        .unwrap_or(false)
    }

    /// Paint the subtree at `id`: the node, its visible children back to
    /// front (clipped to the child clip), then the node's after-children
    /// pass.
    pub fn draw(&mut self, id: ComponentId, frame: &mut UiFrame<'_>) {
        if !self.is_visible(id) {
            return;
        }
        self.call(id, |w, ctx| w.draw(ctx, frame));
        let clip = self.child_clip_abs(id);
        if let Some(clip) = clip {
            frame.push_clip(clip);
        }
        self.for_each_child(id, Order::Z, |tree, child| tree.draw(child, frame));
        if clip.is_some() {
            frame.pop_clip();
        }
        self.call(id, |w, ctx| w.draw_after_children(ctx, frame));
    }
}
