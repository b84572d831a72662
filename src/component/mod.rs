//! Retained component tree.
//!
//! Nodes live in a [`Tree`] arena and are addressed by [`ComponentId`]. The
//! tree owns geometry, z-order, hover/focus/capture chains and event routing;
//! a node's behaviour is supplied by a boxed [`Component`] whose override
//! points all default to no-ops.

use std::any::Any;
use std::path::Path;

use crossterm::event::MouseButton;

use crate::event::{KeyInput, MouseUpReason};
use crate::geom::Point;
use crate::ui::UiFrame;

pub mod context;
mod dispatch;
pub mod guard;
mod node;
mod tree;

pub use context::Ctx;
pub use guard::{Forbid, ForbidGuard};
pub use node::{Cursor, NodeFlags};
pub use tree::Tree;

slotmap::new_key_type! {
    /// Stable handle to a node in a [`Tree`].
    pub struct ComponentId;
}

/// Behaviour attached to a tree node.
///
/// Input handlers return `true` when they consumed the event; an unconsumed
/// mouse event continues to the parent, an unconsumed keyboard event falls
/// back from the focused leaf to its ancestors.
pub trait Component {
    fn tick(&mut self, _ctx: &mut Ctx<'_>) {}

    /// Paint this node. Children are painted afterwards, front-most last.
    fn draw(&mut self, _ctx: &mut Ctx<'_>, _frame: &mut UiFrame<'_>) {}

    /// Paint on top of the children (borders, carets, focus rings).
    fn draw_after_children(&mut self, _ctx: &mut Ctx<'_>, _frame: &mut UiFrame<'_>) {}

    fn quit(&mut self, _ctx: &mut Ctx<'_>) {}

    fn focus_gain(&mut self, _ctx: &mut Ctx<'_>) {}

    fn focus_lose(&mut self, _ctx: &mut Ctx<'_>) {}

    fn mouse_enter(&mut self, _ctx: &mut Ctx<'_>, _pos: Point) {}

    fn mouse_leave(&mut self, _ctx: &mut Ctx<'_>) {}

    fn mouse_move(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _delta: Point) -> bool {
        false
    }

    fn mouse_down(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _button: MouseButton) -> bool {
        false
    }

    fn mouse_up(
        &mut self,
        _ctx: &mut Ctx<'_>,
        _pos: Point,
        _button: MouseButton,
        _reason: MouseUpReason,
    ) -> bool {
        false
    }

    fn mouse_wheel(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _dx: i32, _dy: i32) -> bool {
        false
    }

    fn key_press(&mut self, _ctx: &mut Ctx<'_>, _key: &KeyInput) -> bool {
        false
    }

    fn key_release(&mut self, _ctx: &mut Ctx<'_>, _key: &KeyInput) -> bool {
        false
    }

    fn text_input(&mut self, _ctx: &mut Ctx<'_>, _text: &str) -> bool {
        false
    }

    /// Uncommitted IME composition text.
    fn text_editing(&mut self, _ctx: &mut Ctx<'_>, _text: &str) -> bool {
        false
    }

    fn file_drop(&mut self, _ctx: &mut Ctx<'_>, _path: &Path) -> bool {
        false
    }

    /// A renderer became available; (re)create surface-bound resources.
    fn renderer_up(&mut self, _ctx: &mut Ctx<'_>) {}

    /// The renderer is going away; release surface-bound resources.
    fn renderer_down(&mut self, _ctx: &mut Ctx<'_>) {}

    fn drag_begin(&mut self, _ctx: &mut Ctx<'_>, _origin: Point, _button: MouseButton) {}

    fn drag_move(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _delta: Point) {}

    fn drag_end(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _button: MouseButton) {}

    /// Press and release of the same button, both inside this node.
    fn click(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _button: MouseButton) {}
}

/// Object-safe component with downcasting, stored in the tree.
pub trait Widget: Component + Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component + Any> Widget for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Component with no behaviour of its own; useful as a grouping container.
#[derive(Debug, Default, Clone, Copy)]
pub struct Group;

impl Component for Group {}

#[cfg(test)]
mod tests;
