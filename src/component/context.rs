//! Per-call component context.
//!
//! `Ctx` is handed to every [`Component`](super::Component) override point.
//! It pairs the tree with the id of the node being called so components can
//! query their own state and reshape the tree without carrying ids around.
//! Everything on [`Tree`] remains reachable through `Deref`.

use std::ops::{Deref, DerefMut};

use super::{ComponentId, Component, Cursor, Tree};
use crate::error::TreeError;
use crate::geom::{Point, Rect, Size};

pub struct Ctx<'a> {
    tree: &'a mut Tree,
    id: ComponentId,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(tree: &'a mut Tree, id: ComponentId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// False once this node was removed from the tree by its own handler.
    pub fn alive(&self) -> bool {
        self.tree.contains(self.id)
    }

    /// Absolute rectangle of this node.
    pub fn rect(&self) -> Rect {
        self.tree.rect(self.id).unwrap_or_default()
    }

    pub fn size(&self) -> Size {
        self.rect().size
    }

    /// Convert an absolute point to this node's local coordinates.
    pub fn to_local(&self, point: Point) -> Point {
        point - self.rect().pos
    }

    pub fn focused(&self) -> bool {
        self.tree.has_focus(self.id)
    }

    pub fn hovered(&self) -> bool {
        self.tree.has_hover(self.id)
    }

    pub fn capturing(&self) -> bool {
        self.tree.has_capture(self.id)
    }

    pub fn focus_self(&mut self) {
        let id = self.id;
        self.tree.focus(id);
    }

    pub fn capture(&mut self, on: bool) {
        let id = self.id;
        self.tree.capture_mouse(id, on);
    }

    pub fn set_tooltip(&mut self, text: Option<String>) {
        let id = self.id;
        self.tree.set_tooltip(id, text);
    }

    pub fn set_hover_cursor(&mut self, cursor: Cursor) {
        let id = self.id;
        self.tree.set_hover_cursor(id, cursor);
    }

    pub fn bring_to_front(&mut self) -> Result<(), TreeError> {
        let id = self.id;
        match self.tree.parent(id) {
            Some(parent) => self.tree.child_to_front(parent, id),
            None => Ok(()),
        }
    }

    /// Create `widget`, place it at `rect` (relative to this node) and adopt
    /// it as the front-most child.
    pub fn add_child<W: Component + 'static>(
        &mut self,
        widget: W,
        rect: Rect,
    ) -> Result<ComponentId, TreeError> {
        let child = self.tree.create(widget);
        self.tree.set_rect(child, rect);
        let id = self.id;
        if let Err(err) = self.tree.insert_child(id, child) {
            self.tree.destroy(child);
            return Err(err);
        }
        Ok(child)
    }

    pub fn remove_self(&mut self) -> Result<(), TreeError> {
        let id = self.id;
        match self.tree.parent(id) {
            Some(parent) => self.tree.remove_child(parent, id),
            None => {
                self.tree.destroy(id);
                Ok(())
            }
        }
    }
}

impl Deref for Ctx<'_> {
    type Target = Tree;

    fn deref(&self) -> &Tree {
        self.tree
    }
}

impl DerefMut for Ctx<'_> {
    fn deref_mut(&mut self) -> &mut Tree {
        self.tree
    }
}
