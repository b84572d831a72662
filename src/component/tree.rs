use std::mem;

use slotmap::SlotMap;

use super::guard::Forbid;
use super::node::{Node, Press, ZMove};
use super::{Component, ComponentId, Ctx, Cursor, NodeFlags, Widget};
use crate::error::TreeError;
use crate::event::{Event, MouseUpReason};
use crate::geom::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    Ownership,
    Z,
}

/// Arena of component nodes.
///
/// Every structural operation goes through the tree so that parent links,
/// absolute positions and the hover/focus/capture pointers stay consistent.
#[derive(Default)]
pub struct Tree {
    pub(super) nodes: SlotMap<ComponentId, Node>,
    pub(super) forbidden: Vec<Forbid>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create<W: Component + 'static>(&mut self, widget: W) -> ComponentId {
        self.create_boxed(Box::new(widget), std::any::type_name::<W>())
    }

    pub fn create_boxed(&mut self, widget: Box<dyn Widget>, name: &'static str) -> ComponentId {
        let id = self.nodes.insert(Node::new(widget, name));
        tracing::trace!(component = ?id, name, "created component");
        id
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Type name of the component stored at `id`.
    pub fn name(&self, id: ComponentId) -> Option<&'static str> {
        self.nodes.get(id).map(|n| n.name)
    }

    pub fn widget<T: 'static>(&self, id: ComponentId) -> Option<&T> {
        self.nodes
            .get(id)?
            .widget
            .as_ref()?
            .as_any()
            .downcast_ref::<T>()
    }

    pub fn widget_mut<T: 'static>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.nodes
            .get_mut(id)?
            .widget
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes.get(id)?.parent
    }

    pub fn root_of(&self, id: ComponentId) -> ComponentId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// `id` followed by each of its ancestors, ending at the root.
    pub fn path_to_root(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut path = Vec::new();
        if !self.contains(id) {
            return path;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            path.push(node);
            current = self.parent(node);
        }
        path
    }

    pub fn is_ancestor(&self, ancestor: ComponentId, of: ComponentId) -> bool {
        let mut current = self.parent(of);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Live children in ownership (insertion) order.
    pub fn children(&self, id: ComponentId) -> Vec<ComponentId> {
        self.nodes
            .get(id)
            .map(|n| n.live_children().collect())
            .unwrap_or_default()
    }

    /// Live children back to front.
    pub fn z_order(&self, id: ComponentId) -> Vec<ComponentId> {
        self.nodes
            .get(id)
            .map(|n| n.z_order.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    // Geometry

    pub fn rect(&self, id: ComponentId) -> Option<Rect> {
        self.nodes.get(id).map(Node::rect)
    }

    /// Position relative to the parent.
    pub fn position(&self, id: ComponentId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.position)
    }

    pub fn absolute_position(&self, id: ComponentId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.absolute)
    }

    pub fn size(&self, id: ComponentId) -> Option<Size> {
        self.nodes.get(id).map(|n| n.size)
    }

    pub fn set_position(&mut self, id: ComponentId, position: Point) {
        self.check_allowed(Forbid::GEOMETRY, "set_position");
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.position = position;
        self.update_absolute(id);
    }

    pub fn set_size(&mut self, id: ComponentId, size: Size) {
        self.check_allowed(Forbid::GEOMETRY, "set_size");
        if let Some(node) = self.nodes.get_mut(id) {
            node.size = Size::new(size.width, size.height);
        }
    }

    /// Position (relative to the parent) and size in one call.
    pub fn set_rect(&mut self, id: ComponentId, rect: Rect) {
        self.set_size(id, rect.size);
        self.set_position(id, rect.pos);
    }

    /// Restrict pointer hits to `rect` (relative to the node), or the whole
    /// node with `None`.
    pub fn set_mouse_forward_rect(&mut self, id: ComponentId, rect: Option<Rect>) {
        self.check_allowed(Forbid::GEOMETRY, "set_mouse_forward_rect");
        if let Some(node) = self.nodes.get_mut(id) {
            node.mouse_forward = rect;
        }
    }

    /// Clip children to `rect` (relative to the node) while drawing and
    /// hit-testing.
    pub fn set_child_clip(&mut self, id: ComponentId, rect: Option<Rect>) {
        self.check_allowed(Forbid::GEOMETRY, "set_child_clip");
        if let Some(node) = self.nodes.get_mut(id) {
            node.child_clip = rect;
        }
    }

    pub(crate) fn child_clip_abs(&self, id: ComponentId) -> Option<Rect> {
        let node = self.nodes.get(id)?;
        node.child_clip.map(|clip| clip.offset(node.absolute))
    }

    fn update_absolute(&mut self, id: ComponentId) {
        let base = self
            .parent(id)
            .and_then(|p| self.nodes.get(p))
            .map(|p| p.absolute)
            .unwrap_or(Point::ZERO);
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.absolute = base + node.position;
        let children: Vec<ComponentId> = node.live_children().collect();
        for child in children {
            self.update_absolute(child);
        }
    }

    // Flags

    pub fn flags(&self, id: ComponentId) -> NodeFlags {
        self.nodes
            .get(id)
            .map(|n| n.flags)
            .unwrap_or_else(NodeFlags::empty)
    }

    pub fn is_enabled(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(Node::enabled)
    }

    pub fn is_visible(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(Node::visible)
    }

    /// Disabled nodes still tick and draw but receive no input. Disabling a
    /// node sends it to the back of its parent's z-order and releases any
    /// focus or capture it holds.
    pub fn set_enabled(&mut self, id: ComponentId, enabled: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.enabled() == enabled {
            return;
        }
        node.flags.set(NodeFlags::ENABLED, enabled);
        if enabled {
            return;
        }
        if let Some(parent) = node.parent {
            let _ = self.child_to_back(parent, id);
            self.release_capture(parent, id);
            self.release_focus(parent, id);
        }
    }

    /// Hiding a node clears every interaction pointer its parent holds to it.
    pub fn set_visible(&mut self, id: ComponentId, visible: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.visible() == visible {
            return;
        }
        node.flags.set(NodeFlags::VISIBLE, visible);
        if visible {
            return;
        }
        if let Some(parent) = node.parent {
            self.release_capture(parent, id);
            self.release_focus(parent, id);
            self.release_hover(parent, id);
        }
    }

    pub fn set_steals_mouse(&mut self, id: ComponentId, steals: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.set(NodeFlags::STEALS_MOUSE, steals);
        }
    }

    pub fn set_to_front_on_hover(&mut self, id: ComponentId, on: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.set(NodeFlags::TO_FRONT_ON_HOVER, on);
        }
    }

    pub fn tooltip(&self, id: ComponentId) -> Option<&str> {
        self.nodes.get(id)?.tooltip.as_deref()
    }

    pub fn set_tooltip(&mut self, id: ComponentId, text: Option<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.tooltip = text.filter(|t| !t.is_empty());
        }
    }

    pub fn cursor(&self, id: ComponentId) -> Cursor {
        self.nodes.get(id).map(|n| n.cursor).unwrap_or_default()
    }

    pub fn set_hover_cursor(&mut self, id: ComponentId, cursor: Cursor) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.cursor = cursor;
        }
    }

    // Structure

    /// Adopt the parentless `child` as the front-most child of `parent`.
    pub fn insert_child(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), TreeError> {
        self.check_allowed(Forbid::INSERT, "insert_child");
        if !self.contains(parent) {
            return Err(TreeError::Unknown(parent));
        }
        let Some(node) = self.nodes.get(child) else {
            return Err(TreeError::Unknown(child));
        };
        if node.parent.is_some() {
            return Err(TreeError::AlreadyParented { child });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::Cycle(child));
        }
        let child_had_renderer = node.renderer;

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.renderer = false;
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(Some(child));
            node.z_order.push(Some(child));
        }
        self.update_absolute(child);
        tracing::trace!(parent = ?parent, child = ?child, "inserted child");

        let attached = self.renderer_attached(parent);
        if attached && !child_had_renderer {
            let mut guard = self.forbid(Forbid::STRUCTURE);
            guard.deliver_renderer_up(child);
        } else if !attached && child_had_renderer {
            let mut guard = self.forbid(Forbid::STRUCTURE);
            guard.deliver_renderer_down(child);
        }
        Ok(())
    }

    /// Detach `child` from `parent` and destroy its whole subtree.
    pub fn remove_child(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), TreeError> {
        self.detach_child(parent, child)?;
        self.erase_subtree(child);
        Ok(())
    }

    /// Detach `child` from `parent`, leaving it alive as a parentless root.
    pub fn detach_child(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), TreeError> {
        self.check_allowed(Forbid::REMOVE, "remove_child");
        if !self.contains(parent) {
            return Err(TreeError::Unknown(parent));
        }
        if self.parent(child) != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }

        if self.renderer_attached(parent) {
            let mut guard = self.forbid(Forbid::STRUCTURE);
            guard.deliver_renderer_down(child);
        }
        self.release_capture(parent, child);
        self.release_focus(parent, child);
        self.release_hover(parent, child);
        // Handlers above may already have taken the child out.
        if self.parent(child) != Some(parent) {
            return Ok(());
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        self.clear_capture_chain(child);
        self.unlink(parent, child);
        self.update_absolute(child);
        tracing::trace!(parent = ?parent, child = ?child, "removed child");
        Ok(())
    }

    /// Destroy `id` and its subtree, detaching it from its parent first.
    pub fn destroy(&mut self, id: ComponentId) {
        if let Some(parent) = self.parent(id) {
            let _ = self.remove_child(parent, id);
            return;
        }
        self.check_allowed(Forbid::REMOVE, "destroy");
        if self.nodes.get(id).is_some_and(|n| n.renderer) {
            let mut guard = self.forbid(Forbid::STRUCTURE);
            guard.deliver_renderer_down(id);
        }
        self.erase_subtree(id);
    }

    fn erase_subtree(&mut self, id: ComponentId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let children: Vec<ComponentId> = node.live_children().collect();
        for child in children {
            self.erase_subtree(child);
        }
        if let Some(node) = self.nodes.remove(id) {
            tracing::trace!(component = ?id, name = node.name, "destroyed component");
        }
    }

    fn unlink(&mut self, parent: ComponentId, child: ComponentId) {
        let Some(node) = self.nodes.get_mut(parent) else {
            return;
        };
        if node.traversals > 0 {
            for slot in node.children.iter_mut().chain(node.z_order.iter_mut()) {
                if *slot == Some(child) {
                    *slot = None;
                }
            }
            node.pending_erase = true;
        } else {
            node.children.retain(|slot| *slot != Some(child));
            node.z_order.retain(|slot| *slot != Some(child));
        }
    }

    // Z-order

    pub fn child_to_front(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), TreeError> {
        self.move_in_z(parent, child, ZMove::Front)
    }

    pub fn child_to_back(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), TreeError> {
        self.move_in_z(parent, child, ZMove::Back)
    }

    fn move_in_z(&mut self, parent: ComponentId, child: ComponentId, to: ZMove) -> Result<(), TreeError> {
        self.check_allowed(Forbid::ZORDER, "z-order change");
        if !self.contains(parent) {
            return Err(TreeError::Unknown(parent));
        }
        if self.parent(child) != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        let Some(node) = self.nodes.get_mut(parent) else {
            return Err(TreeError::Unknown(parent));
        };
        if node.traversals > 0 {
            node.pending_z.push((child, to));
        } else {
            apply_z(&mut node.z_order, child, to);
        }
        Ok(())
    }

    // Traversal

    /// Visit the children of `id` that existed when the visit started.
    ///
    /// Children removed by `f` are skipped from then on; children added by
    /// `f` are not visited; z-order changes are applied once the outermost
    /// traversal of `id` unwinds.
    pub(crate) fn for_each_child(
        &mut self,
        id: ComponentId,
        order: Order,
        mut f: impl FnMut(&mut Tree, ComponentId),
    ) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let len = match order {
            Order::Ownership => node.children.len(),
            Order::Z => node.z_order.len(),
        };
        node.traversals += 1;
        for index in 0..len {
            let Some(node) = self.nodes.get(id) else {
                return;
            };
            let list = match order {
                Order::Ownership => &node.children,
                Order::Z => &node.z_order,
            };
            if let Some(Some(child)) = list.get(index).copied() {
                f(self, child);
            }
        }
        self.end_traversal(id);
    }

    fn end_traversal(&mut self, id: ComponentId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.traversals = node.traversals.saturating_sub(1);
        if node.traversals > 0 {
            return;
        }
        if mem::take(&mut node.pending_erase) {
            node.children.retain(Option::is_some);
            node.z_order.retain(Option::is_some);
        }
        for (child, to) in mem::take(&mut node.pending_z) {
            apply_z(&mut node.z_order, child, to);
        }
    }

    /// Run `f` against the widget at `id` with a context for that node.
    ///
    /// Returns `None` when the node is gone or its widget is already on the
    /// call stack.
    pub(crate) fn call<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn Widget, &mut Ctx<'_>) -> R,
    ) -> Option<R> {
        let mut widget = self.nodes.get_mut(id)?.widget.take()?;
        let result = {
            let mut ctx = Ctx::new(self, id);
            f(&mut *widget, &mut ctx)
        };
        let Some(node) = self.nodes.get_mut(id) else {
            return Some(result);
        };
        node.widget = Some(widget);
        let deferred = mem::take(&mut node.deferred);
        for event in deferred {
            self.notify(id, &event);
        }
        Some(result)
    }

    /// Deliver a lifecycle notification to the node itself only. Busy widgets
    /// receive it as soon as their current call returns.
    pub(crate) fn notify(&mut self, id: ComponentId, event: &Event) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.widget.is_none() {
            node.deferred.push(event.clone());
            return;
        }
        self.call(id, |widget, ctx| match event {
            Event::Tick => widget.tick(ctx),
            Event::Quit => widget.quit(ctx),
            Event::FocusGain => widget.focus_gain(ctx),
            Event::FocusLose => widget.focus_lose(ctx),
            Event::MouseEnter { pos } => widget.mouse_enter(ctx, *pos),
            Event::MouseLeave => widget.mouse_leave(ctx),
            Event::RendererUp => widget.renderer_up(ctx),
            Event::RendererDown => widget.renderer_down(ctx),
            _ => {}
        });
    }

    // Renderer lifecycle

    pub fn renderer_attached(&self, id: ComponentId) -> bool {
        let root = self.root_of(id);
        self.nodes.get(root).is_some_and(|n| n.renderer)
    }

    /// Mark the root `root` as backed by a renderer and deliver RendererUp to
    /// its subtree, parents before children.
    pub fn attach_renderer(&mut self, root: ComponentId) {
        let Some(node) = self.nodes.get_mut(root) else {
            return;
        };
        if node.parent.is_some() || node.renderer {
            return;
        }
        node.renderer = true;
        let mut guard = self.forbid(Forbid::STRUCTURE);
        guard.deliver_renderer_up(root);
    }

    /// Deliver RendererDown to the subtree of `root`, children before
    /// parents, and clear its renderer flag.
    pub fn detach_renderer(&mut self, root: ComponentId) {
        let Some(node) = self.nodes.get(root) else {
            return;
        };
        if node.parent.is_some() || !node.renderer {
            return;
        }
        {
            let mut guard = self.forbid(Forbid::STRUCTURE);
            guard.deliver_renderer_down(root);
        }
        if let Some(node) = self.nodes.get_mut(root) {
            node.renderer = false;
        }
    }

    pub(crate) fn deliver_renderer_up(&mut self, id: ComponentId) {
        self.notify(id, &Event::RendererUp);
        self.for_each_child(id, Order::Ownership, |tree, child| {
            tree.deliver_renderer_up(child)
        });
    }

    pub(crate) fn deliver_renderer_down(&mut self, id: ComponentId) {
        self.for_each_child(id, Order::Ownership, |tree, child| {
            tree.deliver_renderer_down(child)
        });
        self.notify(id, &Event::RendererDown);
    }

    // Interaction pointers

    pub fn under_mouse(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes.get(id)?.under_mouse
    }

    pub fn focused_child(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes.get(id)?.with_focus
    }

    pub fn captured_child(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes.get(id)?.with_capture
    }

    fn chain_holds(&self, id: ComponentId, link: impl Fn(&Node) -> Option<ComponentId>) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            match self.nodes.get(parent) {
                Some(node) if link(node) == Some(current) => current = parent,
                _ => return false,
            }
        }
        true
    }

    /// True when every ancestor's focus pointer leads down to `id`. Roots
    /// count as focused; the window stack tracks OS-level focus separately.
    pub fn has_focus(&self, id: ComponentId) -> bool {
        self.chain_holds(id, |n| n.with_focus)
    }

    pub fn has_hover(&self, id: ComponentId) -> bool {
        self.chain_holds(id, |n| n.under_mouse)
    }

    /// True when `id` is a non-root node on its root's capture chain.
    pub fn has_capture(&self, id: ComponentId) -> bool {
        self.parent(id).is_some() && self.chain_holds(id, |n| n.with_capture)
    }

    fn follow(&self, from: ComponentId, link: impl Fn(&Node) -> Option<ComponentId>) -> Vec<ComponentId> {
        let mut chain = Vec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            let Some(node) = self.nodes.get(id) else {
                break;
            };
            chain.push(id);
            current = link(node);
        }
        chain
    }

    /// `from` followed by its focused descendants, top down.
    pub fn focus_chain(&self, from: ComponentId) -> Vec<ComponentId> {
        self.follow(from, |n| n.with_focus)
    }

    pub fn hover_chain(&self, from: ComponentId) -> Vec<ComponentId> {
        self.follow(from, |n| n.under_mouse)
    }

    pub fn capture_chain(&self, from: ComponentId) -> Vec<ComponentId> {
        self.follow(from, |n| n.with_capture)
    }

    pub fn focus_leaf(&self, root: ComponentId) -> Option<ComponentId> {
        self.focus_chain(root).last().copied()
    }

    pub fn hover_leaf(&self, root: ComponentId) -> Option<ComponentId> {
        self.hover_chain(root).last().copied()
    }

    /// Focused and with no focused child of its own.
    pub fn is_focused_leaf(&self, id: ComponentId) -> bool {
        self.has_focus(id) && self.focused_child(id).is_none()
    }

    /// Make `id` the focused leaf of its root.
    ///
    /// Nodes leaving the active chain receive FocusLose (top down), then
    /// nodes joining it receive FocusGain (top down). `id`'s own focused
    /// sub-chain is released.
    pub fn focus(&mut self, id: ComponentId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.visible() || !node.enabled() {
            return;
        }
        let path = self.path_to_root(id);
        let Some(&root) = path.last() else {
            return;
        };
        let old_chain = self.focus_chain(root);
        let new_chain: Vec<ComponentId> = path.iter().rev().copied().collect();

        for pair in path.windows(2) {
            if let Some(node) = self.nodes.get_mut(pair[1]) {
                node.with_focus = Some(pair[0]);
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.with_focus = None;
        }

        let lost: Vec<ComponentId> = old_chain
            .iter()
            .copied()
            .filter(|n| !new_chain.contains(n))
            .collect();
        let gained: Vec<ComponentId> = new_chain
            .iter()
            .copied()
            .filter(|n| !old_chain.contains(n))
            .collect();
        if lost.is_empty() && gained.is_empty() {
            return;
        }
        tracing::debug!(component = ?id, lost = lost.len(), gained = gained.len(), "focus moved");
        for node in lost {
            self.notify(node, &Event::FocusLose);
        }
        for node in gained {
            self.notify(node, &Event::FocusGain);
        }
    }

    /// Drop focus from `id` (and its sub-chain), leaving its parent as the
    /// focused leaf.
    pub fn blur(&mut self, id: ComponentId) {
        if let Some(parent) = self.parent(id) {
            self.release_focus(parent, id);
        }
    }

    fn release_focus(&mut self, parent: ComponentId, child: ComponentId) {
        if self.focused_child(parent) != Some(child) {
            return;
        }
        let lost = if self.has_focus(child) {
            self.focus_chain(child)
        } else {
            Vec::new()
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.with_focus = None;
        }
        for node in lost {
            self.notify(node, &Event::FocusLose);
        }
    }

    fn release_hover(&mut self, parent: ComponentId, child: ComponentId) {
        if self.under_mouse(parent) != Some(child) {
            return;
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.under_mouse = None;
        }
        let mut guard = self.forbid(Forbid::STRUCTURE);
        guard.on_mouse_leave(child);
    }

    fn release_capture(&mut self, parent: ComponentId, child: ComponentId) {
        if self.captured_child(parent) != Some(child) {
            return;
        }
        let root = self.root_of(parent);
        self.clear_capture_chain(root);
        // Nodes below `child` may hold their own chain if `parent` was not
        // on the root's chain.
        if let Some(node) = self.nodes.get_mut(parent) {
            node.with_capture = None;
        }
        self.clear_capture_chain(child);
    }

    /// Clear capture pointers and held presses along the chain from `from`.
    fn clear_capture_chain(&mut self, from: ComponentId) {
        let mut lost = Vec::new();
        for id in self.capture_chain(from) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.with_capture = None;
                if let Some(press) = node.press.take() {
                    lost.push((id, press));
                }
            }
        }
        for (id, press) in lost {
            self.lose_press(id, press);
        }
    }

    /// The held button on `id` will not come up normally: deliver a
    /// `CaptureLost` release, then `drag_end` if a drag had begun. No click.
    fn lose_press(&mut self, id: ComponentId, press: Press) {
        tracing::trace!(component = ?id, button = ?press.button, "mouse capture lost");
        let pos = press.last;
        self.call(id, |w, ctx| {
            w.mouse_up(ctx, pos, press.button, MouseUpReason::CaptureLost)
        });
        if press.dragging {
            self.call(id, |w, ctx| w.drag_end(ctx, pos, press.button));
        }
    }

    /// End every capture held in the window of `id`; the pressed node sees
    /// its button released with [`MouseUpReason::CaptureLost`].
    pub fn cancel_capture(&mut self, id: ComponentId) {
        if !self.contains(id) {
            return;
        }
        let root = self.root_of(id);
        self.clear_capture_chain(root);
    }

    /// Route every pointer event of `id`'s root to `id` (on) or end its
    /// capture (off).
    pub fn capture_mouse(&mut self, id: ComponentId, on: bool) {
        if !self.contains(id) {
            return;
        }
        let root = self.root_of(id);
        if on {
            let mut lost = Vec::new();
            for other in self.capture_chain(root) {
                if other == id {
                    continue;
                }
                if let Some(node) = self.nodes.get_mut(other) {
                    node.with_capture = None;
                    if let Some(press) = node.press.take() {
                        lost.push((other, press));
                    }
                }
            }
            for (other, press) in lost {
                self.lose_press(other, press);
            }
            let path = self.path_to_root(id);
            for pair in path.windows(2) {
                if let Some(node) = self.nodes.get_mut(pair[1]) {
                    node.with_capture = Some(pair[0]);
                }
            }
            if let Some(node) = self.nodes.get_mut(id) {
                node.with_capture = None;
            }
        } else if self.has_capture(id) {
            for node_id in self.path_to_root(id) {
                if let Some(node) = self.nodes.get_mut(node_id) {
                    node.with_capture = None;
                }
            }
        }
    }

    pub(crate) fn press(&self, id: ComponentId) -> Option<Press> {
        self.nodes.get(id)?.press
    }

    pub(crate) fn set_press(&mut self, id: ComponentId, press: Option<Press>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.press = press;
        }
    }

    pub(crate) fn set_under_mouse(&mut self, id: ComponentId, under: Option<ComponentId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.under_mouse = under;
        }
    }

    pub(crate) fn hit_rect(&self, id: ComponentId) -> Option<Rect> {
        self.nodes.get(id).map(Node::hit_rect)
    }
}

fn apply_z(z_order: &mut Vec<Option<ComponentId>>, child: ComponentId, to: ZMove) {
    let Some(index) = z_order.iter().position(|slot| *slot == Some(child)) else {
        return;
    };
    let entry = z_order.remove(index);
    match to {
        ZMove::Front => z_order.push(entry),
        ZMove::Back => z_order.insert(0, entry),
    }
}
