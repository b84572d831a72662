use bitflags::bitflags;
use crossterm::event::MouseButton;

use super::{ComponentId, Widget};
use crate::event::Event;
use crate::geom::{Point, Rect, Size};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        const ENABLED = 1 << 0;
        const VISIBLE = 1 << 1;
        /// Hit-testable anywhere, even outside the node's rectangle.
        const STEALS_MOUSE = 1 << 2;
        const TO_FRONT_ON_HOVER = 1 << 3;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        NodeFlags::ENABLED | NodeFlags::VISIBLE
    }
}

/// Pointer shape a component asks for while hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cursor {
    #[default]
    Arrow,
    IBeam,
    Hand,
    Move,
    ResizeHorizontal,
    ResizeVertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZMove {
    Front,
    Back,
}

/// Button held down on a node, driving drag and click synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Press {
    pub button: MouseButton,
    pub origin: Point,
    /// Latest pointer position seen while the button is held.
    pub last: Point,
    pub dragging: bool,
}

pub(crate) struct Node {
    /// `None` while the widget is executing one of its own override points.
    pub widget: Option<Box<dyn Widget>>,
    pub name: &'static str,
    pub parent: Option<ComponentId>,
    /// Ownership (insertion) order; `None` marks an entry removed during an
    /// active traversal, erased once the traversal unwinds.
    pub children: Vec<Option<ComponentId>>,
    /// Back-to-front draw order; the last entry is front-most.
    pub z_order: Vec<Option<ComponentId>>,
    pub position: Point,
    pub absolute: Point,
    pub size: Size,
    /// Relative to the node's origin. `None` means the whole node.
    pub mouse_forward: Option<Rect>,
    /// Relative to the node's origin.
    pub child_clip: Option<Rect>,
    pub flags: NodeFlags,
    pub under_mouse: Option<ComponentId>,
    pub with_focus: Option<ComponentId>,
    pub with_capture: Option<ComponentId>,
    pub tooltip: Option<String>,
    pub cursor: Cursor,
    pub traversals: u32,
    pub pending_erase: bool,
    pub pending_z: Vec<(ComponentId, ZMove)>,
    pub press: Option<Press>,
    /// Only meaningful on roots: a renderer is attached to this subtree.
    pub renderer: bool,
    /// Notifications that arrived while the widget was busy.
    pub deferred: Vec<Event>,
}

impl Node {
    pub fn new(widget: Box<dyn Widget>, name: &'static str) -> Self {
        Self {
            widget: Some(widget),
            name,
            parent: None,
            children: Vec::new(),
            z_order: Vec::new(),
            position: Point::ZERO,
            absolute: Point::ZERO,
            size: Size::ZERO,
            mouse_forward: None,
            child_clip: None,
            flags: NodeFlags::default(),
            under_mouse: None,
            with_focus: None,
            with_capture: None,
            tooltip: None,
            cursor: Cursor::Arrow,
            traversals: 0,
            pending_erase: false,
            pending_z: Vec::new(),
            press: None,
            renderer: false,
            deferred: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.absolute, self.size)
    }

    /// Absolute region that accepts pointer hits.
    pub fn hit_rect(&self) -> Rect {
        match self.mouse_forward {
            Some(forward) => forward.offset(self.absolute),
            None => self.rect(),
        }
    }

    pub fn visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    pub fn enabled(&self) -> bool {
        self.flags.contains(NodeFlags::ENABLED)
    }

    pub fn live_children(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.children.iter().flatten().copied()
    }
}
