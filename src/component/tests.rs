use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyModifiers, MouseButton};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::Style;

use super::*;
use crate::error::TreeError;
use crate::event::{Event, KeyInput, MouseUpReason};
use crate::geom::{Point, Rect};

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
    consume_keys: bool,
    consume_mouse: bool,
}

impl Recorder {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            consume_keys: false,
            consume_mouse: false,
        }
    }

    fn consuming(mut self) -> Self {
        self.consume_keys = true;
        self.consume_mouse = true;
        self
    }

    fn push(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{what}", self.name));
    }
}

impl Component for Recorder {
    fn tick(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("tick");
    }
    fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        self.push("draw");
        let rect = ctx.rect();
        let symbol = &self.name[..1];
        frame.fill_rect(rect, Style::default());
        frame.line(rect.top_left(), rect.top_right(), symbol, Style::default());
    }
    fn focus_gain(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("focus+");
    }
    fn focus_lose(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("focus-");
    }
    fn mouse_enter(&mut self, _ctx: &mut Ctx<'_>, _pos: Point) {
        self.push("enter");
    }
    fn mouse_leave(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("leave");
    }
    fn mouse_down(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _button: MouseButton) -> bool {
        self.push("down");
        self.consume_mouse
    }
    fn mouse_up(
        &mut self,
        _ctx: &mut Ctx<'_>,
        _pos: Point,
        _button: MouseButton,
        reason: MouseUpReason,
    ) -> bool {
        match reason {
            MouseUpReason::Normal => self.push("up"),
            MouseUpReason::CaptureLost => self.push("lost"),
        }
        self.consume_mouse
    }
    fn key_press(&mut self, _ctx: &mut Ctx<'_>, _key: &KeyInput) -> bool {
        self.push("key");
        self.consume_keys
    }
    fn renderer_up(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("up!");
    }
    fn renderer_down(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("down!");
    }
    fn drag_begin(&mut self, _ctx: &mut Ctx<'_>, _origin: Point, _button: MouseButton) {
        self.push("drag-begin");
    }
    fn drag_end(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _button: MouseButton) {
        self.push("drag-end");
    }
    fn click(&mut self, _ctx: &mut Ctx<'_>, _pos: Point, _button: MouseButton) {
        self.push("click");
    }
}

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

fn add(tree: &mut Tree, parent: ComponentId, widget: impl Component + 'static, rect: Rect) -> ComponentId {
    let id = tree.create(widget);
    tree.set_rect(id, rect);
    tree.insert_child(parent, id).unwrap();
    id
}

fn down(x: i32, y: i32) -> Event {
    Event::MouseDown {
        pos: Point::new(x, y),
        button: MouseButton::Left,
    }
}

fn up(x: i32, y: i32) -> Event {
    Event::MouseUp {
        pos: Point::new(x, y),
        button: MouseButton::Left,
        reason: MouseUpReason::Normal,
    }
}

fn moved(x: i32, y: i32) -> Event {
    Event::MouseMove {
        pos: Point::new(x, y),
        delta: Point::ZERO,
    }
}

fn key() -> Event {
    Event::KeyPress(KeyInput::new(KeyCode::Char('k'), KeyModifiers::NONE))
}

/// Root 20x10 with two side-by-side children `a` (0..10) and `b` (10..20).
fn two_children(log: &Log) -> (Tree, ComponentId, ComponentId, ComponentId) {
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", log));
    tree.set_rect(root, Rect::new(0, 0, 20, 10));
    let a = add(&mut tree, root, Recorder::new("a", log), Rect::new(0, 0, 10, 10));
    let b = add(&mut tree, root, Recorder::new("b", log), Rect::new(10, 0, 10, 10));
    (tree, root, a, b)
}

#[test]
fn insert_and_remove_maintain_parent_links() {
    let log = log();
    let (mut tree, root, a, b) = two_children(&log);
    assert_eq!(tree.parent(a), Some(root));
    assert_eq!(tree.children(root), vec![a, b]);

    tree.remove_child(root, a).unwrap();
    assert!(!tree.contains(a));
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.children(root), vec![b]);
    assert_eq!(
        tree.remove_child(root, a),
        Err(TreeError::NotAChild { parent: root, child: a })
    );
}

#[test]
fn detached_child_survives_as_root() {
    let log = log();
    let (mut tree, root, a, _) = two_children(&log);
    let grandchild = add(&mut tree, a, Group, Rect::new(2, 2, 1, 1));
    tree.detach_child(root, a).unwrap();
    assert!(tree.contains(grandchild));
    assert_eq!(tree.parent(a), None);
    assert_eq!(tree.root_of(grandchild), a);
    assert_eq!(tree.absolute_position(grandchild), Some(Point::new(2, 2)));
}

#[test]
fn insert_rejects_reparenting_and_cycles() {
    let log = log();
    let (mut tree, root, a, b) = two_children(&log);
    assert_eq!(
        tree.insert_child(b, a),
        Err(TreeError::AlreadyParented { child: a })
    );
    assert_eq!(tree.insert_child(a, root), Err(TreeError::Cycle(root)));
    assert_eq!(tree.insert_child(a, a), Err(TreeError::AlreadyParented { child: a }));
}

#[test]
fn absolute_position_follows_parent_moves() {
    let mut tree = Tree::new();
    let root = tree.create(Group);
    let child = add(&mut tree, root, Group, Rect::new(3, 4, 2, 2));
    let leaf = add(&mut tree, child, Group, Rect::new(1, 1, 1, 1));
    tree.set_position(root, Point::new(10, 10));
    assert_eq!(tree.absolute_position(leaf), Some(Point::new(14, 15)));
    assert_eq!(tree.position(leaf), Some(Point::new(1, 1)));
}

#[test]
fn hit_test_prefers_front_most_child() {
    let log = log();
    let mut tree = Tree::new();
    let root = tree.create(Group);
    tree.set_rect(root, Rect::new(0, 0, 10, 10));
    let back = add(&mut tree, root, Recorder::new("back", &log), Rect::new(0, 0, 5, 5));
    let front = add(&mut tree, root, Recorder::new("front", &log), Rect::new(0, 0, 5, 5));
    assert_eq!(tree.hit_test(root, Point::new(1, 1)), Some(front));

    tree.child_to_front(root, back).unwrap();
    assert_eq!(tree.z_order(root), vec![front, back]);
    assert_eq!(tree.hit_test(root, Point::new(1, 1)), Some(back));
    assert_eq!(tree.hit_test(root, Point::new(7, 7)), None);

    tree.set_visible(back, false);
    assert_eq!(tree.hit_test(root, Point::new(1, 1)), Some(front));
}

#[test]
fn mouse_forward_and_steals_mouse_shape_hits() {
    let mut tree = Tree::new();
    let root = tree.create(Group);
    let strip = add(&mut tree, root, Group, Rect::new(0, 0, 10, 10));
    tree.set_mouse_forward_rect(strip, Some(Rect::new(0, 0, 10, 1)));
    assert_eq!(tree.hit_test(root, Point::new(3, 0)), Some(strip));
    assert_eq!(tree.hit_test(root, Point::new(3, 5)), None);

    let modal = add(&mut tree, root, Group, Rect::new(50, 50, 1, 1));
    tree.set_steals_mouse(modal, true);
    assert_eq!(tree.hit_test(root, Point::new(3, 5)), Some(modal));
}

#[test]
fn hover_transitions_send_leave_before_enter() {
    let log = log();
    let (mut tree, root, a, b) = two_children(&log);
    tree.handle_event(root, &moved(2, 2));
    assert_eq!(tree.under_mouse(root), Some(a));
    assert_eq!(take(&log), vec!["a:enter"]);

    tree.handle_event(root, &moved(12, 2));
    assert_eq!(tree.under_mouse(root), Some(b));
    assert_eq!(take(&log), vec!["a:leave", "b:enter"]);

    tree.handle_event(root, &Event::MouseLeave);
    assert_eq!(take(&log), vec!["b:leave", "root:leave"]);
    assert_eq!(tree.under_mouse(root), None);
}

#[test]
fn to_front_on_hover_raises_child() {
    let mut tree = Tree::new();
    let root = tree.create(Group);
    let a = add(&mut tree, root, Group, Rect::new(0, 0, 5, 5));
    let b = add(&mut tree, root, Group, Rect::new(3, 0, 5, 5));
    tree.set_to_front_on_hover(a, true);
    tree.handle_event(root, &moved(1, 1));
    assert_eq!(tree.z_order(root), vec![b, a]);
}

#[test]
fn press_focuses_and_captures_deepest_node() {
    let log = log();
    let (mut tree, root, a, b) = two_children(&log);
    tree.handle_event(root, &down(2, 2));
    assert_eq!(tree.focused_child(root), Some(a));
    assert!(tree.has_capture(a));
    assert_eq!(take(&log), vec!["a:enter", "a:focus+", "a:down", "root:down"]);

    // Captured: the pointer over `b` still routes to `a`.
    tree.handle_event(root, &moved(12, 2));
    assert_eq!(tree.under_mouse(root), Some(a));
    assert_eq!(take(&log), vec!["a:drag-begin"]);

    tree.handle_event(root, &up(12, 2));
    assert!(!tree.has_capture(a));
    assert!(!tree.has_capture(b));
    let events = take(&log);
    assert!(events.contains(&"a:drag-end".to_string()));
    assert!(!events.contains(&"a:click".to_string()));
}

#[test]
fn click_requires_release_inside() {
    let log = log();
    let (mut tree, root, _a, _b) = two_children(&log);
    tree.handle_event(root, &down(2, 2));
    take(&log);
    tree.handle_event(root, &up(3, 3));
    assert_eq!(take(&log), vec!["a:up", "a:click", "root:up"]);
}

#[test]
fn consumed_press_stops_bubbling() {
    let log = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &log));
    tree.set_rect(root, Rect::new(0, 0, 10, 10));
    add(&mut tree, root, Recorder::new("c", &log).consuming(), Rect::new(0, 0, 10, 10));
    assert!(tree.handle_event(root, &down(1, 1)));
    assert!(!take(&log).contains(&"root:down".to_string()));
}

#[test]
fn focus_moves_notify_each_node_once() {
    let log = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &log));
    let panel = add(&mut tree, root, Recorder::new("panel", &log), Rect::new(0, 0, 5, 5));
    let x = add(&mut tree, panel, Recorder::new("x", &log), Rect::new(0, 0, 1, 1));
    let y = add(&mut tree, panel, Recorder::new("y", &log), Rect::new(1, 0, 1, 1));

    tree.focus(x);
    assert_eq!(take(&log), vec!["panel:focus+", "x:focus+"]);
    assert!(tree.has_focus(x));

    tree.focus(y);
    assert_eq!(take(&log), vec!["x:focus-", "y:focus+"]);

    tree.focus(y);
    assert!(take(&log).is_empty());
    assert!(tree.is_focused_leaf(y));
    assert!(!tree.is_focused_leaf(panel));

    tree.focus(panel);
    assert_eq!(take(&log), vec!["y:focus-"]);
    assert_eq!(tree.focus_leaf(root), Some(panel));
}

#[test]
fn keyboard_bubbles_up_the_focus_chain() {
    let log = log();
    let mut tree = Tree::new();
    let root = tree.create(Recorder::new("root", &log).consuming());
    let leaf = add(&mut tree, root, Recorder::new("leaf", &log), Rect::new(0, 0, 1, 1));
    tree.focus(leaf);
    take(&log);
    assert!(tree.handle_event(root, &key()));
    assert_eq!(take(&log), vec!["leaf:key", "root:key"]);
}

#[test]
fn disabled_child_skips_input_but_still_ticks() {
    let log = log();
    let (mut tree, root, a, b) = two_children(&log);
    tree.focus(b);
    tree.set_enabled(b, false);
    assert_eq!(tree.z_order(root), vec![b, a]);
    assert_eq!(tree.focused_child(root), None);
    take(&log);

    tree.handle_event(root, &key());
    tree.handle_event(root, &Event::Tick);
    assert_eq!(take(&log), vec!["root:key", "root:tick", "a:tick", "b:tick"]);
}

#[test]
fn hiding_clears_interaction_pointers() {
    let log = log();
    let (mut tree, root, a, _) = two_children(&log);
    tree.handle_event(root, &down(2, 2));
    assert_eq!(tree.under_mouse(root), Some(a));
    tree.set_visible(a, false);
    assert_eq!(tree.under_mouse(root), None);
    assert_eq!(tree.focused_child(root), None);
    assert_eq!(tree.captured_child(root), None);
}

#[test]
fn hiding_mid_drag_ends_the_drag_without_a_click() {
    let log = log();
    let (mut tree, root, a, _) = two_children(&log);
    tree.handle_event(root, &down(2, 2));
    tree.handle_event(root, &moved(4, 2));
    assert_eq!(take(&log).last().map(String::as_str), Some("a:drag-begin"));

    tree.set_visible(a, false);
    assert_eq!(take(&log), vec!["a:lost", "a:drag-end", "a:focus-", "a:leave"]);
    assert!(!tree.has_capture(a));

    // The physical release that follows finds nothing to end.
    tree.handle_event(root, &up(4, 2));
    assert!(!take(&log).iter().any(|e| e.starts_with("a:")));
}

#[test]
fn disabling_a_pressed_child_releases_it() {
    let log = log();
    let (mut tree, root, a, _) = two_children(&log);
    tree.handle_event(root, &down(2, 2));
    take(&log);
    tree.set_enabled(a, false);
    assert_eq!(take(&log), vec!["a:lost", "a:focus-"]);
    assert_eq!(tree.captured_child(root), None);
}

#[test]
fn removing_focused_capturing_child_clears_chains() {
    let log = log();
    let mut tree = Tree::new();
    let root = tree.create(Group);
    tree.set_rect(root, Rect::new(0, 0, 10, 10));
    let panel = add(&mut tree, root, Group, Rect::new(0, 0, 10, 10));
    let leaf = add(&mut tree, panel, Recorder::new("leaf", &log), Rect::new(0, 0, 2, 2));
    tree.handle_event(root, &down(1, 1));
    assert!(tree.has_capture(leaf));
    take(&log);

    tree.remove_child(root, panel).unwrap();
    assert_eq!(take(&log), vec!["leaf:lost", "leaf:focus-", "leaf:leave"]);
    assert_eq!(tree.captured_child(root), None);
    assert_eq!(tree.focused_child(root), None);
    assert_eq!(tree.under_mouse(root), None);
}

struct Remover {
    log: Log,
    name: &'static str,
    target: Rc<RefCell<Option<ComponentId>>>,
}

impl Component for Remover {
    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        self.log.borrow_mut().push(format!("{}:tick", self.name));
        if let Some(target) = self.target.borrow_mut().take() {
            let parent = ctx.parent(ctx.id()).unwrap();
            ctx.remove_child(parent, target).unwrap();
        }
    }
}

#[test]
fn removal_during_traversal_neither_skips_nor_repeats() {
    let log = log();
    let target = Rc::new(RefCell::new(None));
    let mut tree = Tree::new();
    let root = tree.create(Group);
    add(
        &mut tree,
        root,
        Remover {
            log: log.clone(),
            name: "first",
            target: target.clone(),
        },
        Rect::default(),
    );
    let doomed = add(&mut tree, root, Recorder::new("doomed", &log), Rect::default());
    add(&mut tree, root, Recorder::new("third", &log), Rect::default());
    add(&mut tree, root, Recorder::new("fourth", &log), Rect::default());
    *target.borrow_mut() = Some(doomed);

    tree.handle_event(root, &Event::Tick);
    assert_eq!(take(&log), vec!["first:tick", "third:tick", "fourth:tick"]);
    assert_eq!(tree.children(root).len(), 3);

    tree.handle_event(root, &Event::Tick);
    assert_eq!(take(&log), vec!["first:tick", "third:tick", "fourth:tick"]);
}

struct SelfRemover;

impl Component for SelfRemover {
    fn tick(&mut self, ctx: &mut Ctx<'_>) {
        ctx.remove_self().unwrap();
        assert!(!ctx.alive());
    }
}

#[test]
fn node_may_remove_itself_from_its_handler() {
    let log = log();
    let mut tree = Tree::new();
    let root = tree.create(Group);
    let gone = add(&mut tree, root, SelfRemover, Rect::default());
    add(&mut tree, root, Recorder::new("after", &log), Rect::default());
    tree.handle_event(root, &Event::Tick);
    assert!(!tree.contains(gone));
    assert_eq!(take(&log), vec!["after:tick"]);
}

struct Grower;

impl Component for Grower {
    fn mouse_enter(&mut self, ctx: &mut Ctx<'_>, _pos: Point) {
        let _ = ctx.add_child(Group, Rect::new(0, 0, 1, 1));
    }
}

#[test]
#[should_panic(expected = "is not allowed in this dispatch context")]
fn structural_change_during_enter_panics() {
    let mut tree = Tree::new();
    let root = tree.create(Group);
    tree.set_rect(root, Rect::new(0, 0, 5, 5));
    add(&mut tree, root, Grower, Rect::new(0, 0, 5, 5));
    tree.handle_event(root, &moved(1, 1));
}

#[test]
fn forbid_guard_lifts_on_drop() {
    let mut tree = Tree::new();
    {
        let guard = tree.forbid(Forbid::INSERT);
        assert!(guard.forbidden().contains(Forbid::INSERT));
    }
    assert!(tree.forbidden().is_empty());
}

#[test]
fn renderer_up_is_preorder_and_down_postorder() {
    let log = log();
    let (mut tree, root, _a, _b) = two_children(&log);
    tree.attach_renderer(root);
    assert_eq!(take(&log), vec!["root:up!", "a:up!", "b:up!"]);

    let late = add(&mut tree, root, Recorder::new("late", &log), Rect::default());
    assert_eq!(take(&log), vec!["late:up!"]);
    tree.remove_child(root, late).unwrap();
    assert_eq!(take(&log), vec!["late:down!"]);

    tree.detach_renderer(root);
    assert_eq!(take(&log), vec!["a:down!", "b:down!", "root:down!"]);
}

#[test]
fn draw_paints_back_to_front_within_child_clip() {
    let log = log();
    let mut tree = Tree::new();
    let root = tree.create(Group);
    tree.set_rect(root, Rect::new(0, 0, 6, 2));
    add(&mut tree, root, Recorder::new("back", &log), Rect::new(0, 0, 6, 1));
    add(&mut tree, root, Recorder::new("front", &log), Rect::new(2, 0, 6, 1));
    tree.set_child_clip(root, Some(Rect::new(0, 0, 4, 2)));

    let area = CellRect::new(0, 0, 6, 2);
    let mut buffer = Buffer::empty(area);
    let mut frame = UiFrame::from_parts(area, &mut buffer);
    tree.draw(root, &mut frame);
    assert_eq!(take(&log), vec!["back:draw", "front:draw"]);
    assert_eq!(buffer.cell((0, 0)).unwrap().symbol(), "b");
    assert_eq!(buffer.cell((3, 0)).unwrap().symbol(), "f");
    assert_eq!(buffer.cell((5, 0)).unwrap().symbol(), " ");
}
