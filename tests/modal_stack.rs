use std::cell::RefCell;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Style};

use crossterm::event::MouseButton;

use term_modal::EngineConfig;
use term_modal::component::{Component, ComponentId, Ctx};
use term_modal::event::{Event, MouseUpReason};
use term_modal::geom::{Point, Rect};
use term_modal::state::GainState;
use term_modal::ui::{self, UiFrame};
use term_modal::window::{ModalOptions, WindowStack};

type Log = Rc<RefCell<Vec<String>>>;

/// Records lifecycle notifications and paints its name.
struct Recorder {
    name: &'static str,
    log: Log,
}

impl Recorder {
    fn push(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{what}", self.name));
    }
}

impl Component for Recorder {
    fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        let rect = ctx.rect();
        frame.fill_rect(rect, Style::default().fg(Color::Rgb(200, 200, 200)).bg(Color::Rgb(0, 0, 120)));
        frame.text_run(rect.pos, self.name, Style::default());
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

    fn renderer_up(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("up");
    }

    fn renderer_down(&mut self, _ctx: &mut Ctx<'_>) {
        self.push("down");
    }
}

/// Consumes presses and records how each one ended.
struct Grip {
    name: &'static str,
    log: Log,
}

impl Grip {
    fn push(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}:{what}", self.name));
    }
}

impl Component for Grip {
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
        true
    }

    fn mouse_up(
        &mut self,
        _ctx: &mut Ctx<'_>,
        _pos: Point,
        _button: MouseButton,
        reason: MouseUpReason,
    ) -> bool {
        match reason {
            MouseUpReason::Normal => self.push("release"),
            MouseUpReason::CaptureLost => self.push("lost"),
        }
        true
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

/// Destroys its first child when the pointer leaves it.
struct Unruly;

impl Component for Unruly {
    fn mouse_leave(&mut self, ctx: &mut Ctx<'_>) {
        let id = ctx.id();
        if let Some(&child) = ctx.children(id).first() {
            ctx.destroy(child);
        }
    }
}

fn moved(x: i32, y: i32) -> Event {
    Event::MouseMove {
        pos: Point::new(x, y),
        delta: Point::ZERO,
    }
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

fn grip(stack: &mut WindowStack, log: &Log, parent: ComponentId, rect: Rect) -> ComponentId {
    let tree = stack.tree_mut();
    let id = tree.create(Grip {
        name: "C",
        log: log.clone(),
    });
    tree.set_rect(id, rect);
    tree.insert_child(parent, id).unwrap();
    id
}

fn window(stack: &mut WindowStack, log: &Log, name: &'static str, rect: Rect) -> ComponentId {
    stack.create_window(
        Recorder {
            name,
            log: log.clone(),
        },
        rect,
    )
}

/// Entries of `log` belonging to the windows, not their children.
fn drain(log: &Log, names: &[&str]) -> Vec<String> {
    log.borrow_mut()
        .drain(..)
        .filter(|line| names.iter().any(|n| line.starts_with(&format!("{n}:"))))
        .collect()
}

fn row(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect()
}

fn render(stack: &mut WindowStack, area: CellRect) -> Buffer {
    let mut buffer = ui::offscreen(area);
    {
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        stack.draw(&mut frame);
    }
    buffer
}

#[test]
fn push_then_pop_restores_the_previous_top_exactly() {
    let log: Log = Rc::default();
    let mut stack = WindowStack::new(EngineConfig::default());
    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 20, 6));
    stack.push(a, ModalOptions::default()).unwrap();
    stack.dispatch(&Event::MouseMove {
        pos: Point::new(3, 2),
        delta: Point::ZERO,
    });
    let before = (
        stack.delivered(a),
        stack.tree().has_focus(a),
        stack.tree().has_hover(a),
    );
    assert_eq!(before.0, Some(GainState::new(true, true)));
    log.borrow_mut().clear();

    let b = window(&mut stack, &log, "B", Rect::new(2, 1, 10, 3));
    stack.push(b, ModalOptions::with_backdrop()).unwrap();
    stack.pop(b).unwrap();

    assert_eq!(
        drain(&log, &["A", "B"]),
        vec![
            "A:focus-", "A:leave", "B:enter", "B:focus+", "B:focus-", "B:leave", "A:enter",
            "A:focus+",
        ]
    );
    let after = (
        stack.delivered(a),
        stack.tree().has_focus(a),
        stack.tree().has_hover(a),
    );
    assert_eq!(before, after);
}

#[test]
fn backdrop_is_the_window_below_without_its_tooltip() {
    let log: Log = Rc::default();
    let config = EngineConfig {
        tooltip_delay_ticks: 1,
        darken_ticks: 4,
        ..EngineConfig::default()
    };
    let area = CellRect::new(0, 0, 20, 6);
    let mut stack = WindowStack::new(config);
    stack.set_truecolor(true);

    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 20, 6));
    let tip = stack.tree_mut().create(Recorder {
        name: "t",
        log: log.clone(),
    });
    stack.tree_mut().set_rect(tip, Rect::new(1, 1, 4, 1));
    stack.tree_mut().insert_child(a, tip).unwrap();
    stack.tree_mut().set_tooltip(tip, Some("hint".into()));
    stack.push(a, ModalOptions::default()).unwrap();
    stack.attach_renderer(area);

    stack.dispatch(&Event::MouseMove {
        pos: Point::new(2, 1),
        delta: Point::ZERO,
    });
    for _ in 0..3 {
        stack.tick();
    }
    let live = render(&mut stack, area);
    assert!((0..6).any(|y| row(&live, y).contains("hint")));
    log.borrow_mut().clear();

    let b = window(&mut stack, &log, "B", Rect::new(8, 3, 10, 3));
    stack.push(b, ModalOptions::with_backdrop()).unwrap();
    let backdrop = stack.backdrop(b).expect("snapshot taken");
    assert_eq!(backdrop.area, area);
    assert!((0..6).all(|y| !row(backdrop, y).contains("hint")));
    assert_eq!(&row(backdrop, 0)[..1], "A");
    assert_eq!(&row(backdrop, 1)[1..2], "t");

    let mut alphas = Vec::new();
    for _ in 0..8 {
        alphas.push(stack.darken_alpha(b).unwrap());
        stack.tick();
    }
    assert!(alphas.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(alphas[0], 0.0);
    assert_eq!(alphas[4], alphas[7]);

    stack.pop(b).unwrap();
    let events = drain(&log, &["A", "B"]);
    assert!(events.contains(&"B:up".to_string()));
    assert!(events.contains(&"B:down".to_string()));
    assert!(!events.contains(&"A:up".to_string()));
    assert_eq!(events[events.len() - 2..], ["A:enter", "A:focus+"]);
}

#[test]
fn top_window_is_drawn_over_its_darkened_backdrop() {
    let log: Log = Rc::default();
    let config = EngineConfig {
        darken_ticks: 2,
        darken_target: 0.5,
        ..EngineConfig::default()
    };
    let area = CellRect::new(0, 0, 12, 4);
    let mut stack = WindowStack::new(config);
    stack.set_truecolor(true);
    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 12, 4));
    stack.push(a, ModalOptions::default()).unwrap();
    stack.attach_renderer(area);
    let b = window(&mut stack, &log, "B", Rect::new(6, 1, 4, 2));
    stack.push(b, ModalOptions::with_backdrop()).unwrap();
    for _ in 0..3 {
        stack.tick();
    }
    let frame = render(&mut stack, area);
    let dimmed = &frame[(1, 1)];
    assert_eq!(dimmed.bg, Color::Rgb(0, 0, 60));
    assert_eq!(dimmed.fg, Color::Rgb(100, 100, 100));
    assert_eq!(frame[(6, 1)].symbol(), "B");
    assert_eq!(frame[(7, 1)].bg, Color::Rgb(0, 0, 120));
}

#[test]
fn windows_without_backdrop_hide_the_stack_below() {
    let log: Log = Rc::default();
    let area = CellRect::new(0, 0, 8, 2);
    let mut stack = WindowStack::new(EngineConfig::default());
    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 8, 2));
    stack.push(a, ModalOptions::default()).unwrap();
    stack.attach_renderer(area);
    let b = window(&mut stack, &log, "B", Rect::new(4, 0, 4, 1));
    stack.push(b, ModalOptions::default()).unwrap();
    assert!(stack.backdrop(b).is_none());
    let frame = render(&mut stack, area);
    assert_eq!(frame[(0, 0)].symbol(), " ");
    assert_eq!(frame[(4, 0)].symbol(), "B");
}

#[test]
fn burying_a_window_ends_its_capture() {
    let log: Log = Rc::default();
    let mut stack = WindowStack::new(EngineConfig::default());
    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 20, 10));
    let c = grip(&mut stack, &log, a, Rect::new(2, 2, 4, 2));
    stack.push(a, ModalOptions::default()).unwrap();

    stack.dispatch(&moved(3, 3));
    stack.dispatch(&down(3, 3));
    stack.dispatch(&moved(4, 3));
    assert!(stack.tree().has_capture(c));
    log.borrow_mut().clear();

    let b = window(&mut stack, &log, "B", Rect::new(10, 5, 5, 3));
    stack.push(b, ModalOptions::with_backdrop()).unwrap();
    assert!(!stack.tree().has_capture(c));
    assert_eq!(stack.tree().captured_child(a), None);
    assert_eq!(
        drain(&log, &["C"]),
        vec!["C:lost", "C:drag-end", "C:focus-", "C:leave"]
    );

    // The button comes up over the dialog, which then closes.
    stack.dispatch(&up(4, 3));
    stack.pop(b).unwrap();
    stack.dispatch(&moved(15, 8));
    assert!(!stack.tree().has_capture(c));
    assert!(!stack.tree().has_hover(c));
    assert_eq!(stack.tree().under_mouse(a), None);
    let events = drain(&log, &["C"]);
    assert!(!events.iter().any(|e| e == "C:click" || e == "C:release"));

    // A fresh press on the buried-then-restored window works normally.
    stack.dispatch(&moved(3, 3));
    stack.dispatch(&down(3, 3));
    stack.dispatch(&up(3, 3));
    let events = drain(&log, &["C"]);
    assert!(events.ends_with(&["C:release".to_string(), "C:click".to_string()]));
}

#[test]
fn popping_a_window_ends_its_capture() {
    let log: Log = Rc::default();
    let mut stack = WindowStack::new(EngineConfig::default());
    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 20, 10));
    stack.push(a, ModalOptions::default()).unwrap();
    let b = window(&mut stack, &log, "B", Rect::new(0, 0, 10, 6));
    let c = grip(&mut stack, &log, b, Rect::new(1, 1, 3, 1));
    stack.push(b, ModalOptions::default()).unwrap();

    stack.dispatch(&down(2, 1));
    assert!(stack.tree().has_capture(c));
    log.borrow_mut().clear();
    stack.pop(b).unwrap();
    assert!(!stack.tree().has_capture(c));
    assert_eq!(drain(&log, &["C"]).first().map(String::as_str), Some("C:lost"));
}

#[test]
fn losing_terminal_focus_ends_capture() {
    let log: Log = Rc::default();
    let mut stack = WindowStack::new(EngineConfig::default());
    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 20, 10));
    let c = grip(&mut stack, &log, a, Rect::new(2, 2, 4, 2));
    stack.push(a, ModalOptions::default()).unwrap();
    stack.dispatch(&down(3, 3));
    log.borrow_mut().clear();

    stack.dispatch(&Event::FocusLose);
    assert!(!stack.tree().has_capture(c));
    assert_eq!(drain(&log, &["C"]), vec!["C:lost", "C:focus-"]);
}

#[test]
fn push_then_pop_restores_nested_hover_and_focus() {
    let log: Log = Rc::default();
    let mut stack = WindowStack::new(EngineConfig::default());
    let a = window(&mut stack, &log, "A", Rect::new(0, 0, 20, 10));
    let c = grip(&mut stack, &log, a, Rect::new(2, 2, 4, 2));
    stack.push(a, ModalOptions::default()).unwrap();
    stack.dispatch(&moved(3, 3));
    stack.dispatch(&down(3, 3));
    stack.dispatch(&up(3, 3));

    let snapshot = |stack: &WindowStack| {
        let tree = stack.tree();
        (
            stack.delivered(a),
            tree.focused_child(a),
            tree.under_mouse(a),
            tree.captured_child(a),
            tree.has_focus(c),
            tree.has_hover(c),
            tree.has_capture(c),
        )
    };
    let before = snapshot(&stack);
    assert_eq!(before.1, Some(c));
    assert_eq!(before.2, Some(c));
    log.borrow_mut().clear();

    let b = window(&mut stack, &log, "B", Rect::new(10, 5, 5, 3));
    stack.push(b, ModalOptions::with_backdrop()).unwrap();
    stack.pop(b).unwrap();

    assert_eq!(snapshot(&stack), before);
    assert_eq!(
        drain(&log, &["C"]),
        vec!["C:focus-", "C:leave", "C:enter", "C:focus+"]
    );
}

#[test]
#[should_panic(expected = "not allowed")]
fn window_level_leave_forbids_structural_changes() {
    let mut stack = WindowStack::new(EngineConfig::default());
    let a = stack.create_window(Unruly, Rect::new(0, 0, 10, 4));
    let child = stack.tree_mut().create(Unruly);
    stack.tree_mut().insert_child(a, child).unwrap();
    stack.push(a, ModalOptions::default()).unwrap();
    stack.dispatch(&moved(20, 20));

    let b = stack.create_window(Unruly, Rect::new(0, 0, 4, 2));
    stack.push(b, ModalOptions::default()).unwrap();
}
