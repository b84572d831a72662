use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::Level;

use term_modal::EngineConfig;
use term_modal::component::{ComponentId, Tree};
use term_modal::components::{
    Button, ConfirmAction, ConfirmDialog, ConfirmHandle, Label, Panel, TextField,
};
use term_modal::constants::{DARKEN_TARGET, DARKEN_TICKS, DEFAULT_TICK_MILLIS, TOOLTIP_DELAY_TICKS};
use term_modal::geom::Rect;
use term_modal::task::{TaskHandle, Worker};
use term_modal::window::{ModalOptions, WindowStack};
use term_modal::{clipboard, runner, theme, tracing_sub};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "term-modal",
    version = env!("CARGO_PKG_VERSION"),
    about = "Modal window stack demo"
)]
struct Cli {
    /// Frame interval in milliseconds.
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_MILLIS)]
    tick_ms: u64,

    /// Ticks the backdrop takes to darken after a dialog opens.
    #[arg(long = "darken-ticks", default_value_t = DARKEN_TICKS)]
    darken_ticks: u64,

    /// Final backdrop darkness, 0.0 to 1.0.
    #[arg(long = "darken-target", default_value_t = DARKEN_TARGET)]
    darken_target: f32,

    /// Ticks the pointer must rest before a tooltip appears.
    #[arg(long = "tooltip-delay", default_value_t = TOOLTIP_DELAY_TICKS)]
    tooltip_delay: u64,

    /// Leave mouse reporting off.
    #[arg(long = "no-mouse")]
    no_mouse: bool,

    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Debug)]
    log_level: LogLevel,

    /// Print the captured log after the terminal is restored.
    #[arg(long = "print-logs")]
    print_logs: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tick_interval: Duration::from_millis(self.tick_ms),
            darken_ticks: self.darken_ticks,
            darken_target: self.darken_target,
            tooltip_delay_ticks: self.tooltip_delay,
            mouse_capture: !self.no_mouse,
            ..EngineConfig::default()
        }
    }
}

/// Things widgets ask the host for; only the host can touch the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Nested,
    AskQuit,
    Job,
}

type Requests = Rc<RefCell<Vec<Request>>>;

fn request_button(label: &str, requests: &Requests, request: Request) -> Button {
    let requests = requests.clone();
    Button::new(label).on_click(move |_| requests.borrow_mut().push(request))
}

fn close_button() -> Button {
    Button::new("Close").on_click(|ctx| {
        let root = ctx.root_of(ctx.id());
        ctx.destroy(root);
    })
}

fn add(tree: &mut Tree, parent: ComponentId, child: ComponentId, rect: Rect) {
    tree.set_rect(child, rect);
    if let Err(err) = tree.insert_child(parent, child) {
        tracing::warn!(%err, "demo child not attached");
    }
}

struct Demo {
    requests: Requests,
    area: Rect,
    main: ComponentId,
    status: ComponentId,
    quit_dialog: Option<ConfirmHandle>,
    worker: Option<Worker>,
    job: Option<TaskHandle<String>>,
    depth: i32,
}

impl Demo {
    fn new(stack: &mut WindowStack, area: Rect) -> Self {
        let requests: Requests = Rc::new(RefCell::new(Vec::new()));
        let width = area.size.width;
        let tree = stack.tree_mut();
        let main = Panel::create(tree, Panel::titled("term-modal"), area);

        let intro = tree.create(Label::new(
            "Type in the field below. Buttons open stacked windows; Ctrl+Q quits.",
        ));
        add(tree, main, intro, Rect::new(2, 1, width - 4, 2));

        let field = tree.create(
            TextField::new("")
                .multiline(true)
                .with_placeholder("notes...")
                .with_clipboard(clipboard::default_clipboard()),
        );
        add(tree, main, field, Rect::new(2, 4, width - 4, 5));
        tree.set_tooltip(field, Some("Shift+Enter inserts a line break".into()));

        let buttons = [
            ("Window", Request::Nested, "Open a window above this one"),
            ("Job", Request::Job, "Run a slow job on the worker thread"),
            ("Quit", Request::AskQuit, "Ask before quitting"),
        ];
        for (i, (label, request, tip)) in buttons.into_iter().enumerate() {
            let button = tree.create(request_button(label, &requests, request));
            add(tree, main, button, Rect::new(2 + i as i32 * 12, 10, 10, 1));
            tree.set_tooltip(button, Some(tip.into()));
        }

        let status = tree.create(Label::new("idle").with_style(theme::button_disabled()));
        add(tree, main, status, Rect::new(2, 12, width - 4, 1));
        tree.focus(field);

        Self {
            requests,
            area,
            main,
            status,
            quit_dialog: None,
            worker: None,
            job: None,
            depth: 0,
        }
    }

    fn set_status(&self, stack: &mut WindowStack, text: impl Into<String>) {
        if let Some(label) = stack.tree_mut().widget_mut::<Label>(self.status) {
            label.set_text(text);
        }
    }

    fn open_nested(&mut self, stack: &mut WindowStack) {
        self.depth += 1;
        let offset = 2 * self.depth;
        let rect = Rect::new(
            self.area.pos.x + 4 + offset,
            self.area.pos.y + 2 + offset,
            (self.area.size.width - 8 - offset).max(24),
            9,
        );
        let tree = stack.tree_mut();
        let panel = Panel::create(tree, Panel::titled(format!("window {}", self.depth)), rect);
        let label = tree.create(Label::new("Everything below is darkened and ignores input."));
        add(tree, panel, label, Rect::new(2, 1, rect.size.width - 4, 2));
        let field = tree.create(TextField::new(""));
        add(tree, panel, field, Rect::new(2, 4, rect.size.width - 4, 1));
        let more = tree.create(request_button("Another", &self.requests, Request::Nested));
        add(tree, panel, more, Rect::new(2, 6, 11, 1));
        let close = tree.create(close_button());
        add(tree, panel, close, Rect::new(15, 6, 9, 1));
        tree.focus(field);
        if let Err(err) = stack.push(panel, ModalOptions::with_backdrop()) {
            tracing::warn!(%err, "could not open window");
        }
    }

    fn start_job(&mut self, stack: &mut WindowStack) {
        if self.job.as_ref().is_some_and(TaskHandle::is_pending) {
            return;
        }
        if self.worker.is_none() {
            match Worker::spawn() {
                Ok(worker) => self.worker = Some(worker),
                Err(err) => {
                    tracing::warn!(%err, "worker thread unavailable");
                    return;
                }
            }
        }
        let Some(worker) = &self.worker else {
            return;
        };
        self.job = Some(worker.submit(|| {
            thread::sleep(Duration::from_millis(800));
            let sum: u64 = (1..=1_000_000u64).sum();
            format!("job finished: {sum}")
        }));
        self.set_status(stack, "job running...");
    }

    /// Called between frames.
    fn update(&mut self, stack: &mut WindowStack) {
        let pending: Vec<Request> = self.requests.borrow_mut().drain(..).collect();
        for request in pending {
            match request {
                Request::Nested => self.open_nested(stack),
                Request::Job => self.start_job(stack),
                Request::AskQuit if self.quit_dialog.is_none() => {
                    match ConfirmDialog::open(stack, "Quit", "Leave the demo?", self.area) {
                        Ok(handle) => self.quit_dialog = Some(handle),
                        Err(err) => tracing::warn!(%err, "could not open dialog"),
                    }
                }
                Request::AskQuit => {}
            }
        }

        if let Some(handle) = &self.quit_dialog
            && let Some(action) = handle.result()
        {
            self.quit_dialog = None;
            if action == ConfirmAction::Confirm {
                stack.tree_mut().destroy(self.main);
            }
        }

        if let Some(result) = self.job.as_mut().and_then(TaskHandle::poll) {
            self.set_status(stack, result);
            self.job = None;
        }

        if stack.len() <= 1 {
            self.depth = 0;
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    tracing_sub::init(cli.log_level.into());

    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let area = Rect::new(0, 0, i32::from(cols), i32::from(rows));

    let mut stack = WindowStack::new(cli.engine_config());
    let mut demo = Demo::new(&mut stack, area);
    if let Err(err) = stack.push(demo.main, ModalOptions::default()) {
        return Err(io::Error::other(err.to_string()));
    }

    let logs = runner::run_console_with(&mut stack, |stack| demo.update(stack))?;
    if cli.print_logs {
        for line in logs.drain() {
            println!("{line}");
        }
    }
    Ok(())
}
