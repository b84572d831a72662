use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use crossterm::event::MouseButton;
use ratatui::layout::Rect as CellRect;

use term_modal::EngineConfig;
use term_modal::component::{ComponentId, Tree};
use term_modal::components::{Button, ConfirmDialog, Panel};
use term_modal::event::{Event, MouseUpReason};
use term_modal::geom::{Point, Rect};
use term_modal::text::TextWrapper;
use term_modal::ui::{self, UiFrame};
use term_modal::window::{ModalOptions, WindowStack};

const WORDS: [&str; 12] = [
    "lorem", "ipsum", "dolor", "sit", "amet,", "consectetur", "adipiscing", "elit.", "sed", "do",
    "eiusmod", "tempor",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Wrap a paragraph and map points back to caret indices.
    Wrap,
    /// Route pointer and click events through a grid of buttons.
    Dispatch,
    /// Draw a stack with a darkened backdrop into an offscreen buffer.
    Draw,
    All,
}

#[derive(Parser, Debug)]
#[command(
    name = "modal-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless benchmark for the wrapper, the dispatcher and the window stack"
)]
struct BenchCli {
    /// How long to run each workload.
    #[arg(
        short = 'd',
        long = "duration",
        value_name = "SECONDS",
        default_value_t = 2.0
    )]
    duration_seconds: f64,

    #[arg(short = 'm', long = "mode", value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Wrap width, in cells.
    #[arg(short = 'w', long = "width", default_value_t = 60)]
    width: i32,

    /// Words in the wrapped paragraph.
    #[arg(long = "words", default_value_t = 2000)]
    words: usize,

    /// Buttons per side of the dispatch grid.
    #[arg(long = "grid", default_value_t = 12)]
    grid: i32,
}

struct BenchConfig {
    duration: Duration,
    width: i32,
    words: usize,
    grid: i32,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(0.1..=600.0).contains(&cli.duration_seconds) {
            return Err("duration must be between 0.1 and 600 seconds".to_string());
        }
        if !(1..=1000).contains(&cli.width) {
            return Err("width must be between 1 and 1000".to_string());
        }
        if !(1..=64).contains(&cli.grid) {
            return Err("grid must be between 1 and 64".to_string());
        }
        Ok(Self {
            duration: Duration::from_secs_f64(cli.duration_seconds),
            width: cli.width,
            words: cli.words.max(1),
            grid: cli.grid,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let modes: &[Mode] = match args.mode {
        Mode::All => &[Mode::Wrap, Mode::Dispatch, Mode::Draw],
        Mode::Wrap => &[Mode::Wrap],
        Mode::Dispatch => &[Mode::Dispatch],
        Mode::Draw => &[Mode::Draw],
    };
    for mode in modes {
        let stats = match mode {
            Mode::Wrap => bench_wrap(&config),
            Mode::Dispatch => bench_dispatch(&config),
            Mode::Draw => bench_draw(&config),
            Mode::All => continue,
        };
        println!("{}", stats.report());
    }
    Ok(())
}

struct BenchStats {
    name: &'static str,
    unit: &'static str,
    start: Instant,
    elapsed: Duration,
    iterations: u64,
    units: u64,
    fastest: Duration,
    slowest: Duration,
}

impl BenchStats {
    fn new(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit,
            start: Instant::now(),
            elapsed: Duration::ZERO,
            iterations: 0,
            units: 0,
            fastest: Duration::MAX,
            slowest: Duration::ZERO,
        }
    }

    fn record(&mut self, units: u64, took: Duration) {
        self.iterations = self.iterations.saturating_add(1);
        self.units = self.units.saturating_add(units);
        self.fastest = self.fastest.min(took);
        self.slowest = self.slowest.max(took);
    }

    fn running(&self, budget: Duration) -> bool {
        self.start.elapsed() < budget
    }

    fn finish(mut self) -> Self {
        self.elapsed = self.start.elapsed();
        self
    }

    fn report(&self) -> String {
        let secs = self.elapsed.as_secs_f64();
        let per_sec = if secs > 0.0 {
            self.units as f64 / secs
        } else {
            0.0
        };
        let avg_ms = if self.iterations > 0 {
            secs * 1_000.0 / self.iterations as f64
        } else {
            0.0
        };
        let best = if self.iterations > 0 {
            self.fastest.as_secs_f64() * 1_000.0
        } else {
            0.0
        };
        indoc::formatdoc!(
            r#"
            == {name} ==
            Duration: {secs:.2}s | Iterations: {iterations}
            {unit}: {units} total (~{per_sec:.0}/s)
            Iteration ms avg {avg_ms:.3} | best {best:.3} | worst {worst:.3}
            "#,
            name = self.name,
            secs = secs,
            iterations = self.iterations,
            unit = self.unit,
            per_sec = per_sec,
            avg_ms = avg_ms,
            best = best,
            units = self.units,
            worst = self.slowest.as_secs_f64() * 1_000.0,
        )
    }
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn seeded_from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0xA5A5_A5A5_1234_5678;
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
}

fn paragraph(words: usize, rng: &mut Lcg) -> String {
    let mut text = String::new();
    for i in 0..words {
        if i > 0 {
            text.push(if rng.next() % 40 == 0 { '\n' } else { ' ' });
        }
        text.push_str(WORDS[rng.next() as usize % WORDS.len()]);
    }
    text
}

fn bench_wrap(config: &BenchConfig) -> BenchStats {
    let mut rng = Lcg::seeded_from_clock();
    let text = paragraph(config.words, &mut rng);
    let chars = text.chars().count() as u64;
    let wrapper = TextWrapper::new(Some(config.width));
    let mut stats = BenchStats::new("wrap", "Characters");
    while stats.running(config.duration) {
        let began = Instant::now();
        let wrapped = wrapper.wrap(&text);
        let probe = Point::new(
            (rng.next() % config.width as u32) as i32,
            (rng.next() % wrapped.height().max(1) as u32) as i32,
        );
        let index = wrapped.point_to_index(probe);
        std::hint::black_box(wrapped.raw_to_index(index.raw));
        stats.record(chars, began.elapsed());
    }
    stats.finish()
}

fn button_grid(tree: &mut Tree, grid: i32) -> (ComponentId, Rect) {
    let side = grid * 6 + 2;
    let area = Rect::new(0, 0, side, grid * 2 + 2);
    let panel = Panel::create(tree, Panel::titled("bench"), area);
    for row in 0..grid {
        for col in 0..grid {
            let button = tree.create(Button::new(format!("{row}.{col}")));
            tree.set_rect(button, Rect::new(1 + col * 6, 1 + row * 2, 5, 1));
            if tree.insert_child(panel, button).is_err() {
                break;
            }
        }
    }
    (panel, area)
}

fn bench_dispatch(config: &BenchConfig) -> BenchStats {
    let mut rng = Lcg::seeded_from_clock();
    let mut stack = WindowStack::new(EngineConfig::default());
    let (panel, area) = button_grid(stack.tree_mut(), config.grid);
    if stack.push(panel, ModalOptions::default()).is_err() {
        return BenchStats::new("dispatch", "Events").finish();
    }
    let mut stats = BenchStats::new("dispatch", "Events");
    let mut last = Point::ZERO;
    while stats.running(config.duration) {
        let began = Instant::now();
        let pos = Point::new(
            (rng.next() % area.size.width as u32) as i32,
            (rng.next() % area.size.height as u32) as i32,
        );
        let events = [
            Event::MouseMove {
                pos,
                delta: pos - last,
            },
            Event::MouseDown {
                pos,
                button: MouseButton::Left,
            },
            Event::MouseUp {
                pos,
                button: MouseButton::Left,
                reason: MouseUpReason::Normal,
            },
            Event::Tick,
        ];
        for event in &events {
            stack.dispatch(event);
        }
        last = pos;
        stats.record(events.len() as u64, began.elapsed());
    }
    stats.finish()
}

fn bench_draw(config: &BenchConfig) -> BenchStats {
    let mut stack = WindowStack::new(EngineConfig::default());
    let (panel, area) = button_grid(stack.tree_mut(), config.grid);
    let surface = CellRect::new(0, 0, area.size.width as u16, area.size.height as u16);
    let mut stats = BenchStats::new("draw", "Cells");
    if stack.push(panel, ModalOptions::default()).is_err() {
        return stats.finish();
    }
    stack.attach_renderer(surface);
    if ConfirmDialog::open(&mut stack, "Bench", "Drawing over a backdrop.", area).is_err() {
        return stats.finish();
    }
    let cells = surface.area() as u64;
    let mut buffer = ui::offscreen(surface);
    while stats.running(config.duration) {
        let began = Instant::now();
        stack.tick();
        {
            let mut frame = UiFrame::from_parts(surface, &mut buffer);
            stack.draw(&mut frame);
        }
        stats.record(cells, began.elapsed());
    }
    stats.finish()
}
