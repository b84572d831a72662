use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;

use super::backdrop;
use super::tooltip::{self, TooltipState};
use crate::colors;
use crate::component::{Component, ComponentId, Cursor, Forbid, Tree};
use crate::config::EngineConfig;
use crate::error::{StackError, TreeError};
use crate::event::Event;
use crate::geom::{Point, Rect};
use crate::state::GainState;
use crate::ui::{self, UiFrame};

/// How a window is pushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalOptions {
    /// Snapshot the window below and show it darkened behind this one.
    pub backdrop: bool,
}

impl ModalOptions {
    pub fn with_backdrop() -> Self {
        Self { backdrop: true }
    }
}

#[derive(Debug)]
struct ModalEntry {
    root: ComponentId,
    backdrop: Option<Buffer>,
    wants_backdrop: bool,
    pushed_at: u64,
    /// Hover/focus this window has been told it holds.
    delivered: GainState,
}

/// The modal window stack and the component tree its windows live in.
///
/// Only the top window ticks and receives live input; windows below are
/// represented by the backdrop snapshots of the windows above them.
pub struct WindowStack {
    tree: Tree,
    entries: Vec<ModalEntry>,
    ticks: u64,
    surface: Option<CellRect>,
    os: GainState,
    pointer: Option<Point>,
    tooltip: TooltipState,
    config: EngineConfig,
    truecolor: bool,
}

impl WindowStack {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tree: Tree::new(),
            entries: Vec::new(),
            ticks: 0,
            surface: None,
            os: GainState::new(true, false),
            pointer: None,
            tooltip: TooltipState::default(),
            config: config.sanitized(),
            truecolor: colors::truecolor_supported(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Force truecolor on or off for darken compositing.
    pub fn set_truecolor(&mut self, truecolor: bool) {
        self.truecolor = truecolor;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Create a parentless window root at `rect`.
    pub fn create_window<W: Component + 'static>(&mut self, widget: W, rect: Rect) -> ComponentId {
        let root = self.tree.create(widget);
        self.tree.set_rect(root, rect);
        root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<ComponentId> {
        self.entries.last().map(|e| e.root)
    }

    /// Window roots bottom to top.
    pub fn windows(&self) -> Vec<ComponentId> {
        self.entries.iter().map(|e| e.root).collect()
    }

    pub fn contains(&self, root: ComponentId) -> bool {
        self.entries.iter().any(|e| e.root == root)
    }

    pub fn backdrop(&self, root: ComponentId) -> Option<&Buffer> {
        self.entries
            .iter()
            .find(|e| e.root == root)
            .and_then(|e| e.backdrop.as_ref())
    }

    /// Hover/focus last delivered to `root`.
    pub fn delivered(&self, root: ComponentId) -> Option<GainState> {
        self.entries
            .iter()
            .find(|e| e.root == root)
            .map(|e| e.delivered)
    }

    pub fn os_state(&self) -> GainState {
        self.os
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn surface(&self) -> Option<CellRect> {
        self.surface
    }

    pub fn push(&mut self, root: ComponentId, options: ModalOptions) -> Result<(), StackError> {
        if self.contains(root) {
            return Err(StackError::AlreadyPushed(root));
        }
        if !self.tree.contains(root) {
            return Err(TreeError::Unknown(root).into());
        }
        if self.tree.parent(root).is_some() {
            return Err(StackError::NotARoot(root));
        }

        let below = self.entries.len().checked_sub(1);
        if let Some(index) = below {
            let buried = self.entries[index].root;
            self.tree.cancel_capture(buried);
        }
        let backdrop = match below {
            Some(index) if options.backdrop => self.snapshot(index),
            _ => None,
        };
        if let Some(index) = below {
            self.deliver(index, GainState::NONE);
        }

        self.entries.push(ModalEntry {
            root,
            backdrop,
            wants_backdrop: options.backdrop,
            pushed_at: self.ticks,
            delivered: GainState::NONE,
        });
        if self.surface.is_some() {
            self.tree.attach_renderer(root);
        }
        self.tooltip.reset();
        let top = self.entries.len() - 1;
        self.deliver(top, self.os);
        tracing::debug!(window = ?root, depth = self.entries.len(), "pushed window");
        Ok(())
    }

    pub fn pop(&mut self, root: ComponentId) -> Result<(), StackError> {
        if self.top() != Some(root) {
            return Err(StackError::NotOnTop(root));
        }
        let index = self.entries.len() - 1;
        self.tree.cancel_capture(root);
        self.deliver(index, GainState::NONE);
        self.entries.pop();
        self.tree.detach_renderer(root);
        self.tooltip.reset();
        if let Some(top) = self.entries.len().checked_sub(1) {
            self.deliver(top, self.os);
        }
        tracing::debug!(window = ?root, depth = self.entries.len(), "popped window");
        Ok(())
    }

    /// Pop `root` (which must be on top) and destroy its subtree.
    pub fn close(&mut self, root: ComponentId) -> Result<(), StackError> {
        self.pop(root)?;
        self.tree.destroy(root);
        Ok(())
    }

    /// Bring the hover/focus the window at `index` believes it holds in line
    /// with `want`, sending exactly one notification per changed bit.
    fn deliver(&mut self, index: usize, want: GainState) {
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        let have = entry.delivered;
        if have == want {
            return;
        }
        entry.delivered = want;
        let root = entry.root;

        if have.focus && !want.focus {
            self.tree.handle_event(root, &Event::FocusLose);
        }
        if have.hover && !want.hover {
            let mut guard = self.tree.forbid(Forbid::STRUCTURE);
            guard.handle_event(root, &Event::MouseLeave);
        }
        if !have.hover && want.hover {
            match self.pointer {
                Some(pos) => {
                    {
                        let mut guard = self.tree.forbid(Forbid::STRUCTURE);
                        guard.handle_event(root, &Event::MouseEnter { pos });
                    }
                    self.tree.handle_event(
                        root,
                        &Event::MouseMove {
                            pos,
                            delta: Point::ZERO,
                        },
                    );
                }
                None => {
                    if let Some(entry) = self.entries.get_mut(index) {
                        entry.delivered.hover = false;
                    }
                }
            }
        }
        if !have.focus && want.focus {
            self.tree.handle_event(root, &Event::FocusGain);
        }
    }

    fn sync_top(&mut self) {
        if let Some(top) = self.entries.len().checked_sub(1) {
            self.deliver(top, self.os);
        }
    }

    /// Drop entries whose root was destroyed behind the stack's back.
    fn prune_dead(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|e| self.tree.contains(e.root));
        if self.entries.len() != before {
            tracing::debug!(removed = before - self.entries.len(), "pruned destroyed windows");
            self.tooltip.reset();
            self.sync_top();
        }
    }

    /// Route an input event to the top window. Window-level FocusGain,
    /// FocusLose and MouseLeave update the OS state instead.
    pub fn dispatch(&mut self, event: &Event) -> bool {
        self.prune_dead();
        match event {
            Event::Tick => {
                self.tick();
                return false;
            }
            Event::Draw => {
                tracing::warn!("Draw needs a frame; use WindowStack::draw");
                return false;
            }
            Event::FocusGain | Event::FocusLose => {
                self.os.focus = matches!(event, Event::FocusGain);
                if !self.os.focus
                    && let Some(top) = self.top()
                {
                    self.tree.cancel_capture(top);
                }
                self.sync_top();
                return false;
            }
            Event::MouseLeave => {
                self.os.hover = false;
                self.tooltip.reset();
                self.sync_top();
                return false;
            }
            Event::MouseEnter { pos } => {
                self.pointer = Some(*pos);
                self.os.hover = true;
                self.sync_top();
                return false;
            }
            Event::RendererUp | Event::RendererDown => {
                tracing::warn!(event = event.kind(), "renderer events go through attach/detach_renderer");
                return false;
            }
            _ => {}
        }

        if let Some(pos) = event.position() {
            self.pointer = Some(pos);
            if !self.os.hover {
                self.os.hover = true;
                self.sync_top();
                // Entering already delivered a move at this position.
                if matches!(event, Event::MouseMove { .. }) {
                    return false;
                }
            }
        }

        let Some(top) = self.top() else {
            return false;
        };
        let consumed = self.tree.handle_event(top, event);
        if let Event::MouseUp { pos, .. } = event
            && self.tree.contains(top)
        {
            self.tree.refresh_hover(top, *pos);
        }
        consumed
    }

    /// Advance one frame: tick the top window and the tooltip delay.
    pub fn tick(&mut self) {
        self.ticks += 1;
        self.prune_dead();
        let Some(top) = self.top() else {
            return;
        };
        self.tree.handle_event(top, &Event::Tick);
        let target = if self.os.hover && self.tree.contains(top) {
            tooltip::hovered_tooltip(&self.tree, top)
        } else {
            None
        };
        self.tooltip.track(target, self.pointer, self.ticks);
    }

    /// Dispatch Quit to the top window.
    pub fn quit(&mut self) {
        if let Some(top) = self.top() {
            self.tree.handle_event(top, &Event::Quit);
        }
    }

    /// Current darken opacity over the backdrop of `root`.
    pub fn darken_alpha(&self, root: ComponentId) -> Option<f32> {
        let entry = self.entries.iter().find(|e| e.root == root)?;
        Some(self.alpha_for(entry))
    }

    fn alpha_for(&self, entry: &ModalEntry) -> f32 {
        backdrop::darken_alpha(
            self.ticks.saturating_sub(entry.pushed_at),
            self.config.darken_ticks,
            self.config.darken_target,
            self.config.darken_curve,
        )
    }

    pub fn draw(&mut self, frame: &mut UiFrame<'_>) {
        self.prune_dead();
        if let Some(top) = self.entries.len().checked_sub(1) {
            self.draw_entry(top, frame, true);
        }
    }

    /// Backdrop (darkened), the window's tree, then optionally the tooltip.
    fn draw_entry(&mut self, index: usize, frame: &mut UiFrame<'_>, with_tooltip: bool) {
        let Some(entry) = self.entries.get(index) else {
            return;
        };
        let root = entry.root;
        if let Some(snapshot) = &entry.backdrop {
            let alpha = self.alpha_for(entry);
            backdrop::composite(frame, snapshot, alpha, self.truecolor);
        }
        self.tree.draw(root, frame);
        if with_tooltip {
            self.draw_tooltip(frame);
        }
    }

    fn draw_tooltip(&self, frame: &mut UiFrame<'_>) {
        let Some((target, pointer)) = self
            .tooltip
            .ready(self.ticks, self.config.tooltip_delay_ticks)
        else {
            return;
        };
        if let Some(text) = self.tree.tooltip(target) {
            tooltip::draw_tooltip(frame, text, pointer, frame.bounds());
        }
    }

    /// Render the window at `index` off-screen, tooltip layer suppressed.
    fn snapshot(&mut self, index: usize) -> Option<Buffer> {
        let area = self.surface?;
        let mut buffer = ui::offscreen(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buffer);
            self.draw_entry(index, &mut frame, false);
        }
        Some(buffer)
    }

    /// A renderer of `area` became available: RendererUp to every window,
    /// bottom to top, and take any backdrop that is still missing.
    pub fn attach_renderer(&mut self, area: CellRect) {
        self.surface = Some(area);
        for index in 0..self.entries.len() {
            let root = self.entries[index].root;
            self.tree.attach_renderer(root);
            if index > 0 && self.entries[index].wants_backdrop && self.entries[index].backdrop.is_none() {
                let snapshot = self.snapshot(index - 1);
                self.entries[index].backdrop = snapshot;
            }
        }
        tracing::debug!(?area, windows = self.entries.len(), "renderer attached");
    }

    /// RendererDown to every window, bottom to top; backdrops are released.
    pub fn detach_renderer(&mut self) {
        for index in 0..self.entries.len() {
            let root = self.entries[index].root;
            self.tree.detach_renderer(root);
            self.entries[index].backdrop = None;
        }
        self.surface = None;
        tracing::debug!("renderer detached");
    }

    /// Rebuild every window's renderer resources against a new surface and
    /// re-render each backdrop so darkening matches the new resolution.
    pub fn recreate_surface(&mut self, area: CellRect) {
        tracing::debug!(?area, "recreating surface");
        for index in 0..self.entries.len() {
            let root = self.entries[index].root;
            self.tree.detach_renderer(root);
        }
        self.surface = Some(area);
        for index in 0..self.entries.len() {
            let root = self.entries[index].root;
            self.tree.attach_renderer(root);
            if index > 0 && self.entries[index].wants_backdrop {
                let snapshot = self.snapshot(index - 1);
                self.entries[index].backdrop = snapshot;
            } else {
                self.entries[index].backdrop = None;
            }
        }
    }

    /// Cursor requested by the deepest hovered node of the top window.
    pub fn cursor(&self) -> Cursor {
        let Some(top) = self.top() else {
            return Cursor::default();
        };
        self.tree
            .hover_chain(top)
            .into_iter()
            .rev()
            .map(|id| self.tree.cursor(id))
            .find(|c| *c != Cursor::Arrow)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ratatui::style::{Color, Style};

    use super::*;
    use crate::component::Ctx;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Pane {
        name: &'static str,
        log: Log,
        style: Style,
    }

    impl Pane {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                style: Style::default()
                    .fg(Color::Rgb(200, 200, 200))
                    .bg(Color::Rgb(100, 0, 0)),
            }
        }

        fn push(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{what}", self.name));
        }
    }

    impl Component for Pane {
        fn tick(&mut self, _ctx: &mut Ctx<'_>) {
            self.push("tick");
        }
        fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
            let rect = ctx.rect();
            frame.fill_rect(rect, self.style);
            frame.line(rect.top_left(), rect.top_right(), self.name, self.style);
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

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    fn stack() -> WindowStack {
        let mut stack = WindowStack::new(EngineConfig::default());
        stack.set_truecolor(true);
        stack
    }

    fn hover_at(stack: &mut WindowStack, pos: Point) {
        stack.dispatch(&Event::MouseMove {
            pos,
            delta: Point::ZERO,
        });
    }

    #[test]
    fn push_and_pop_move_focus_and_hover() {
        let log = Log::default();
        let mut stack = stack();
        let a = stack.create_window(Pane::new("A", &log), Rect::new(0, 0, 10, 4));
        let b = stack.create_window(Pane::new("B", &log), Rect::new(2, 1, 4, 2));

        stack.push(a, ModalOptions::default()).unwrap();
        assert_eq!(take(&log), ["A:focus+"]);
        hover_at(&mut stack, Point::new(1, 1));
        assert_eq!(take(&log), ["A:enter"]);

        stack.push(b, ModalOptions::with_backdrop()).unwrap();
        assert_eq!(take(&log), ["A:focus-", "A:leave", "B:enter", "B:focus+"]);
        assert_eq!(stack.delivered(a), Some(GainState::NONE));
        assert_eq!(stack.delivered(b), Some(GainState::new(true, true)));

        stack.pop(b).unwrap();
        assert_eq!(take(&log), ["B:focus-", "B:leave", "A:enter", "A:focus+"]);
        assert_eq!(stack.top(), Some(a));
        assert_eq!(stack.delivered(a), Some(GainState::new(true, true)));
    }

    #[test]
    fn stack_errors() {
        let log = Log::default();
        let mut stack = stack();
        let a = stack.create_window(Pane::new("A", &log), Rect::new(0, 0, 4, 4));
        let b = stack.create_window(Pane::new("B", &log), Rect::new(0, 0, 2, 2));
        stack.tree_mut().insert_child(a, b).unwrap();

        stack.push(a, ModalOptions::default()).unwrap();
        assert_eq!(stack.push(a, ModalOptions::default()), Err(StackError::AlreadyPushed(a)));
        assert_eq!(stack.push(b, ModalOptions::default()), Err(StackError::NotARoot(b)));
        assert_eq!(stack.pop(b), Err(StackError::NotOnTop(b)));
    }

    #[test]
    fn os_focus_follows_the_top_window_only() {
        let log = Log::default();
        let mut stack = stack();
        let a = stack.create_window(Pane::new("A", &log), Rect::new(0, 0, 4, 4));
        let b = stack.create_window(Pane::new("B", &log), Rect::new(0, 0, 4, 4));
        stack.push(a, ModalOptions::default()).unwrap();
        stack.push(b, ModalOptions::default()).unwrap();
        take(&log);

        stack.dispatch(&Event::FocusLose);
        stack.dispatch(&Event::FocusLose);
        assert_eq!(take(&log), ["B:focus-"]);
        stack.dispatch(&Event::FocusGain);
        assert_eq!(take(&log), ["B:focus+"]);
    }

    #[test]
    fn only_the_top_window_ticks() {
        let log = Log::default();
        let mut stack = stack();
        let a = stack.create_window(Pane::new("A", &log), Rect::new(0, 0, 4, 4));
        let b = stack.create_window(Pane::new("B", &log), Rect::new(0, 0, 4, 4));
        stack.push(a, ModalOptions::default()).unwrap();
        stack.push(b, ModalOptions::default()).unwrap();
        take(&log);
        stack.dispatch(&Event::Tick);
        assert_eq!(take(&log), ["B:tick"]);
    }

    #[test]
    fn destroyed_windows_are_pruned() {
        let log = Log::default();
        let mut stack = stack();
        let a = stack.create_window(Pane::new("A", &log), Rect::new(0, 0, 4, 4));
        let b = stack.create_window(Pane::new("B", &log), Rect::new(0, 0, 4, 4));
        stack.push(a, ModalOptions::default()).unwrap();
        stack.push(b, ModalOptions::default()).unwrap();
        stack.tree_mut().destroy(b);
        take(&log);
        stack.tick();
        assert_eq!(stack.top(), Some(a));
        assert_eq!(take(&log), ["A:focus+", "A:tick"]);
    }

    #[test]
    fn backdrop_darkens_over_time() {
        let log = Log::default();
        let mut stack = stack();
        let area = CellRect::new(0, 0, 10, 4);
        stack.attach_renderer(area);
        let a = stack.create_window(Pane::new("A", &log), Rect::new(0, 0, 10, 4));
        let b = stack.create_window(Pane::new("B", &log), Rect::new(3, 1, 4, 2));
        stack.push(a, ModalOptions::default()).unwrap();
        stack.push(b, ModalOptions::with_backdrop()).unwrap();
        assert!(stack.backdrop(b).is_some());
        assert!(stack.backdrop(a).is_none());

        let render = |stack: &mut WindowStack| {
            let mut buffer = ui::offscreen(area);
            let mut frame = UiFrame::from_parts(area, &mut buffer);
            stack.draw(&mut frame);
            buffer
        };

        let fresh = render(&mut stack);
        let outside = fresh.cell((0, 0)).unwrap();
        assert_eq!(outside.symbol(), "A");
        assert_eq!(outside.fg, Color::Rgb(200, 200, 200));
        assert_eq!(fresh.cell((3, 1)).unwrap().symbol(), "B");

        let mut last = 0.0;
        for _ in 0..stack.config().darken_ticks {
            stack.tick();
            let alpha = stack.darken_alpha(b).unwrap();
            assert!(alpha >= last);
            last = alpha;
        }
        assert_eq!(last, stack.config().darken_target);

        let dark = render(&mut stack);
        let outside = dark.cell((0, 0)).unwrap();
        assert_eq!(outside.symbol(), "A");
        assert_eq!(outside.fg, Color::Rgb(100, 100, 100));
        assert_eq!(outside.bg, Color::Rgb(50, 0, 0));
        // B itself is drawn on top, undarkened.
        assert_eq!(dark.cell((3, 1)).unwrap().fg, Color::Rgb(200, 200, 200));
    }

    #[test]
    fn recreate_surface_cycles_renderers_bottom_to_top() {
        let log = Log::default();
        let mut stack = stack();
        stack.attach_renderer(CellRect::new(0, 0, 4, 4));
        let a = stack.create_window(Pane::new("A", &log), Rect::new(0, 0, 4, 4));
        let b = stack.create_window(Pane::new("B", &log), Rect::new(0, 0, 2, 2));
        stack.push(a, ModalOptions::default()).unwrap();
        stack.push(b, ModalOptions::with_backdrop()).unwrap();
        take(&log);

        stack.recreate_surface(CellRect::new(0, 0, 8, 6));
        assert_eq!(take(&log), ["A:down", "B:down", "A:up", "B:up"]);
        assert_eq!(stack.backdrop(b).map(|buf| buf.area), Some(CellRect::new(0, 0, 8, 6)));
    }
}
