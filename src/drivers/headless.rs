//! In-memory drivers: scripted input and a `TestBackend` screen.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::Event;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::{InputDriver, OutputDriver};
use crate::ui::UiFrame;

/// Replays queued events; `poll` never blocks.
#[derive(Debug, Default)]
pub struct HeadlessInput {
    queue: VecDeque<Event>,
    mouse_capture: Option<bool>,
}

impl HeadlessInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Last mouse capture state requested by the loop.
    pub fn mouse_capture(&self) -> Option<bool> {
        self.mouse_capture
    }
}

impl Extend<Event> for HeadlessInput {
    fn extend<T: IntoIterator<Item = Event>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}

impl InputDriver for HeadlessInput {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(!self.queue.is_empty())
    }

    fn read(&mut self) -> io::Result<Event> {
        self.queue
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::WouldBlock, "no scripted input left"))
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        self.mouse_capture = Some(enabled);
        Ok(())
    }
}

pub struct HeadlessOutput {
    terminal: Terminal<TestBackend>,
    entered: bool,
    frames: usize,
}

impl HeadlessOutput {
    pub fn new(width: u16, height: u16) -> io::Result<Self> {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .map_err(|err| io::Error::other(err.to_string()))?;
        Ok(Self {
            terminal,
            entered: false,
            frames: 0,
        })
    }

    /// Last presented screen.
    pub fn buffer(&self) -> &Buffer {
        self.terminal.backend().buffer()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal.backend_mut().resize(width, height);
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn entered(&self) -> bool {
        self.entered
    }

    /// Row `y` of the screen as plain text.
    pub fn row_text(&self, y: u16) -> String {
        let buffer = self.buffer();
        (0..buffer.area.width)
            .filter_map(|x| buffer.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect()
    }
}

impl OutputDriver for HeadlessOutput {
    fn enter(&mut self) -> io::Result<()> {
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        self.entered = false;
        Ok(())
    }

    fn area(&mut self) -> io::Result<Rect> {
        let size = self
            .terminal
            .size()
            .map_err(|err| io::Error::other(err.to_string()))?;
        Ok(Rect::new(0, 0, size.width, size.height))
    }

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut UiFrame<'_>),
    {
        self.frames += 1;
        self.terminal
            .draw(move |frame| {
                let mut wrapper = UiFrame::new(frame);
                f(&mut wrapper);
            })
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()))
    }
}
