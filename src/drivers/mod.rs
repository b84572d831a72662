//! Terminal input/output drivers and the normalizer that turns raw
//! crossterm input into engine events.

pub mod console;
pub mod headless;
pub mod normalize;

use std::io;
use std::time::Duration;

use ::crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
    fn set_mouse_capture(&mut self, _enabled: bool) -> io::Result<()> {
        Ok(())
    }
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        (**self).set_mouse_capture(enabled)
    }
}

pub trait OutputDriver {
    fn enter(&mut self) -> io::Result<()>;
    fn exit(&mut self) -> io::Result<()>;

    /// Current drawable area in cells.
    fn area(&mut self) -> io::Result<Rect>;

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut UiFrame<'_>);
}
