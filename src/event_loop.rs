use std::io;
use std::time::Duration;

use ratatui::layout::Rect as CellRect;

use crate::config::EngineConfig;
use crate::drivers::normalize::{Input, InputNormalizer};
use crate::drivers::{InputDriver, OutputDriver};
use crate::event::Event;
use crate::keybindings::{Action, KeyBindings};
use crate::state::HostState;
use crate::window::WindowStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Drives the window stack one frame at a time:
/// poll (drain) -> tick -> draw -> present.
///
/// This is the only place that reads from the input driver. The loop ends
/// when the stack runs empty or the quit binding is pressed.
pub struct EventLoop<D> {
    driver: D,
    normalizer: InputNormalizer,
    host: HostState,
    bindings: KeyBindings,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, config: &EngineConfig) -> Self {
        let mut host = HostState::new();
        host.set_mouse_capture_enabled(config.mouse_capture);
        host.resync_mouse_capture();
        Self {
            driver,
            normalizer: InputNormalizer::new(),
            host,
            bindings: config.bindings.clone(),
            poll_interval: config.tick_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn host(&self) -> &HostState {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostState {
        &mut self.host
    }

    /// Wait up to one poll interval for input, then drain everything queued
    /// so bursts (drags, scrolling) never lag behind the frame rate.
    pub fn pump<O: OutputDriver>(&mut self, stack: &mut WindowStack, output: &mut O) -> io::Result<()> {
        if !self.driver.poll(self.poll_interval)? {
            return Ok(());
        }
        loop {
            let raw = self.driver.read()?;
            for input in self.normalizer.normalize(raw) {
                self.apply(stack, output, input)?;
            }
            if self.host.quit_requested() || !self.driver.poll(Duration::ZERO)? {
                break;
            }
        }
        Ok(())
    }

    fn apply<O: OutputDriver>(
        &mut self,
        stack: &mut WindowStack,
        output: &mut O,
        input: Input,
    ) -> io::Result<()> {
        match input {
            Input::Resize { .. } => {
                let area = output.area()?;
                stack.recreate_surface(area);
            }
            Input::Event(event) => {
                if let Event::KeyPress(key) = &event
                    && self.bindings.matches(Action::Quit, key)
                {
                    tracing::debug!("quit requested");
                    stack.quit();
                    self.host.request_quit();
                    return Ok(());
                }
                stack.dispatch(&event);
            }
        }
        Ok(())
    }

    /// Run one frame.
    pub fn run_frame<O: OutputDriver>(
        &mut self,
        stack: &mut WindowStack,
        output: &mut O,
    ) -> io::Result<ControlFlow> {
        if let Some(enabled) = self.host.take_mouse_capture_change() {
            self.driver.set_mouse_capture(enabled)?;
        }
        if stack.surface().is_none() {
            let area: CellRect = output.area()?;
            stack.attach_renderer(area);
        }

        self.pump(stack, output)?;
        if self.host.quit_requested() || stack.is_empty() {
            return Ok(ControlFlow::Quit);
        }

        stack.tick();
        output.draw(|frame| stack.draw(frame))?;

        if stack.is_empty() {
            return Ok(ControlFlow::Quit);
        }
        Ok(ControlFlow::Continue)
    }

    /// Run frames until the stack is empty or quit is requested, then
    /// release renderer resources.
    pub fn run<O: OutputDriver>(&mut self, stack: &mut WindowStack, output: &mut O) -> io::Result<()> {
        self.run_with(stack, output, |_| {})
    }

    /// Like [`run`](Self::run), calling `between` after every completed
    /// frame. Hosts use it to push windows in response to widget requests.
    pub fn run_with<O, F>(
        &mut self,
        stack: &mut WindowStack,
        output: &mut O,
        mut between: F,
    ) -> io::Result<()>
    where
        O: OutputDriver,
        F: FnMut(&mut WindowStack),
    {
        let result = loop {
            match self.run_frame(stack, output) {
                Ok(ControlFlow::Continue) => between(stack),
                Ok(ControlFlow::Quit) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        stack.detach_renderer();
        result
    }
}
