use std::io;

use crate::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::EventLoop;
use crate::tracing_sub::{self, LogBuffer};
use crate::window::WindowStack;

/// Run `stack` on the process terminal until it empties or quit is pressed.
///
/// Log output is buffered while the alternate screen is active and returned
/// so the caller can print it once the terminal is restored.
pub fn run_console(stack: &mut WindowStack) -> io::Result<LogBuffer> {
    run_console_with(stack, |_| {})
}

/// [`run_console`] with a hook called between frames.
pub fn run_console_with<F>(stack: &mut WindowStack, between: F) -> io::Result<LogBuffer>
where
    F: FnMut(&mut WindowStack),
{
    let logs = tracing_sub::install_log_buffer(tracing_sub::DEFAULT_MAX_LINES);
    let mut output = ConsoleOutputDriver::new()?;
    let input = ConsoleInputDriver::new();
    run_with_hook(stack, input, &mut output, between)?;
    Ok(logs)
}

/// Enter `output`, run the frame loop over `input`, and always leave the
/// terminal restored.
pub fn run_with<I, O>(stack: &mut WindowStack, input: I, output: &mut O) -> io::Result<()>
where
    I: InputDriver,
    O: OutputDriver,
{
    run_with_hook(stack, input, output, |_| {})
}

pub fn run_with_hook<I, O, F>(
    stack: &mut WindowStack,
    input: I,
    output: &mut O,
    between: F,
) -> io::Result<()>
where
    I: InputDriver,
    O: OutputDriver,
    F: FnMut(&mut WindowStack),
{
    output.enter()?;
    tracing::debug!(windows = stack.len(), "frame loop starting");
    let mut event_loop = EventLoop::new(input, stack.config());
    let result = event_loop.run_with(stack, output, between);
    let restored = output.exit();
    tracing::debug!(ok = result.is_ok(), "frame loop finished");
    result.and(restored)
}
