//! Tracing subscriber setup.
//!
//! While the UI owns the terminal, log output is kept in an in-memory ring
//! buffer instead of being written over the screen; without a buffer it goes
//! to stderr.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;

pub const DEFAULT_MAX_LINES: usize = 2000;

static GLOBAL_LOG: OnceLock<LogBuffer> = OnceLock::new();

#[derive(Debug)]
struct Ring {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl Ring {
    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

/// Shared ring of log lines. Cloning shares the ring.
#[derive(Clone, Debug)]
pub struct LogBuffer {
    inner: Arc<Mutex<Ring>>,
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ring {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut ring) = self.inner.lock() {
            ring.push_line(line.into());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|r| r.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|r| r.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove and return every buffered line.
    pub fn drain(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|mut r| r.lines.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter {
            buffer: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// Splits written bytes into lines and pushes complete ones into the ring.
#[derive(Debug)]
pub struct LogWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl LogWriter {
    fn flush_pending(&mut self, force: bool) {
        let end = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n').filter(|l| !l.is_empty()) {
            self.buffer.push(line);
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

/// Install the process-wide log buffer. Returns the installed buffer (the
/// existing one if a buffer was already installed).
pub fn install_log_buffer(max_lines: usize) -> LogBuffer {
    GLOBAL_LOG.get_or_init(|| LogBuffer::new(max_lines)).clone()
}

pub fn global_log_buffer() -> Option<LogBuffer> {
    GLOBAL_LOG.get().cloned()
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    Buffer(LogWriter),
    Stderr(io::Stderr),
}

impl DelegatingWriter {
    fn new() -> Self {
        let inner = match GLOBAL_LOG.get() {
            Some(buffer) => DelegatingInner::Buffer(buffer.writer()),
            None => DelegatingInner::Stderr(io::stderr()),
        };
        Self { inner }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::Buffer(w) => w.write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::Buffer(w) => w.flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SubscriberMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new()
    }
}

/// Install a compact fmt subscriber at `level`. Later calls are no-ops.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(SubscriberMakeWriter)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
}

pub fn init_default() {
    init(Level::DEBUG);
}
