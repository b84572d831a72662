//! Formatted text: inline control sequences, glyph metrics and the word
//! wrapper with its wrapped/raw/clear index maps.

pub mod format;
pub mod metrics;
pub mod wrapper;

pub use format::{Align, strip};
pub use metrics::{CellMetrics, FixedMetrics, TextMetrics};
pub use wrapper::{Entry, Index, Line, TextWrapper, WrappedText, wrap};
