//! Shared crate-wide constants.

/// Number of ticks the backdrop darken overlay takes to reach its target
/// opacity after a window is pushed.
pub const DARKEN_TICKS: u64 = 20;

/// Final opacity of the darken overlay, in `0.0..=1.0`.
///
/// 0.5 halves every backdrop colour channel once the fade has settled.
pub const DARKEN_TARGET: f32 = 0.5;

/// Steepness of the ease-out exponential used for the darken fade. Larger
/// values front-load more of the fade into the first few ticks.
pub const DARKEN_CURVE: f32 = 6.0;

/// Ticks the pointer must rest on a component before its tooltip shows.
pub const TOOLTIP_DELAY_TICKS: u64 = 12;

/// Widest a tooltip box may grow before its text wraps, in cells.
pub const TOOLTIP_MAX_WIDTH: i32 = 40;

/// Frame pacing used when nothing else is configured (~60 fps).
pub const DEFAULT_TICK_MILLIS: u64 = 16;

/// Characters that terminate a word for the text wrapper.
pub const WORD_BREAK_CHARS: &[char] = &[' ', '.', ',', '!', '?', ':', ';', '-'];
