//! Runtime configuration for the window stack and frame loop.

use std::time::Duration;

use crate::constants::{
    DARKEN_CURVE, DARKEN_TARGET, DARKEN_TICKS, DEFAULT_TICK_MILLIS, TOOLTIP_DELAY_TICKS,
};
use crate::keybindings::KeyBindings;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time budget of one poll -> tick -> draw -> present frame.
    pub tick_interval: Duration,
    pub darken_ticks: u64,
    pub darken_target: f32,
    pub darken_curve: f32,
    pub tooltip_delay_ticks: u64,
    /// Whether the terminal should report mouse input at all.
    pub mouse_capture: bool,
    pub bindings: KeyBindings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MILLIS),
            darken_ticks: DARKEN_TICKS,
            darken_target: DARKEN_TARGET,
            darken_curve: DARKEN_CURVE,
            tooltip_delay_ticks: TOOLTIP_DELAY_TICKS,
            mouse_capture: true,
            bindings: KeyBindings::default(),
        }
    }
}

impl EngineConfig {
    /// Clamp values that would make the darken fade or frame pacing
    /// degenerate.
    pub fn sanitized(mut self) -> Self {
        self.darken_target = self.darken_target.clamp(0.0, 1.0);
        if !self.darken_curve.is_finite() || self.darken_curve <= 0.0 {
            self.darken_curve = DARKEN_CURVE;
        }
        if self.tick_interval.is_zero() {
            self.tick_interval = Duration::from_millis(1);
        }
        self
    }
}
