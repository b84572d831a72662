//! Backdrop snapshots and the darken overlay composited over them.

use ratatui::buffer::{Buffer, Cell};

use crate::colors;
use crate::geom::{Point, Rect};
use crate::theme::{DEFAULT_BG_RGB, DEFAULT_FG_RGB};
use crate::ui::UiFrame;

/// Opacity of the darken overlay `elapsed` ticks after a push.
///
/// Eases out exponentially from 0 to `target` over `duration` ticks, then
/// holds. `curve` controls how front-loaded the fade is.
pub fn darken_alpha(elapsed: u64, duration: u64, target: f32, curve: f32) -> f32 {
    let target = target.clamp(0.0, 1.0);
    if duration == 0 || elapsed >= duration {
        return target;
    }
    let t = elapsed as f32 / duration as f32;
    if curve <= f32::EPSILON {
        return target * t;
    }
    let eased = (1.0 - (-curve * t).exp()) / (1.0 - (-curve).exp());
    target * eased.clamp(0.0, 1.0)
}

/// Darken one cell by `alpha` (0 = untouched, 1 = black).
pub fn darken_cell(cell: &mut Cell, alpha: f32, truecolor: bool) {
    if alpha <= 0.0 {
        return;
    }
    let keep = 1.0 - alpha.clamp(0.0, 1.0);
    cell.fg = colors::scale(cell.fg, keep, DEFAULT_FG_RGB, truecolor);
    cell.bg = colors::scale(cell.bg, keep, DEFAULT_BG_RGB, truecolor);
}

/// Blit `backdrop` at its own origin and darken it by `alpha`.
pub fn composite(frame: &mut UiFrame<'_>, backdrop: &Buffer, alpha: f32, truecolor: bool) {
    let area = backdrop.area;
    frame.blit(backdrop, Point::new(i32::from(area.x), i32::from(area.y)));
    frame.for_each_cell(Rect::from_cells(area), |cell| {
        darken_cell(cell, alpha, truecolor)
    });
}
