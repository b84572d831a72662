use unicode_width::UnicodeWidthChar;

use super::format::{is_control, is_icon};

/// Measures glyphs for layout. Widths are in cells (pixels of the surface).
pub trait TextMetrics {
    fn char_width(&self, c: char) -> i32;

    fn line_height(&self) -> i32 {
        1
    }
}

/// Terminal cell metrics: East Asian wide glyphs take two cells, icons one.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMetrics;

impl TextMetrics for CellMetrics {
    fn char_width(&self, c: char) -> i32 {
        if is_control(c) || c == '\n' {
            return 0;
        }
        if is_icon(c) || c == '\t' {
            return 1;
        }
        c.width().map(|w| w as i32).unwrap_or(0)
    }
}

/// Every glyph is `width` wide; handy for layout tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub width: i32,
    pub line_height: i32,
}

impl TextMetrics for FixedMetrics {
    fn char_width(&self, c: char) -> i32 {
        if is_control(c) || c == '\n' {
            0
        } else {
            self.width
        }
    }

    fn line_height(&self) -> i32 {
        self.line_height.max(1)
    }
}
