//! UiFrame: the immediate-mode draw surface components paint into.
//!
//! Wraps a `ratatui` buffer and clamps every draw call to the intersection
//! of the visible area and the current clip scope, so components can compute
//! rectangles that drift outside the buffer without guarding each call.
//!
//! The same type powers off-screen rendering: a detached `Buffer` stands in
//! for a texture (window backdrops are rendered that way and later blitted
//! back with `blit`).
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect as CellRect;
use ratatui::style::Style;
use ratatui::widgets::{StatefulWidget, Widget};
use ratatui::{Frame, text::Span};
use unicode_width::UnicodeWidthChar;

use crate::geom::{Point, Rect};

pub struct UiFrame<'a> {
    area: CellRect,
    buffer: &'a mut Buffer,
    clips: Vec<CellRect>,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self::from_parts(area, buffer)
    }

    /// Construct a `UiFrame` directly from an area and buffer.
    ///
    /// This powers off-screen rendering paths (backdrop snapshots) and tests.
    pub fn from_parts(area: CellRect, buffer: &'a mut Buffer) -> Self {
        let area = area.intersection(buffer.area);
        Self {
            area,
            buffer,
            clips: Vec::new(),
        }
    }

    pub fn area(&self) -> CellRect {
        self.area
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_cells(self.area)
    }

    pub fn buffer(&self) -> &Buffer {
        self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    /// Effective clip: the innermost clip scope, or the whole frame.
    pub fn clip(&self) -> CellRect {
        self.clips.last().copied().unwrap_or(self.area)
    }

    /// Narrow drawing to `rect` (intersected with the current clip) until
    /// the matching `pop_clip`.
    pub fn push_clip(&mut self, rect: Rect) {
        let next = rect.to_cells().intersection(self.clip());
        self.clips.push(next);
    }

    pub fn pop_clip(&mut self) {
        self.clips.pop();
    }

    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    pub fn with_clip<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_clip(rect);
        let result = f(self);
        self.pop_clip();
        result
    }

    fn clip_rect(&self, rect: Rect) -> Option<CellRect> {
        let clipped = rect.to_cells().intersection(self.clip());
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    fn cell_in_clip(&mut self, point: Point) -> Option<&mut Cell> {
        let clip = Rect::from_cells(self.clip());
        if !clip.contains(point) {
            return None;
        }
        self.buffer.cell_mut((point.x as u16, point.y as u16))
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    pub fn render_stateful_widget<W>(&mut self, widget: W, area: Rect, state: &mut W::State)
    where
        W: StatefulWidget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer, state);
        }
    }

    /// Blank every cell in `rect` and paint it with `style`.
    pub fn fill_rect(&mut self, rect: Rect, style: Style) {
        self.for_each_cell(rect, |cell| {
            cell.reset();
            cell.set_symbol(" ");
            cell.set_style(style);
        });
    }

    /// Draw a single-line box along the inside edge of `rect`.
    pub fn outline_rect(&mut self, rect: Rect, style: Style) {
        if rect.is_empty() {
            return;
        }
        let (l, t) = (rect.left(), rect.top());
        let (r, b) = (rect.right() - 1, rect.bottom() - 1);
        self.line(Point::new(l, t), Point::new(r, t), "─", style);
        self.line(Point::new(l, b), Point::new(r, b), "─", style);
        self.line(Point::new(l, t), Point::new(l, b), "│", style);
        self.line(Point::new(r, t), Point::new(r, b), "│", style);
        if rect.size.width > 1 && rect.size.height > 1 {
            self.put(Point::new(l, t), "┌", style);
            self.put(Point::new(r, t), "┐", style);
            self.put(Point::new(l, b), "└", style);
            self.put(Point::new(r, b), "┘", style);
        }
    }

    /// Bresenham line from `from` to `to`, inclusive of both ends.
    pub fn line(&mut self, from: Point, to: Point, symbol: &str, style: Style) {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        let mut p = from;
        loop {
            self.put(p, symbol, style);
            if p == to {
                break;
            }
            let e2 = err * 2;
            if e2 >= dy {
                err += dy;
                p.x += sx;
            }
            if e2 <= dx {
                err += dx;
                p.y += sy;
            }
        }
    }

    /// Write one symbol at `point` if it falls inside the clip.
    pub fn put(&mut self, point: Point, symbol: &str, style: Style) {
        if let Some(cell) = self.cell_in_clip(point) {
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
    }

    /// Draw a run of text starting at `origin`; returns the advance in cells.
    ///
    /// Characters are placed one by one so a run that starts left of the
    /// clip still shows its visible tail.
    pub fn text_run(&mut self, origin: Point, text: &str, style: Style) -> i32 {
        let mut x = origin.x;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            let symbol: &str = ch.encode_utf8(&mut buf);
            self.put(Point::new(x, origin.y), symbol, style);
            x += width;
        }
        x - origin.x
    }

    /// Draw styled spans left to right; returns the total advance.
    pub fn spans(&mut self, origin: Point, spans: &[Span<'_>]) -> i32 {
        let mut x = origin.x;
        for span in spans {
            x += self.text_run(Point::new(x, origin.y), &span.content, span.style);
        }
        x - origin.x
    }

    /// Copy `src` (a detached "texture") so that its top-left lands at
    /// `dest`, honouring the clip.
    pub fn blit(&mut self, src: &Buffer, dest: Point) {
        let src_area = src.area;
        for sy in 0..src_area.height {
            for sx in 0..src_area.width {
                let target = Point::new(dest.x + i32::from(sx), dest.y + i32::from(sy));
                let Some(src_cell) = src.cell((src_area.x + sx, src_area.y + sy)) else {
                    continue;
                };
                let src_cell = src_cell.clone();
                if let Some(dst_cell) = self.cell_in_clip(target) {
                    *dst_cell = src_cell;
                }
            }
        }
    }

    /// Apply `f` to every cell of `rect` inside the clip.
    pub fn for_each_cell(&mut self, rect: Rect, mut f: impl FnMut(&mut Cell)) {
        let Some(clipped) = self.clip_rect(rect) else {
            return;
        };
        for y in clipped.y..clipped.y.saturating_add(clipped.height) {
            for x in clipped.x..clipped.x.saturating_add(clipped.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    f(cell);
                }
            }
        }
    }
}

/// Allocate an off-screen buffer the size of `area`.
pub fn offscreen(area: CellRect) -> Buffer {
    Buffer::empty(area)
}
