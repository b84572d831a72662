//! Word wrapping with index mapping between the wrapped, raw and clear
//! coordinate spaces.
//!
//! A caret position is "before entry `i`" for `i` in `0..=len`. Every entry
//! of the wrapped string knows the raw index it came from (`None` for breaks
//! the wrapper inserted) and its clear index (`None` for escape characters
//! and inserted breaks).

use ratatui::style::Style;

use super::format::{self, Align, Piece};
use super::metrics::{CellMetrics, TextMetrics};
use crate::constants::WORD_BREAK_CHARS;
use crate::geom::{Point, Rect};
use crate::ui::UiFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Index {
    pub wrapped: usize,
    pub raw: usize,
    pub clear: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub ch: char,
    pub raw: Option<usize>,
    pub clear: Option<usize>,
    /// Offset from the start of the line, before alignment.
    pub x: i32,
    pub width: i32,
    pub line: usize,
}

impl Entry {
    /// A newline glyph or an inserted break. Escape arguments may carry a
    /// `'\n'` byte but have no clear index.
    fn is_break(&self) -> bool {
        self.ch == '\n' && (self.clear.is_some() || self.raw.is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// First entry of the line.
    pub start: usize,
    /// One past the last content entry; the break entry (if any) sits here.
    pub end: usize,
    pub width: i32,
    pub align: Align,
    /// Alignment offset within the layout width.
    pub offset: i32,
}

/// Reusable wrapping configuration.
#[derive(Debug, Clone)]
pub struct TextWrapper<M: TextMetrics = CellMetrics> {
    metrics: M,
    max_width: Option<i32>,
}

impl TextWrapper<CellMetrics> {
    pub fn new(max_width: Option<i32>) -> Self {
        Self::with_metrics(CellMetrics, max_width)
    }
}

impl<M: TextMetrics> TextWrapper<M> {
    pub fn with_metrics(metrics: M, max_width: Option<i32>) -> Self {
        Self { metrics, max_width }
    }

    pub fn max_width(&self) -> Option<i32> {
        self.max_width
    }

    pub fn set_max_width(&mut self, max_width: Option<i32>) {
        self.max_width = max_width;
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    pub fn wrap(&self, text: &str) -> WrappedText {
        wrap(text, self.max_width, &self.metrics)
    }
}

/// Result of wrapping one formatted string.
#[derive(Debug, Clone, Default)]
pub struct WrappedText {
    text: String,
    entries: Vec<Entry>,
    lines: Vec<Line>,
    raw_to_wrapped: Vec<usize>,
    clear_to_wrapped: Vec<usize>,
    line_height: i32,
    max_width: Option<i32>,
}

struct Builder<'m> {
    metrics: &'m dyn TextMetrics,
    limit: Option<i32>,
    entries: Vec<Entry>,
    aligns: Vec<Align>,
    /// Alignment escapes seen on the current line, by entry index.
    line_aligns: Vec<(usize, Align)>,
    line: usize,
    x: i32,
    line_start: usize,
    word_start: usize,
    word_x: i32,
}

impl Builder<'_> {
    fn push(&mut self, ch: char, raw: Option<usize>, clear: Option<usize>, width: i32) {
        self.entries.push(Entry {
            ch,
            raw,
            clear,
            x: self.x,
            width,
            line: self.line,
        });
        self.x += width;
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.x = 0;
        self.line_start = self.entries.len();
        self.word_start = self.line_start;
        self.word_x = 0;
        self.aligns.push(Align::Left);
        self.line_aligns.clear();
    }

    fn set_align(&mut self, align: Align) {
        self.line_aligns.push((self.entries.len(), align));
        if let Some(slot) = self.aligns.last_mut() {
            *slot = align;
        }
    }

    /// Terminate the current line with a break entry.
    fn push_break(&mut self, raw: Option<usize>, clear: Option<usize>) {
        self.push('\n', raw, clear, 0);
        self.new_line();
    }

    /// Insert a break in front of the word being built, moving the word to
    /// the next line without rescanning it.
    fn break_before_word(&mut self) {
        let at = self.word_start;
        let shift = self.word_x;
        self.entries.push(Entry {
            ch: '\n',
            raw: None,
            clear: None,
            x: shift,
            width: 0,
            line: self.line,
        });
        self.entries[at..].rotate_right(1);
        let word_width = self.x - shift;
        // Alignment escapes travel with the word they sit in.
        let (stay, moved): (Vec<_>, Vec<_>) =
            self.line_aligns.drain(..).partition(|(i, _)| *i < at);
        if let Some(slot) = self.aligns.last_mut() {
            *slot = stay.last().map_or(Align::Left, |(_, a)| *a);
        }
        self.aligns.push(moved.last().map_or(Align::Left, |(_, a)| *a));
        self.line_aligns = moved.into_iter().map(|(i, a)| (i + 1, a)).collect();
        self.line += 1;
        for entry in &mut self.entries[at + 1..] {
            entry.x -= shift;
            entry.line = self.line;
        }
        self.x = word_width;
        self.line_start = at + 1;
        self.word_start = at + 1;
        self.word_x = 0;
    }

    fn glyph(&mut self, c: char, raw: usize, clear: usize) {
        if c == '\n' {
            self.push_break(Some(raw), Some(clear));
            return;
        }
        let width = self.metrics.char_width(c);
        if let Some(limit) = self.limit
            && self.x + width > limit
            && self.x > 0
        {
            if c == ' ' {
                // The overflowing space becomes the line break itself.
                self.push_break(Some(raw), Some(clear));
                return;
            }
            let word_width = self.x - self.word_x;
            if self.word_start > self.line_start && word_width + width <= limit {
                self.break_before_word();
            } else {
                self.push_break(None, None);
            }
        }
        self.push(c, Some(raw), Some(clear), width);
        if WORD_BREAK_CHARS.contains(&c) {
            self.word_start = self.entries.len();
            self.word_x = self.x;
        }
    }
}

/// Wrap `text` to `max_width` cells. `None` (or a non-positive width)
/// disables wrapping; explicit newlines always break.
pub fn wrap(text: &str, max_width: Option<i32>, metrics: &dyn TextMetrics) -> WrappedText {
    let chars: Vec<char> = text.chars().collect();
    let mut builder = Builder {
        metrics,
        limit: max_width.filter(|w| *w > 0),
        entries: Vec::with_capacity(chars.len() + chars.len() / 8),
        aligns: vec![Align::Left],
        line_aligns: Vec::new(),
        line: 0,
        x: 0,
        line_start: 0,
        word_start: 0,
        word_x: 0,
    };

    let mut clear = 0;
    for scanned in format::scan(&chars) {
        match scanned.piece {
            Piece::Glyph(c) => {
                builder.glyph(c, scanned.raw, clear);
                clear += 1;
            }
            piece => {
                if let Piece::Align(align) = piece {
                    builder.set_align(align);
                }
                for k in 0..scanned.len {
                    builder.push(chars[scanned.raw + k], Some(scanned.raw + k), None, 0);
                }
            }
        }
    }

    WrappedText::finish(builder, chars.len(), clear, max_width)
}

impl WrappedText {
    fn finish(builder: Builder<'_>, raw_len: usize, clear_len: usize, max_width: Option<i32>) -> Self {
        let line_height = builder.metrics.line_height().max(1);
        let entries = builder.entries;
        let line_count = builder.line + 1;

        let mut lines: Vec<Line> = (0..line_count)
            .map(|line| Line {
                start: 0,
                end: 0,
                width: 0,
                align: builder.aligns.get(line).copied().unwrap_or_default(),
                offset: 0,
            })
            .collect();
        let mut next_start = 0;
        for (line_no, line) in lines.iter_mut().enumerate() {
            line.start = next_start;
            let mut end = next_start;
            while end < entries.len() && entries[end].line == line_no && !entries[end].is_break() {
                let e = &entries[end];
                line.width = line.width.max(e.x + e.width);
                end += 1;
            }
            line.end = end;
            next_start = if end < entries.len() && entries[end].is_break() {
                end + 1
            } else {
                end
            };
        }
        let layout_width = max_width
            .filter(|w| *w > 0)
            .unwrap_or_else(|| lines.iter().map(|l| l.width).max().unwrap_or(0));
        for line in &mut lines {
            line.offset = line.align.offset(line.width, layout_width);
        }

        let mut raw_to_wrapped = vec![entries.len(); raw_len + 1];
        let mut clear_to_wrapped = vec![entries.len(); clear_len + 1];
        for (i, e) in entries.iter().enumerate() {
            if let Some(raw) = e.raw {
                raw_to_wrapped[raw] = i;
            }
            if let Some(clear) = e.clear {
                clear_to_wrapped[clear] = i;
            }
        }

        Self {
            text: entries.iter().map(|e| e.ch).collect(),
            entries,
            lines,
            raw_to_wrapped,
            clear_to_wrapped,
            line_height,
            max_width,
        }
    }

    /// The wrapped string: the input with line breaks inserted.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len().max(1)
    }

    pub fn line_height(&self) -> i32 {
        self.line_height.max(1)
    }

    /// Widest line, in cells.
    pub fn width(&self) -> i32 {
        self.lines.iter().map(|l| l.width).max().unwrap_or(0)
    }

    pub fn height(&self) -> i32 {
        self.line_count() as i32 * self.line_height()
    }

    pub fn max_width(&self) -> Option<i32> {
        self.max_width
    }

    pub fn raw_len(&self) -> usize {
        self.raw_to_wrapped.len().saturating_sub(1)
    }

    pub fn clear_len(&self) -> usize {
        self.clear_to_wrapped.len().saturating_sub(1)
    }

    /// Raw index of the caret before wrapped entry `wrapped`. Entries with no
    /// raw index of their own resolve to the next entry that has one.
    pub fn raw_at(&self, wrapped: usize) -> usize {
        self.entries
            .iter()
            .skip(wrapped)
            .find_map(|e| e.raw)
            .unwrap_or(self.raw_len())
    }

    pub fn clear_at(&self, wrapped: usize) -> usize {
        self.entries
            .iter()
            .skip(wrapped)
            .find_map(|e| e.clear)
            .unwrap_or(self.clear_len())
    }

    pub fn index_at(&self, wrapped: usize) -> Index {
        let wrapped = wrapped.min(self.entries.len());
        Index {
            wrapped,
            raw: self.raw_at(wrapped),
            clear: self.clear_at(wrapped),
        }
    }

    pub fn raw_to_index(&self, raw: usize) -> Index {
        let raw = raw.min(self.raw_len());
        let wrapped = self.raw_to_wrapped[raw];
        Index {
            wrapped,
            raw,
            clear: self.clear_at(wrapped),
        }
    }

    pub fn clear_to_index(&self, clear: usize) -> Index {
        let clear = clear.min(self.clear_len());
        let wrapped = self.clear_to_wrapped[clear];
        Index {
            wrapped,
            raw: self.raw_at(wrapped),
            clear,
        }
    }

    /// Caret index for a position relative to the text origin. The caret
    /// lands before the first glyph whose horizontal midpoint lies right of
    /// `point.x`, or at the end of the line.
    pub fn point_to_index(&self, point: Point) -> Index {
        if self.lines.is_empty() {
            return Index::default();
        }
        let line_no = (point.y.div_euclid(self.line_height()))
            .clamp(0, self.lines.len() as i32 - 1) as usize;
        let line = self.lines[line_no];
        let px = point.x - line.offset;
        let hit = (line.start..line.end).find(|&i| {
            let e = &self.entries[i];
            e.width > 0 && 2 * px < 2 * e.x + e.width
        });
        self.index_at(hit.unwrap_or(line.end))
    }

    /// Caret position (relative to the text origin) and line of the caret
    /// before wrapped entry `wrapped`.
    pub fn index_to_point_line(&self, wrapped: usize) -> (Point, usize) {
        let lh = self.line_height();
        let place = |x: i32, line: usize| {
            let offset = self.lines.get(line).map(|l| l.offset).unwrap_or(0);
            (Point::new(x + offset, line as i32 * lh), line)
        };
        if let Some(e) = self.entries.get(wrapped) {
            return place(e.x, e.line);
        }
        match self.entries.last() {
            None => place(0, 0),
            Some(last) if last.is_break() => place(0, last.line + 1),
            Some(last) => place(last.x + last.width, last.line),
        }
    }

    /// Move the caret `delta` lines up (negative) or down, aiming for the
    /// preferred column `desired_x` rather than the current one.
    pub fn caret_vertical(&self, from: Index, delta: isize, desired_x: i32) -> Index {
        let (_, line) = self.index_to_point_line(from.wrapped);
        let last = self.line_count().saturating_sub(1) as isize;
        let target = (line as isize + delta).clamp(0, last);
        self.point_to_index(Point::new(desired_x, target as i32 * self.line_height()))
    }

    /// Start and end caret positions of the line holding `wrapped`.
    pub fn line_bounds(&self, wrapped: usize) -> (Index, Index) {
        let (_, line) = self.index_to_point_line(wrapped);
        match self.lines.get(line) {
            Some(l) => (self.index_at(l.start), self.index_at(l.end)),
            None => (self.index_at(wrapped), self.index_at(wrapped)),
        }
    }

    /// Cell rectangle of entry `i` for text drawn at `origin`.
    pub fn entry_rect(&self, i: usize, origin: Point) -> Option<Rect> {
        let e = self.entries.get(i)?;
        let offset = self.lines.get(e.line).map(|l| l.offset).unwrap_or(0);
        Some(Rect::new(
            origin.x + offset + e.x,
            origin.y + e.line as i32 * self.line_height(),
            e.width,
            self.line_height(),
        ))
    }

    /// Paint the text at `origin`, applying inline colours on top of `base`.
    pub fn draw(&self, frame: &mut UiFrame<'_>, origin: Point, base: Style) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut style = base;
        let mut i = 0;
        for scanned in format::scan(&chars) {
            match scanned.piece {
                Piece::Glyph(c) => {
                    if c != '\n'
                        && let Some(rect) = self.entry_rect(i, origin)
                        && rect.size.width > 0
                    {
                        let mut buf = [0u8; 4];
                        frame.put(rect.pos, c.encode_utf8(&mut buf), style);
                    }
                }
                piece => style = format::apply(piece, style, base),
            }
            i += scanned.len;
        }
    }
}
