//! Inline control sequences understood by the text engine.
//!
//! Formatted strings carry their styling inline:
//!
//! | sequence                 | meaning                               |
//! |--------------------------|---------------------------------------|
//! | `\u{0F}` + 3 chars       | foreground colour, one char per R/G/B |
//! | `\u{0E}`                 | reset to the base colour              |
//! | `\u{08}` + letter        | named colour (see [`named_color`])    |
//! | `\u{01}` + `l`/`c`/`r`   | alignment of the current line         |
//!
//! Characters in the Unicode private-use area are literal icon glyphs.
//! Raw indices count every `char` of the formatted string; clear indices
//! count only the characters that survive [`strip`].

use ratatui::style::{Color, Style};
use ratatui::text::Span;

pub const COLOR: char = '\u{0F}';
pub const RESET: char = '\u{0E}';
pub const NAMED: char = '\u{08}';
pub const ALIGN: char = '\u{01}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn from_letter(c: char) -> Option<Align> {
        match c {
            'l' => Some(Align::Left),
            'c' => Some(Align::Center),
            'r' => Some(Align::Right),
            _ => None,
        }
    }

    fn letter(self) -> char {
        match self {
            Align::Left => 'l',
            Align::Center => 'c',
            Align::Right => 'r',
        }
    }

    /// Horizontal offset of a line `width` wide inside `available` cells.
    pub fn offset(self, width: i32, available: i32) -> i32 {
        let slack = (available - width).max(0);
        match self {
            Align::Left => 0,
            Align::Center => slack / 2,
            Align::Right => slack,
        }
    }
}

/// One lexical unit of a formatted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Glyph(char),
    Color(Color),
    Reset,
    Align(Align),
    /// Malformed or unknown sequence; occupies raw indices, has no effect.
    Unknown,
}

/// A piece and the raw range it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scanned {
    pub raw: usize,
    pub len: usize,
    pub piece: Piece,
}

impl Scanned {
    pub fn is_escape(&self) -> bool {
        !matches!(self.piece, Piece::Glyph(_))
    }
}

pub fn is_icon(c: char) -> bool {
    ('\u{E000}'..='\u{F8FF}').contains(&c)
}

pub fn is_control(c: char) -> bool {
    matches!(c, COLOR | RESET | NAMED | ALIGN)
}

pub fn named_color(letter: char) -> Option<Color> {
    let color = match letter {
        'k' => Color::Black,
        'r' => Color::Red,
        'g' => Color::Green,
        'y' => Color::Yellow,
        'b' => Color::Blue,
        'm' => Color::Magenta,
        'c' => Color::Cyan,
        'a' => Color::Gray,
        'd' => Color::DarkGray,
        'R' => Color::LightRed,
        'G' => Color::LightGreen,
        'Y' => Color::LightYellow,
        'B' => Color::LightBlue,
        'M' => Color::LightMagenta,
        'C' => Color::LightCyan,
        'w' | 'W' => Color::White,
        _ => return None,
    };
    Some(color)
}

fn channel(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(u8::MAX)
}

/// Split `chars` into glyphs and escape sequences.
///
/// A truncated sequence at the end of the input swallows what is left and
/// yields nothing; an unknown named colour or alignment letter is dropped
/// together with its introducer.
pub fn scan(chars: &[char]) -> Vec<Scanned> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let rest = &chars[i..];
        let (len, piece) = match rest[0] {
            COLOR => match rest.get(1..4) {
                Some(rgb) => (
                    4,
                    Some(Piece::Color(Color::Rgb(
                        channel(rgb[0]),
                        channel(rgb[1]),
                        channel(rgb[2]),
                    ))),
                ),
                None => (rest.len(), None),
            },
            RESET => (1, Some(Piece::Reset)),
            NAMED => match rest.get(1) {
                Some(&letter) => (2, named_color(letter).map(Piece::Color)),
                None => (1, None),
            },
            ALIGN => match rest.get(1) {
                Some(&letter) => (2, Align::from_letter(letter).map(Piece::Align)),
                None => (1, None),
            },
            c => (1, Some(Piece::Glyph(c))),
        };
        out.push(Scanned {
            raw: i,
            len,
            piece: piece.unwrap_or(Piece::Unknown),
        });
        i += len;
    }
    out
}

/// The clear (semantic) text: every escape sequence removed.
pub fn strip(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    scan(&chars)
        .into_iter()
        .filter_map(|s| match s.piece {
            Piece::Glyph(c) => Some(c),
            _ => None,
        })
        .collect()
}

pub fn rgb(r: u8, g: u8, b: u8) -> String {
    [COLOR, char::from(r), char::from(g), char::from(b)]
        .into_iter()
        .collect()
}

pub fn named(letter: char) -> String {
    [NAMED, letter].into_iter().collect()
}

pub fn reset() -> String {
    RESET.to_string()
}

pub fn align(align: Align) -> String {
    [ALIGN, align.letter()].into_iter().collect()
}

/// Apply a colour piece to `style`, relative to the unformatted `base`.
pub fn apply(piece: Piece, style: Style, base: Style) -> Style {
    match piece {
        Piece::Color(color) => style.fg(color),
        Piece::Reset => base,
        Piece::Glyph(_) | Piece::Align(_) | Piece::Unknown => style,
    }
}

/// Convert one formatted line into styled spans and its alignment hint.
/// Newlines are not expected; callers split lines first.
pub fn spans(line: &str, base: Style) -> (Vec<Span<'static>>, Align) {
    let chars: Vec<char> = line.chars().collect();
    let mut out = Vec::new();
    let mut style = base;
    let mut current = String::new();
    let mut alignment = Align::Left;
    for scanned in scan(&chars) {
        match scanned.piece {
            Piece::Glyph(c) => current.push(c),
            Piece::Align(a) => alignment = a,
            Piece::Unknown => {}
            piece => {
                if !current.is_empty() {
                    out.push(Span::styled(std::mem::take(&mut current), style));
                }
                style = apply(piece, style, base);
            }
        }
    }
    if !current.is_empty() {
        out.push(Span::styled(current, style));
    }
    (out, alignment)
}
