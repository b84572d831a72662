use ratatui::style::Color;

/// Whether the terminal advertises 24-bit colour (`COLORTERM` contains
/// `truecolor` or `24bit`).
pub fn truecolor_supported() -> bool {
    std::env::var("COLORTERM")
        .map(|var| {
            let lv = var.to_lowercase();
            lv.contains("truecolor") || lv.contains("24bit")
        })
        .unwrap_or(false)
}

/// Map an RGB triple to a colour the terminal can show: `Color::Rgb` with
/// truecolor, otherwise the nearest xterm-256 `Color::Indexed`.
pub fn map_rgb_to_color(r: u8, g: u8, b: u8, truecolor: bool) -> Color {
    if truecolor {
        Color::Rgb(r, g, b)
    } else {
        Color::Indexed(rgb_to_xterm_index(r, g, b))
    }
}

const ANSI: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// Approximate RGB value of `color`. `Color::Reset` resolves to `fallback`,
/// the terminal's default for the channel in question.
pub fn to_rgb(color: Color, fallback: (u8, u8, u8)) -> (u8, u8, u8) {
    match color {
        Color::Reset => fallback,
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Indexed(idx) => indexed_to_rgb(idx),
        Color::Black => ANSI[0],
        Color::Red => ANSI[1],
        Color::Green => ANSI[2],
        Color::Yellow => ANSI[3],
        Color::Blue => ANSI[4],
        Color::Magenta => ANSI[5],
        Color::Cyan => ANSI[6],
        Color::Gray => ANSI[7],
        Color::DarkGray => ANSI[8],
        Color::LightRed => ANSI[9],
        Color::LightGreen => ANSI[10],
        Color::LightYellow => ANSI[11],
        Color::LightBlue => ANSI[12],
        Color::LightMagenta => ANSI[13],
        Color::LightCyan => ANSI[14],
        Color::White => ANSI[15],
    }
}

/// Scale every channel of `color` by `factor` (clamped to `0.0..=1.0`).
pub fn scale(color: Color, factor: f32, fallback: (u8, u8, u8), truecolor: bool) -> Color {
    let factor = factor.clamp(0.0, 1.0);
    let (r, g, b) = to_rgb(color, fallback);
    let s = |v: u8| (f32::from(v) * factor).round() as u8;
    map_rgb_to_color(s(r), s(g), s(b), truecolor)
}

fn indexed_to_rgb(idx: u8) -> (u8, u8, u8) {
    match idx {
        0..=15 => ANSI[idx as usize],
        16..=231 => {
            let n = idx - 16;
            from_6cube(n / 36, (n / 6) % 6, n % 6)
        }
        _ => from_gray(idx - 232),
    }
}

fn rgb_to_xterm_index(r: u8, g: u8, b: u8) -> u8 {
    // 6x6x6 cube (16..231)
    let r6 = to_6cube(r);
    let g6 = to_6cube(g);
    let b6 = to_6cube(b);
    let cube_index = 16 + 36 * r6 + 6 * g6 + b6;
    let (cr, cg, cb) = from_6cube(r6, g6, b6);

    // gray ramp (232..255)
    let gray_index = rgb_to_gray_index(r, g, b);
    let (gr, gg, gb) = from_gray(gray_index);

    let dist_cube = color_distance_sq((r, g, b), (cr, cg, cb));
    let dist_gray = color_distance_sq((r, g, b), (gr, gg, gb));
    if dist_gray < dist_cube {
        232 + gray_index
    } else {
        cube_index
    }
}

fn to_6cube(v: u8) -> u8 {
    ((v as u16 * 5 + 127) / 255) as u8
}

fn from_6cube(r6: u8, g6: u8, b6: u8) -> (u8, u8, u8) {
    let conv = |c: u8| match c {
        0 => 0u8,
        1 => 95,
        2 => 135,
        3 => 175,
        4 => 215,
        _ => 255,
    };
    (conv(r6), conv(g6), conv(b6))
}

fn rgb_to_gray_index(r: u8, g: u8, b: u8) -> u8 {
    let avg = (r as u16 + g as u16 + b as u16) / 3;
    ((avg * 23 + 127) / 255) as u8
}

fn from_gray(idx: u8) -> (u8, u8, u8) {
    let v = (8 + idx as u16 * 10).min(255) as u8;
    (v, v, v)
}

fn color_distance_sq(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    (dr * dr + dg * dg + db * db) as u32
}
