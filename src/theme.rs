use ratatui::style::{Color, Modifier, Style};

// Centralized palette for the bundled widgets. RGB accents are mapped
// through `crate::colors` so they degrade on 256-colour terminals.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);
pub const ACCENT_ALT_RGB: (u8, u8, u8) = (255, 165, 0);

/// RGB the terminal's default foreground is assumed to have when darkening.
pub const DEFAULT_FG_RGB: (u8, u8, u8) = (229, 229, 229);
/// RGB the terminal's default background is assumed to have when darkening.
pub const DEFAULT_BG_RGB: (u8, u8, u8) = (0, 0, 0);

pub fn rgb_to_color(rgb: (u8, u8, u8)) -> Color {
    crate::colors::map_rgb_to_color(rgb.0, rgb.1, rgb.2, crate::colors::truecolor_supported())
}

pub fn accent() -> Color {
    rgb_to_color(ACCENT_RGB)
}

pub fn accent_alt() -> Color {
    rgb_to_color(ACCENT_ALT_RGB)
}

// Panel
pub fn panel_border() -> Style {
    Style::default().fg(Color::DarkGray)
}
pub fn panel_border_focused() -> Style {
    Style::default().fg(accent())
}
pub fn panel_bg() -> Style {
    Style::default().bg(Color::Black).fg(Color::White)
}

// Button
pub fn button() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}
pub fn button_hover() -> Style {
    Style::default().bg(Color::Gray).fg(Color::Black)
}
pub fn button_pressed() -> Style {
    Style::default()
        .bg(accent())
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}
pub fn button_disabled() -> Style {
    Style::default().bg(Color::Black).fg(Color::DarkGray)
}

// Text field
pub fn field() -> Style {
    Style::default().bg(Color::Black).fg(Color::White)
}
pub fn field_selection() -> Style {
    Style::default().bg(Color::Blue).fg(Color::White)
}
pub fn caret() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

// Dialog
pub fn dialog() -> Style {
    Style::default().bg(Color::Black).fg(Color::White)
}
pub fn dialog_separator() -> Style {
    Style::default().fg(Color::DarkGray)
}

// Tooltip
pub fn tooltip() -> Style {
    Style::default().bg(Color::Yellow).fg(Color::Black)
}
pub fn tooltip_border() -> Style {
    Style::default().bg(Color::Yellow).fg(Color::DarkGray)
}
