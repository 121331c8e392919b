use ratatui::style::{Color, Modifier, Style};

// Centralized theme colors for panels, bubbles and notices.

pub const ACCENT_RGB: (u8, u8, u8) = (184, 134, 11);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Panel chrome
pub fn header_bg(focused: bool) -> Color {
    if focused { accent() } else { Color::DarkGray }
}
pub fn header_fg() -> Color {
    Color::White
}
pub fn border() -> Color {
    Color::DarkGray
}
pub fn close_control() -> Style {
    Style::default()
        .bg(Color::Red)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}
pub fn minimize_control() -> Style {
    Style::default().bg(Color::Gray).fg(Color::Black)
}

// Bubbles
pub fn bubble(minimized: bool) -> Style {
    if minimized {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().bg(accent()).fg(Color::Black)
    }
}

// Page tabs / status line
pub fn tab(active: bool) -> Style {
    if active {
        Style::default()
            .bg(accent())
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}
pub fn status_bar() -> Style {
    Style::default().bg(Color::Black).fg(Color::Gray)
}

// Notices
pub fn error() -> Style {
    Style::default().fg(Color::Red)
}
pub fn info() -> Style {
    Style::default().fg(Color::Green)
}
pub fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}
pub fn selected() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}
