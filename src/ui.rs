//! `UiFrame`: the drawing surface handed to components.
//!
//! Floating panels are placed by the overlay layout and may end up partly
//! outside the terminal when it is small. `UiFrame` clips every draw call to
//! the visible area so panes can render without bounds checks of their own.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{StatefulWidget, Widget};

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Build a frame over a bare buffer (tests and offscreen rendering).
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
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

    /// Write one line of text at `(x, y)`, truncated to the frame.
    pub fn set_line(&mut self, x: u16, y: u16, text: &str, style: Style) {
        let bounds = self.area.intersection(self.buffer.area);
        safe_set_string(self.buffer, bounds, x, y, text, style);
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    if available == 0 {
        return;
    }
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

/// Read back one buffer row as text; handy for render assertions.
pub fn row_text(buffer: &Buffer, y: u16) -> String {
    let area = buffer.area;
    (area.x..area.x.saturating_add(area.width))
        .filter_map(|x| buffer.cell((x, y)).map(|c| c.symbol().to_string()))
        .collect()
}

/// Whole buffer as newline-separated rows.
pub fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    (area.y..area.y.saturating_add(area.height))
        .map(|y| row_text(buffer, y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    #[test]
    fn truncate_to_width_keeps_short_values() {
        assert_eq!(truncate_to_width("101", 8), "101");
        assert_eq!(truncate_to_width("Penthouse", 4), "Pent");
    }

    #[test]
    fn set_line_clips_at_right_edge() {
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        frame.set_line(2, 0, "Reserve", Style::default());
        frame.set_line(50, 0, "ignored", Style::default());
        assert_eq!(row_text(&buf, 0), "  Rese");
    }

    #[test]
    fn render_widget_outside_frame_is_dropped() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        frame.render_widget(Paragraph::new("xx"), Rect::new(10, 10, 2, 1));
        frame.render_widget(Paragraph::new("abcdef"), Rect::new(2, 1, 6, 1));
        assert_eq!(buffer_text(&buf), "    \n  ab");
    }
}
