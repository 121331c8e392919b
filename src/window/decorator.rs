use ratatui::style::{Modifier, Style};

use crate::layout::{Placement, PlacementKind, bubble_label};
use crate::theme;
use crate::ui::UiFrame;

/// Draws window chrome for overlay placements: border, header with title
/// and a control button, and the bubbles along the bottom row.
pub trait WindowDecorator: std::fmt::Debug {
    fn render_panel(&self, frame: &mut UiFrame<'_>, placement: &Placement, focused: bool);

    fn render_bubble(&self, frame: &mut UiFrame<'_>, placement: &Placement, focused: bool);

    fn render(&self, frame: &mut UiFrame<'_>, placement: &Placement, focused: bool) {
        match placement.kind {
            PlacementKind::Bubble { .. } => self.render_bubble(frame, placement, focused),
            _ => self.render_panel(frame, placement, focused),
        }
    }
}

#[derive(Debug, Default)]
pub struct DeskDecorator;

impl WindowDecorator for DeskDecorator {
    fn render_panel(&self, frame: &mut UiFrame<'_>, placement: &Placement, focused: bool) {
        let rect = placement.rect;
        if rect.width < 2 || rect.height < 3 {
            return;
        }
        let bounds = frame.area();
        let buffer = frame.buffer_mut();
        let bounds = bounds.intersection(buffer.area);
        let visible = |x: u16, y: u16| {
            x >= bounds.x
                && x < bounds.x.saturating_add(bounds.width)
                && y >= bounds.y
                && y < bounds.y.saturating_add(bounds.height)
        };

        let header_style = Style::default()
            .bg(theme::header_bg(focused))
            .fg(theme::header_fg())
            .add_modifier(if focused {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let border_style = Style::default().fg(theme::border());

        let outer_left = rect.x;
        let outer_top = rect.y;
        let outer_right = rect.x.saturating_add(rect.width).saturating_sub(1);
        let outer_bottom = rect.y.saturating_add(rect.height).saturating_sub(1);
        let header_y = placement.header_y();

        // Body is cleared so the page underneath does not bleed through.
        for y in header_y..outer_bottom {
            for x in outer_left.saturating_add(1)..outer_right {
                if visible(x, y)
                    && let Some(cell) = buffer.cell_mut((x, y))
                {
                    cell.reset();
                    cell.set_symbol(" ");
                    if y == header_y {
                        cell.set_style(header_style);
                    }
                }
            }
        }

        // Title, left aligned after one column of padding.
        let title_room = rect.width.saturating_sub(7) as usize;
        let title: String = placement.title.chars().take(title_room).collect();
        for (idx, ch) in title.chars().enumerate() {
            let x = outer_left + 2 + idx as u16;
            if visible(x, header_y)
                && let Some(cell) = buffer.cell_mut((x, header_y))
            {
                cell.set_symbol(&ch.to_string());
                cell.set_style(header_style);
            }
        }

        if let Some(control) = placement.control_rect() {
            let (glyph, style) = match placement.kind {
                PlacementKind::Simple => ("✖", theme::close_control()),
                _ => ("–", theme::minimize_control()),
            };
            for x in control.x..control.x.saturating_add(control.width) {
                if visible(x, control.y)
                    && let Some(cell) = buffer.cell_mut((x, control.y))
                {
                    let symbol = if x == control.x + 1 { glyph } else { " " };
                    cell.set_symbol(symbol);
                    cell.set_style(style);
                }
            }
        }

        // Borders
        for x in outer_left..=outer_right {
            for (y, left, right) in [(outer_top, "┌", "┐"), (outer_bottom, "└", "┘")] {
                if visible(x, y)
                    && let Some(cell) = buffer.cell_mut((x, y))
                {
                    let symbol = if x == outer_left {
                        left
                    } else if x == outer_right {
                        right
                    } else {
                        "─"
                    };
                    cell.set_symbol(symbol);
                    cell.set_style(border_style);
                }
            }
        }
        for y in outer_top.saturating_add(1)..outer_bottom {
            for x in [outer_left, outer_right] {
                if visible(x, y)
                    && let Some(cell) = buffer.cell_mut((x, y))
                {
                    cell.set_symbol("│");
                    cell.set_style(border_style);
                }
            }
        }
    }

    fn render_bubble(&self, frame: &mut UiFrame<'_>, placement: &Placement, focused: bool) {
        let minimized = matches!(placement.kind, PlacementKind::Bubble { minimized: true });
        let mut style = theme::bubble(minimized);
        if focused {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        let label = bubble_label(&placement.title, minimized);
        let shown: String = label
            .chars()
            .take(placement.rect.width as usize)
            .collect();
        frame.set_line(placement.rect.x, placement.rect.y, &shown, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{buffer_text, row_text};
    use ratatui::buffer::Buffer;
    use ratatui::prelude::Rect;

    fn draw(placement: &Placement, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buffer);
            DeskDecorator.render(&mut frame, placement, true);
        }
        buffer
    }

    #[test]
    fn expanded_panel_has_title_and_minimize_control() {
        let placement = Placement {
            id: "services".into(),
            title: "My Services".into(),
            kind: PlacementKind::Expanded,
            rect: Rect::new(0, 0, 20, 4),
        };
        let buffer = draw(&placement, 20, 4);
        assert_eq!(
            buffer_text(&buffer),
            "┌──────────────────┐\n│ My Services    – │\n│                  │\n└──────────────────┘"
        );
    }

    #[test]
    fn simple_panel_gets_close_control() {
        let placement = Placement {
            id: "reservation-1".into(),
            title: "Reserve 101 - Single".into(),
            kind: PlacementKind::Simple,
            rect: Rect::new(0, 0, 16, 3),
        };
        let buffer = draw(&placement, 16, 3);
        assert_eq!(row_text(&buffer, 1), "│ Reserve 1  ✖ │");
    }

    #[test]
    fn bubble_shows_state_marker() {
        let placement = Placement {
            id: "contact".into(),
            title: "Contact Us".into(),
            kind: PlacementKind::Bubble { minimized: true },
            rect: Rect::new(2, 0, 14, 1),
        };
        let buffer = draw(&placement, 16, 1);
        assert_eq!(row_text(&buffer, 0), "   + Contact Us ");
    }

    #[test]
    fn offscreen_parts_are_clipped() {
        let placement = Placement {
            id: "contact".into(),
            title: "Contact Us".into(),
            kind: PlacementKind::Expanded,
            rect: Rect::new(10, 1, 20, 6),
        };
        let buffer = draw(&placement, 12, 3);
        assert_eq!(row_text(&buffer, 1), "          ┌─");
        assert_eq!(row_text(&buffer, 2), "          │ ");
    }
}
