pub mod overlay;

pub use overlay::*;

use ratatui::prelude::Rect;

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

/// Shrink `(width, height)` to fit inside `area`.
pub fn clamp_size(area: Rect, width: u16, height: u16) -> (u16, u16) {
    (width.min(area.width), height.min(area.height))
}
