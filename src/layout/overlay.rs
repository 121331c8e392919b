//! Placement of the floating windows over the page.
//!
//! The bottom of the area holds one bubble per `Full` window, right aligned
//! and wrapped upward onto extra rows when they do not fit on one. Expanded
//! `Full` panels sit above the bubbles, packed from the right edge. `Simple`
//! panels are packed from the left edge and drawn above the full panels.

use ratatui::prelude::Rect;

use super::{clamp_size, rect_contains};
use crate::window::{MinimizeOverlay, WindowRegistry, full_view, simple_view};

pub const PANEL_WIDTH: u16 = 56;
pub const PANEL_HEIGHT: u16 = 16;
pub const SIMPLE_WIDTH: u16 = 46;
pub const SIMPLE_HEIGHT: u16 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Expanded,
    Simple,
    Bubble { minimized: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub id: String,
    pub title: String,
    pub kind: PlacementKind,
    pub rect: Rect,
}

impl Placement {
    pub fn is_panel(&self) -> bool {
        !matches!(self.kind, PlacementKind::Bubble { .. })
    }

    /// Area inside border and header.
    pub fn content_rect(&self) -> Rect {
        if !self.is_panel() {
            return Rect::default();
        }
        Rect::new(
            self.rect.x.saturating_add(1),
            self.rect.y.saturating_add(2),
            self.rect.width.saturating_sub(2),
            self.rect.height.saturating_sub(3),
        )
    }

    pub fn header_y(&self) -> u16 {
        self.rect.y.saturating_add(1)
    }

    /// The minimize (expanded) or close (simple) button in the header.
    pub fn control_rect(&self) -> Option<Rect> {
        if !self.is_panel() || self.rect.width < 6 {
            return None;
        }
        let right = self.rect.x.saturating_add(self.rect.width).saturating_sub(1);
        Some(Rect::new(right.saturating_sub(3), self.header_y(), 3, 1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayHit {
    ToggleMinimize(String),
    Close(String),
    Focus(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayLayout {
    placements: Vec<Placement>,
}

pub fn bubble_label(title: &str, minimized: bool) -> String {
    let marker = if minimized { '+' } else { '-' };
    format!(" {marker} {title} ")
}

/// Greedy split of bubble widths into rows of at most `width` cells, one
/// cell apart. Row 0 is the bottom row.
fn bubble_rows(widths: &[u16], width: u16) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut used = 0u16;
    for (index, &w) in widths.iter().enumerate() {
        let fits = used.saturating_add(1).saturating_add(w) <= width;
        if let Some(row) = rows.last_mut().filter(|_| fits) {
            row.push(index);
            used += 1 + w;
        } else {
            rows.push(vec![index]);
            used = w;
        }
    }
    rows
}

impl OverlayLayout {
    pub fn compute<T>(area: Rect, registry: &WindowRegistry<T>, overlay: &MinimizeOverlay) -> Self {
        let mut placements = Vec::new();
        if area.width == 0 || area.height < 2 {
            return Self { placements };
        }
        let right = area.x.saturating_add(area.width);
        let full = full_view(registry, overlay.minimized());

        let widths: Vec<u16> = full
            .iter()
            .map(|p| {
                let len = bubble_label(p.window.title(), p.minimized).chars().count();
                (len as u16).min(area.width)
            })
            .collect();
        let rows = bubble_rows(&widths, area.width);
        // Keep at least one row for panels.
        let row_count = (rows.len() as u16).clamp(1, area.height - 1);
        let bubble_top = area.y.saturating_add(area.height - row_count);
        let panel_area = Rect::new(area.x, area.y, area.width, area.height - row_count);

        let (width, height) = clamp_size(panel_area, PANEL_WIDTH, PANEL_HEIGHT);
        let per_row = (panel_area.width / width.max(1)).max(1) as usize;
        for (index, panel) in full.iter().filter(|p| p.expanded()).enumerate() {
            let slot = (index % per_row) as u16 + 1;
            let layer = (index / per_row) as u16;
            let x = right.saturating_sub(width.saturating_mul(slot)).max(area.x);
            let y = bubble_top
                .saturating_sub(height)
                .saturating_sub(layer)
                .max(area.y);
            placements.push(Placement {
                id: panel.window.id().to_string(),
                title: panel.window.title().to_string(),
                kind: PlacementKind::Expanded,
                rect: Rect::new(x, y, width, height),
            });
        }

        let (width, height) = clamp_size(panel_area, SIMPLE_WIDTH, SIMPLE_HEIGHT);
        let per_row = (panel_area.width / width.max(1)).max(1) as usize;
        for (index, window) in simple_view(registry).into_iter().enumerate() {
            let slot = (index % per_row) as u16;
            let layer = (index / per_row) as u16;
            let x = area.x.saturating_add(width.saturating_mul(slot));
            let y = bubble_top
                .saturating_sub(height)
                .saturating_sub(layer)
                .max(area.y);
            placements.push(Placement {
                id: window.id().to_string(),
                title: window.title().to_string(),
                kind: PlacementKind::Simple,
                rect: Rect::new(x, y, width, height),
            });
        }

        let bottom = area.y.saturating_add(area.height - 1);
        for (row, members) in rows.iter().take(row_count as usize).enumerate() {
            let y = bottom - row as u16;
            let total: u16 = members.iter().map(|&i| widths[i]).sum::<u16>()
                + (members.len() as u16).saturating_sub(1);
            let mut x = right.saturating_sub(total).max(area.x);
            for &index in members {
                let panel = &full[index];
                placements.push(Placement {
                    id: panel.window.id().to_string(),
                    title: panel.window.title().to_string(),
                    kind: PlacementKind::Bubble {
                        minimized: panel.minimized,
                    },
                    rect: Rect::new(x, y, widths[index], 1),
                });
                x = x.saturating_add(widths[index] + 1);
            }
        }

        Self { placements }
    }

    /// Placements in draw order (later entries are on top).
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn panel(&self, id: &str) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.is_panel() && p.id == id)
    }

    /// Panel ids in draw order.
    pub fn panel_ids(&self) -> Vec<String> {
        self.placements
            .iter()
            .filter(|p| p.is_panel())
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<OverlayHit> {
        let top = self
            .placements
            .iter()
            .rev()
            .find(|p| rect_contains(p.rect, column, row))?;
        let on_control = top
            .control_rect()
            .is_some_and(|r| rect_contains(r, column, row));
        Some(match top.kind {
            PlacementKind::Bubble { .. } => OverlayHit::ToggleMinimize(top.id.clone()),
            PlacementKind::Expanded if on_control => OverlayHit::ToggleMinimize(top.id.clone()),
            PlacementKind::Simple if on_control => OverlayHit::Close(top.id.clone()),
            _ => OverlayHit::Focus(top.id.clone()),
        })
    }
}
