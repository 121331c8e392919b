use crossterm::event::{Event, KeyCode, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::{List, ListItem, ListState};

use crate::components::{Component, ComponentContext, key_press};
use crate::theme;
use crate::ui::UiFrame;

const PAGE: isize = 5;

/// Scrollable single-selection list of preformatted rows.
#[derive(Debug, Default)]
pub struct ListComponent {
    items: Vec<String>,
    selected: usize,
    offset: usize,
    empty_text: String,
}

impl ListComponent {
    pub fn new(empty_text: impl Into<String>) -> Self {
        Self {
            empty_text: empty_text.into(),
            ..Self::default()
        }
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Selected index, or `None` when the list is empty.
    pub fn selection(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.selected)
    }

    pub fn set_selected(&mut self, selected: usize) {
        self.selected = selected.min(self.items.len().saturating_sub(1));
    }

    pub fn scroll_offset(&self) -> usize {
        self.offset
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(self.items.len() - 1);
        }
    }

    fn keep_selected_in_view(&mut self, view: usize) {
        if view == 0 || self.items.is_empty() {
            self.offset = 0;
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + view {
            self.offset = self.selected + 1 - view;
        }
        self.offset = self.offset.min(self.items.len().saturating_sub(view));
    }
}

impl Component for ListComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        if self.items.is_empty() {
            frame.set_line(area.x, area.y, &self.empty_text, theme::muted());
            return;
        }
        let view = area.height as usize;
        self.keep_selected_in_view(view);

        let rows = self
            .items
            .iter()
            .skip(self.offset)
            .take(view)
            .map(|item| ListItem::new(item.as_str()))
            .collect::<Vec<_>>();
        let mut state = ListState::default();
        if ctx.focused() {
            state.select(Some(self.selected - self.offset));
        }
        let list = List::new(rows).highlight_style(theme::selected());
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        if let Event::Mouse(mouse) = event {
            return match mouse.kind {
                MouseEventKind::ScrollUp => {
                    self.move_selection(-1);
                    true
                }
                MouseEventKind::ScrollDown => {
                    self.move_selection(1);
                    true
                }
                _ => false,
            };
        }
        let Some(key) = key_press(event) else {
            return false;
        };
        match key.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE),
            KeyCode::PageDown => self.move_selection(PAGE),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.items.len().saturating_sub(1),
            _ => return false,
        }
        true
    }
}
