//! Small building blocks shared by the entry panes: labelled text fields, a
//! room picker and the one-line notice under a form.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;

use crate::error::DeskError;
use crate::model::Room;
use crate::theme;
use crate::ui::UiFrame;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    label: &'static str,
    value: String,
    masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            label,
            masked: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn label(&self) -> &str {
        self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Apply an editing key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(ch) => {
                self.value.push(ch);
                true
            }
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            _ => false,
        }
    }

    pub fn display(&self, active: bool) -> String {
        let shown = if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };
        let cursor = if active { "_" } else { "" };
        format!("{:<10} {shown}{cursor}", format!("{}:", self.label))
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, x: u16, y: u16, active: bool) {
        let style = if active {
            Style::default().fg(theme::accent())
        } else {
            Style::default()
        };
        frame.set_line(x, y, &self.display(active), style);
    }
}

/// Move the active field index for Up/Down; `None` when the key is not a
/// field navigation key.
pub(crate) fn step_field(active: usize, count: usize, key: &KeyEvent) -> Option<usize> {
    if count == 0 {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(active.checked_sub(1).unwrap_or(count - 1)),
        KeyCode::Down => Some((active + 1) % count),
        _ => None,
    }
}

/// Cycles through bookable rooms with Left/Right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomPicker {
    rooms: Vec<Room>,
    index: Option<usize>,
}

impl RoomPicker {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms, index: None }
    }

    /// Replace the room list, keeping the current pick when it still exists.
    pub fn set_rooms(&mut self, rooms: Vec<Room>) {
        let current = self.selected_id();
        self.rooms = rooms;
        self.index = current.and_then(|id| self.rooms.iter().position(|r| r.id == id));
    }

    pub fn select(&mut self, room_id: u64) -> bool {
        self.index = self.rooms.iter().position(|r| r.id == room_id);
        self.index.is_some()
    }

    pub fn selected(&self) -> Option<&Room> {
        self.index.and_then(|i| self.rooms.get(i))
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected().map(|r| r.id)
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if self.rooms.is_empty() {
            return false;
        }
        let last = self.rooms.len() - 1;
        self.index = match (key.code, self.index) {
            (KeyCode::Right, None) => Some(0),
            (KeyCode::Right, Some(i)) => Some(if i >= last { 0 } else { i + 1 }),
            (KeyCode::Left, None) => Some(last),
            (KeyCode::Left, Some(i)) => Some(i.checked_sub(1).unwrap_or(last)),
            _ => return false,
        };
        true
    }

    pub fn display(&self, active: bool) -> String {
        let room = match self.selected() {
            Some(room) => format!("{} (${}/night)", room.label(), room.price),
            None => "-- pick a room --".to_string(),
        };
        let arrows = if active { " <>" } else { "" };
        format!("{:<10} {room}{arrows}", "Room:")
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, x: u16, y: u16, active: bool) {
        let style = if active {
            Style::default().fg(theme::accent())
        } else {
            Style::default()
        };
        frame.set_line(x, y, &self.display(active), style);
    }
}

/// Outcome message shown under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice::Info(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, x: u16, y: u16) {
        let style = if self.is_error() {
            theme::error()
        } else {
            theme::info()
        };
        frame.set_line(x, y, self.text(), style);
    }
}

impl From<DeskError> for Notice {
    fn from(err: DeskError) -> Self {
        Notice::Error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoomStatus;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn room(id: u64, number: &str) -> Room {
        Room {
            id,
            number: number.into(),
            kind: "Double".into(),
            price: 100,
            status: RoomStatus::Available,
            capacity: 2,
            image: None,
        }
    }

    #[test]
    fn text_field_edits_and_masks() {
        let mut field = TextField::masked("Password");
        field.handle_key(&press(KeyCode::Char('a')));
        field.handle_key(&press(KeyCode::Char('b')));
        field.handle_key(&press(KeyCode::Backspace));
        field.handle_key(&press(KeyCode::Char('c')));
        assert_eq!(field.value(), "ac");
        assert_eq!(field.display(false), "Password:  **");
        assert!(!field.handle_key(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn step_field_wraps() {
        assert_eq!(step_field(0, 3, &press(KeyCode::Up)), Some(2));
        assert_eq!(step_field(2, 3, &press(KeyCode::Down)), Some(0));
        assert_eq!(step_field(1, 3, &press(KeyCode::Enter)), None);
    }

    #[test]
    fn room_picker_cycles_and_keeps_pick_on_reload() {
        let mut picker = RoomPicker::new(vec![room(1, "101"), room(2, "102")]);
        assert_eq!(picker.selected_id(), None);
        picker.handle_key(&press(KeyCode::Left));
        assert_eq!(picker.selected_id(), Some(2));
        picker.handle_key(&press(KeyCode::Right));
        assert_eq!(picker.selected_id(), Some(1));

        picker.set_rooms(vec![room(3, "103"), room(1, "101")]);
        assert_eq!(picker.selected_id(), Some(1));
        picker.set_rooms(vec![room(3, "103")]);
        assert_eq!(picker.selected_id(), None);
        assert!(picker.select(3));
        assert!(!picker.select(9));
    }

    #[test]
    fn notice_from_error() {
        let notice = Notice::from(DeskError::NotSignedIn);
        assert!(notice.is_error());
        assert!(!Notice::info("saved").is_error());
    }
}
