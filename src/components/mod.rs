use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod contact;
pub mod dashboard;
pub mod form;
pub mod history;
pub mod list;
pub mod login;
pub mod reservation_form;
pub mod reservations;
pub mod reviews;
pub mod rooms;
pub mod services;
pub mod sys;

pub use contact::ContactPane;
pub use dashboard::DashboardPane;
pub use form::{Notice, RoomPicker, TextField};
pub use history::HistoryPane;
pub use list::ListComponent;
pub use login::LoginPane;
pub use reservation_form::ReservationFormPane;
pub use reservations::ReservationsPane;
pub use reviews::ReviewsPane;
pub use rooms::RoomsPane;
pub use services::ServicesPane;
pub use sys::*;

pub use crate::component_context::ComponentContext;
use crate::context::WindowSpec;

/// Something a pane asks the application shell to do once event dispatch
/// has finished. Panes never touch the window registry directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowRequest {
    Open(WindowSpec),
    Close(String),
    /// Message for the shell status line; outlives the pane that sent it.
    Notify(Notice),
    /// The signed-in user changed; windows and pages must be rebuilt.
    SessionChanged,
}

pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext);

    fn handle_event(&mut self, _event: &Event, _ctx: &ComponentContext) -> bool {
        false
    }

    /// Runs once per event-loop iteration. Broadcast listeners refetch here.
    fn tick(&mut self) {}

    fn take_requests(&mut self) -> Vec<WindowRequest> {
        Vec::new()
    }

    /// Short key legend shown in the status bar while focused.
    fn hints(&self) -> &str {
        ""
    }
}

/// Window content as stored in the registry.
pub type WindowContent = Box<dyn Component>;

pub(crate) fn key_press(event: &Event) -> Option<&KeyEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(key),
        _ => None,
    }
}

/// Two-step confirmation for destructive actions: arm it, then a `y`
/// confirms and any other key drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Confirm<A> {
    action: A,
    prompt: String,
}

impl<A: Clone> Confirm<A> {
    pub(crate) fn new(action: A, prompt: impl Into<String>) -> Self {
        Self {
            action,
            prompt: prompt.into(),
        }
    }

    pub(crate) fn prompt(&self) -> String {
        format!("{} (y/n)", self.prompt)
    }

    /// Resolve against a key press; `Some` only when confirmed.
    pub(crate) fn resolve(self, key: &KeyEvent) -> Option<A> {
        matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')).then_some(self.action)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    struct Inert;
    impl Component for Inert {
        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ComponentContext) {}
    }

    #[test]
    fn defaults_are_inert() {
        let mut c = Inert;
        assert!(!c.handle_event(&testing::key(KeyCode::Char('a')), &testing::ctx()));
        assert!(c.take_requests().is_empty());
        assert_eq!(c.hints(), "");
    }

    #[test]
    fn confirm_only_accepts_y() {
        let yes = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE);
        let no = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(Confirm::new(3u64, "Delete?").resolve(&yes), Some(3));
        assert_eq!(Confirm::new(3u64, "Delete?").resolve(&no), None);
        assert_eq!(Confirm::new((), "Delete?").prompt(), "Delete? (y/n)");
    }
}
