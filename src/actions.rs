use std::fmt;

use crate::app::Page;

/// Application-level commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    // Focus/tab navigation
    FocusNext,
    FocusPrev,
    // Pages
    ShowPage(Page),
    // Floating windows
    ToggleMinimize,
    CloseWindow,
    ToggleActivityLog,
    // Session
    Logout,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Quit => write!(f, "Quit"),
            Action::FocusNext => write!(f, "Focus next"),
            Action::FocusPrev => write!(f, "Focus previous"),
            Action::ShowPage(page) => write!(f, "{}", page.title()),
            Action::ToggleMinimize => write!(f, "Minimize/restore window"),
            Action::CloseWindow => write!(f, "Close window"),
            Action::ToggleActivityLog => write!(f, "Activity log"),
            Action::Logout => write!(f, "Sign out"),
        }
    }
}
