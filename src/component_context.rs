//! Shared component rendering context
//!
//! `ComponentContext` carries the UI metadata a pane needs while rendering and
//! handling events: whether it has focus, and the current date used by the
//! booking forms.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy)]
pub struct ComponentContext {
    focused: bool,
    today: NaiveDate,
}

impl ComponentContext {
    pub const fn new(focused: bool, today: NaiveDate) -> Self {
        Self { focused, today }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Return a new `ComponentContext` with a modified `focused` flag.
    pub const fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Default for ComponentContext {
    fn default() -> Self {
        Self::new(false, chrono::Local::now().date_naive())
    }
}
