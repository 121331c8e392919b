use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::layout::Rect;

use crate::components::form::step_field;
use crate::components::{
    Component, ComponentContext, Notice, TextField, WindowRequest, key_press,
};
use crate::context::PaneDeps;
use crate::error::Result;
use crate::theme;
use crate::ui::UiFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    Register,
}

/// Sign-in and registration form. Ctrl+R switches between the two.
pub struct LoginPane {
    deps: PaneDeps,
    mode: Mode,
    name: TextField,
    email: TextField,
    password: TextField,
    active: usize,
    notice: Option<Notice>,
    requests: Vec<WindowRequest>,
}

impl LoginPane {
    pub fn new(deps: PaneDeps) -> Self {
        Self {
            deps,
            mode: Mode::SignIn,
            name: TextField::new("Name"),
            email: TextField::new("Email"),
            password: TextField::masked("Password"),
            active: 0,
            notice: None,
            requests: Vec::new(),
        }
    }

    fn fields_mut(&mut self) -> Vec<&mut TextField> {
        match self.mode {
            Mode::SignIn => vec![&mut self.email, &mut self.password],
            Mode::Register => vec![&mut self.name, &mut self.email, &mut self.password],
        }
    }

    fn fields(&self) -> Vec<&TextField> {
        match self.mode {
            Mode::SignIn => vec![&self.email, &self.password],
            Mode::Register => vec![&self.name, &self.email, &self.password],
        }
    }

    fn switch_mode(&mut self) {
        self.mode = match self.mode {
            Mode::SignIn => Mode::Register,
            Mode::Register => Mode::SignIn,
        };
        self.active = 0;
        self.notice = None;
    }

    fn submit(&mut self) -> Result<String> {
        let backend = self.deps.backend.clone();
        let mut session = self.deps.session.borrow_mut();
        let user = match self.mode {
            Mode::SignIn => session.login(
                backend.as_ref(),
                self.email.value().trim(),
                self.password.value(),
            )?,
            Mode::Register => session.register(
                backend.as_ref(),
                self.name.value(),
                self.email.value(),
                self.password.value(),
            )?,
        };
        Ok(format!("Welcome, {}!", user.name))
    }
}

impl Component for LoginPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height == 0 {
            return;
        }
        if let Some(user) = self.deps.user() {
            frame.set_line(
                area.x,
                area.y,
                &format!("Signed in as {} <{}>.", user.name, user.email),
                theme::info(),
            );
            frame.set_line(
                area.x,
                area.y.saturating_add(1),
                "Press F11 or Alt+L to sign out.",
                theme::muted(),
            );
            return;
        }
        let heading = match self.mode {
            Mode::SignIn => "Sign in  (Ctrl+R: create an account)",
            Mode::Register => "Create an account  (Ctrl+R: back to sign in)",
        };
        frame.set_line(area.x, area.y, heading, theme::tab(false));
        let mut y = area.y.saturating_add(2);
        for (index, field) in self.fields().into_iter().enumerate() {
            field.render(frame, area.x, y, ctx.focused() && index == self.active);
            y = y.saturating_add(1);
        }
        if let Some(notice) = &self.notice {
            notice.render(frame, area.x, y.saturating_add(1));
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        let Some(key) = key_press(event) else {
            return false;
        };
        if self.deps.user().is_some() {
            return false;
        }
        if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.switch_mode();
            return true;
        }
        let count = self.fields().len();
        if let Some(next) = step_field(self.active, count, key) {
            self.active = next;
            return true;
        }
        if key.code == KeyCode::Enter {
            match self.submit() {
                Ok(message) => {
                    self.password.clear();
                    self.notice = Some(Notice::Info(message));
                    self.requests.push(WindowRequest::SessionChanged);
                }
                Err(err) => self.notice = Some(err.into()),
            }
            return true;
        }
        let active = self.active;
        self.fields_mut()
            .into_iter()
            .nth(active)
            .is_some_and(|field| field.handle_key(key))
    }

    fn take_requests(&mut self) -> Vec<WindowRequest> {
        std::mem::take(&mut self.requests)
    }

    fn hints(&self) -> &str {
        "Up/Down field  Enter submit  Ctrl+R sign in/register"
    }
}
