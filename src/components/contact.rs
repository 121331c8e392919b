use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;

use crate::components::form::step_field;
use crate::components::{Component, ComponentContext, Notice, TextField, key_press};
use crate::context::PaneDeps;
use crate::error::Result;
use crate::model::ContactMessage;
use crate::theme;
use crate::ui::UiFrame;

/// "Contact Us": name, email and a message for the front desk.
pub struct ContactPane {
    deps: PaneDeps,
    fields: [TextField; 3],
    active: usize,
    notice: Option<Notice>,
}

impl ContactPane {
    pub fn new(deps: PaneDeps) -> Self {
        let (name, email) = deps
            .user()
            .map(|u| (u.name, u.email))
            .unwrap_or_default();
        Self {
            deps,
            fields: [
                TextField::new("Name").with_value(name),
                TextField::new("Email").with_value(email),
                TextField::new("Message"),
            ],
            active: 2,
            notice: None,
        }
    }

    fn send(&mut self) -> Result<()> {
        let [name, email, message] = &self.fields;
        self.deps.backend.send_contact(ContactMessage {
            name: name.value().trim().to_string(),
            email: email.value().trim().to_string(),
            message: message.value().trim().to_string(),
        })?;
        Ok(())
    }
}

impl Component for ContactPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height == 0 {
            return;
        }
        frame.set_line(
            area.x,
            area.y,
            "Questions? The front desk answers within a day.",
            theme::muted(),
        );
        let mut y = area.y.saturating_add(2);
        for (index, field) in self.fields.iter().enumerate() {
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
        if let Some(next) = step_field(self.active, self.fields.len(), key) {
            self.active = next;
            return true;
        }
        if key.code == KeyCode::Enter {
            self.notice = Some(match self.send() {
                Ok(()) => {
                    self.fields[2].clear();
                    Notice::info("Message sent. Thank you!")
                }
                Err(err) => err.into(),
            });
            return true;
        }
        self.fields[self.active].handle_key(key)
    }

    fn hints(&self) -> &str {
        "Up/Down field  Enter send"
    }
}
