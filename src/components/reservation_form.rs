use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;

use crate::booking::ReservationDraft;
use crate::broadcast::{RefreshFlag, Subscription};
use crate::components::form::step_field;
use crate::components::{
    Component, ComponentContext, Notice, RoomPicker, TextField, WindowRequest, key_press,
};
use crate::context::{PaneDeps, WindowSpec};
use crate::error::{DeskError, Result};
use crate::theme;
use crate::ui::UiFrame;

/// Quick booking form opened from the room list for one room. It closes its
/// own window once the reservation is created.
pub struct ReservationFormPane {
    deps: PaneDeps,
    window_id: String,
    room: RoomPicker,
    check_in: TextField,
    check_out: TextField,
    active: usize,
    notice: Option<Notice>,
    requests: Vec<WindowRequest>,
    refresh: RefreshFlag,
    _subscription: Subscription,
}

impl ReservationFormPane {
    pub fn new(deps: PaneDeps, room_id: u64) -> Self {
        let refresh = RefreshFlag::new();
        let subscription = refresh.listen(&deps.channel);
        let mut pane = Self {
            window_id: WindowSpec::ReservationForm { room_id }.id(),
            deps,
            room: RoomPicker::default(),
            check_in: TextField::new("Check-in"),
            check_out: TextField::new("Check-out"),
            active: 1,
            notice: None,
            requests: Vec::new(),
            refresh,
            _subscription: subscription,
        };
        pane.reload();
        pane.room.select(room_id);
        pane
    }

    fn reload(&mut self) {
        match self.deps.backend.available_rooms() {
            Ok(rooms) => self.room.set_rooms(rooms),
            Err(err) => {
                tracing::warn!(%err, "available rooms refresh failed");
                self.notice = Some(err.into());
            }
        }
    }

    fn submit(&mut self, ctx: &ComponentContext) -> Result<String> {
        let user_id = self
            .deps
            .session
            .borrow()
            .user_id()
            .ok_or(DeskError::NotSignedIn)?;
        let draft = ReservationDraft {
            room_id: self.room.selected_id(),
            check_in: self.check_in.value().to_string(),
            check_out: self.check_out.value().to_string(),
        };
        let created = self.deps.desk().create(user_id, &draft, ctx.today())?;
        let message = format!("Reservation #{} created.", created.id);
        self.requests.push(WindowRequest::Notify(Notice::info(&message)));
        self.requests
            .push(WindowRequest::Close(self.window_id.clone()));
        Ok(message)
    }
}

impl Component for ReservationFormPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height == 0 {
            return;
        }
        let focused = ctx.focused();
        self.room.render(frame, area.x, area.y, focused && self.active == 0);
        self.check_in
            .render(frame, area.x, area.y.saturating_add(1), focused && self.active == 1);
        self.check_out
            .render(frame, area.x, area.y.saturating_add(2), focused && self.active == 2);
        let footer = area.y.saturating_add(4);
        match &self.notice {
            Some(notice) => notice.render(frame, area.x, footer),
            None => frame.set_line(
                area.x,
                footer,
                "YYYY-MM-DD, Enter books",
                theme::muted(),
            ),
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        let Some(key) = key_press(event) else {
            return false;
        };
        if let Some(next) = step_field(self.active, 3, key) {
            self.active = next;
            return true;
        }
        if key.code == KeyCode::Enter {
            self.notice = Some(match self.submit(ctx) {
                Ok(message) => Notice::Info(message),
                Err(err) => err.into(),
            });
            return true;
        }
        match self.active {
            0 => self.room.handle_key(key),
            1 => self.check_in.handle_key(key),
            _ => self.check_out.handle_key(key),
        }
    }

    fn tick(&mut self) {
        if self.refresh.take() {
            self.reload();
        }
    }

    fn take_requests(&mut self) -> Vec<WindowRequest> {
        std::mem::take(&mut self.requests)
    }

    fn hints(&self) -> &str {
        "Up/Down field  Enter book"
    }
}
