use std::collections::HashMap;

use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;

use crate::broadcast::{RefreshFlag, Subscription};
use crate::components::{
    Component, ComponentContext, Confirm, ListComponent, Notice, key_press,
};
use crate::context::PaneDeps;
use crate::error::Result;
use crate::model::Reservation;
use crate::theme;
use crate::ui::UiFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryAction {
    Cancel(u64),
    Delete(u64),
}

/// Every reservation of the signed-in guest, cancelled ones included.
pub struct HistoryPane {
    deps: PaneDeps,
    reservations: Vec<Reservation>,
    list: ListComponent,
    confirm: Option<Confirm<HistoryAction>>,
    notice: Option<Notice>,
    refresh: RefreshFlag,
    _subscription: Subscription,
}

impl HistoryPane {
    pub fn new(deps: PaneDeps) -> Self {
        let refresh = RefreshFlag::new();
        let subscription = refresh.listen(&deps.channel);
        let mut pane = Self {
            deps,
            reservations: Vec::new(),
            list: ListComponent::new("No reservations yet."),
            confirm: None,
            notice: None,
            refresh,
            _subscription: subscription,
        };
        pane.reload();
        pane
    }

    fn reload(&mut self) {
        let Some(user_id) = self.deps.session.borrow().user_id() else {
            self.reservations.clear();
            self.list.set_items(Vec::new());
            return;
        };
        match self.load(user_id) {
            Ok(rows) => self.list.set_items(rows),
            Err(err) => {
                tracing::warn!(%err, "history refresh failed");
                self.notice = Some(err.into());
            }
        }
    }

    fn load(&mut self, user_id: u64) -> Result<Vec<String>> {
        let rooms: HashMap<u64, String> = self
            .deps
            .backend
            .rooms()?
            .into_iter()
            .map(|r| (r.id, r.label()))
            .collect();
        self.reservations = self.deps.backend.reservations_for_user(user_id)?;
        Ok(self
            .reservations
            .iter()
            .map(|r| {
                let room = rooms
                    .get(&r.room_id)
                    .cloned()
                    .unwrap_or_else(|| format!("room #{}", r.room_id));
                format!(
                    "#{:<3} {room:<20} {} -> {} ({} nights)  {}",
                    r.id,
                    r.check_in,
                    r.check_out,
                    r.nights(),
                    r.status
                )
            })
            .collect())
    }

    fn selected(&self) -> Option<&Reservation> {
        self.list.selection().and_then(|i| self.reservations.get(i))
    }

    fn run(&mut self, action: HistoryAction) {
        let desk = self.deps.desk();
        let outcome = match action {
            HistoryAction::Cancel(id) => self
                .reservations
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .map(|r| desk.cancel(&r).map(|_| format!("Reservation #{id} cancelled."))),
            HistoryAction::Delete(id) => {
                Some(desk.delete(id).map(|_| format!("Reservation #{id} deleted.")))
            }
        };
        self.notice = match outcome {
            Some(Ok(message)) => Some(Notice::Info(message)),
            Some(Err(err)) => Some(err.into()),
            None => None,
        };
    }
}

impl Component for HistoryPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height < 2 {
            return;
        }
        if self.deps.session.borrow().user().is_none() {
            frame.set_line(
                area.x,
                area.y,
                "Sign in (F5) to see your booking history.",
                theme::muted(),
            );
            return;
        }
        frame.set_line(area.x, area.y, "Booking history", theme::tab(false));
        let body = Rect::new(
            area.x,
            area.y.saturating_add(2),
            area.width,
            area.height.saturating_sub(3),
        );
        self.list.render(frame, body, ctx);
        let footer = area.bottom().saturating_sub(1);
        if let Some(confirm) = &self.confirm {
            frame.set_line(area.x, footer, &confirm.prompt(), theme::error());
        } else if let Some(notice) = &self.notice {
            notice.render(frame, area.x, footer);
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        if let Some(confirm) = self.confirm.take() {
            if let Some(key) = key_press(event)
                && let Some(action) = confirm.resolve(key)
            {
                self.run(action);
            }
            return true;
        }
        if let Some(key) = key_press(event) {
            let armed = match (key.code, self.selected()) {
                (KeyCode::Char('c'), Some(r)) if !r.is_cancelled() => Some(Confirm::new(
                    HistoryAction::Cancel(r.id),
                    format!("Cancel reservation #{}?", r.id),
                )),
                (KeyCode::Char('d'), Some(r)) => Some(Confirm::new(
                    HistoryAction::Delete(r.id),
                    format!("Delete reservation #{}?", r.id),
                )),
                _ => None,
            };
            if armed.is_some() {
                self.confirm = armed;
                return true;
            }
        }
        self.list.handle_event(event, ctx)
    }

    fn tick(&mut self) {
        if self.refresh.take() {
            self.reload();
        }
    }

    fn hints(&self) -> &str {
        "c cancel  d delete"
    }
}
