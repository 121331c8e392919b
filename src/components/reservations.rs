use std::collections::HashMap;

use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;

use crate::booking::ReservationDraft;
use crate::broadcast::{RefreshFlag, Subscription};
use crate::components::form::step_field;
use crate::components::{
    Component, ComponentContext, Confirm, ListComponent, Notice, RoomPicker, TextField,
    WindowRequest, key_press,
};
use crate::context::PaneDeps;
use crate::error::{DeskError, Result};
use crate::model::Reservation;
use crate::theme;
use crate::ui::UiFrame;

const FIELD_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListAction {
    Cancel(u64),
    Delete(u64),
}

/// Reservation editor: room picker plus the two dates. `editing` holds the
/// reservation being changed, `None` for a new one.
struct Editor {
    editing: Option<Reservation>,
    room: RoomPicker,
    check_in: TextField,
    check_out: TextField,
    active: usize,
}

impl Editor {
    fn draft(&self) -> ReservationDraft {
        ReservationDraft {
            room_id: self.room.selected_id(),
            check_in: self.check_in.value().to_string(),
            check_out: self.check_out.value().to_string(),
        }
    }
}

/// The "My Reservations" window: the guest's active reservations with
/// new/edit/cancel/delete.
pub struct ReservationsPane {
    deps: PaneDeps,
    reservations: Vec<Reservation>,
    room_labels: HashMap<u64, String>,
    list: ListComponent,
    editor: Option<Editor>,
    confirm: Option<Confirm<ListAction>>,
    notice: Option<Notice>,
    requests: Vec<WindowRequest>,
    refresh: RefreshFlag,
    _subscription: Subscription,
}

impl ReservationsPane {
    pub fn new(deps: PaneDeps) -> Self {
        let refresh = RefreshFlag::new();
        let subscription = refresh.listen(&deps.channel);
        let mut pane = Self {
            deps,
            reservations: Vec::new(),
            room_labels: HashMap::new(),
            list: ListComponent::new("No active reservations. Press n to book."),
            editor: None,
            confirm: None,
            notice: None,
            requests: Vec::new(),
            refresh,
            _subscription: subscription,
        };
        pane.reload();
        pane
    }

    fn reload(&mut self) {
        if let Err(err) = self.load() {
            tracing::warn!(%err, "reservation refresh failed");
            self.notice = Some(err.into());
        }
    }

    fn load(&mut self) -> Result<()> {
        self.room_labels = self
            .deps
            .backend
            .rooms()?
            .into_iter()
            .map(|r| (r.id, r.label()))
            .collect();
        if let Some(editor) = &mut self.editor {
            editor.room.set_rooms(self.deps.backend.available_rooms()?);
        }
        let Some(user_id) = self.deps.session.borrow().user_id() else {
            self.reservations.clear();
            self.list.set_items(Vec::new());
            return Ok(());
        };
        self.reservations = self
            .deps
            .backend
            .reservations_for_user(user_id)?
            .into_iter()
            .filter(|r| !r.is_cancelled())
            .collect();
        let rows = self
            .reservations
            .iter()
            .map(|r| {
                let room = self
                    .room_labels
                    .get(&r.room_id)
                    .map_or("unknown room", String::as_str);
                format!(
                    "#{:<3} {room:<18} {} -> {}  {}",
                    r.id, r.check_in, r.check_out, r.status
                )
            })
            .collect();
        self.list.set_items(rows);
        Ok(())
    }

    fn open_editor(&mut self, editing: Option<Reservation>) -> Result<()> {
        let mut rooms = self.deps.backend.available_rooms()?;
        let draft = match &editing {
            Some(existing) => {
                // the booked room stays pickable even if it is no longer free
                if !rooms.iter().any(|r| r.id == existing.room_id)
                    && let Ok(room) = self.deps.backend.room(existing.room_id)
                {
                    rooms.push(room);
                }
                ReservationDraft::from_reservation(existing)
            }
            None => ReservationDraft::default(),
        };
        let mut room = RoomPicker::new(rooms);
        if let Some(id) = draft.room_id {
            room.select(id);
        }
        self.editor = Some(Editor {
            editing,
            room,
            check_in: TextField::new("Check-in").with_value(draft.check_in),
            check_out: TextField::new("Check-out").with_value(draft.check_out),
            active: 0,
        });
        self.notice = None;
        Ok(())
    }

    fn save(&mut self, ctx: &ComponentContext) -> Result<String> {
        let user_id = self
            .deps
            .session
            .borrow()
            .user_id()
            .ok_or(DeskError::NotSignedIn)?;
        let Some(editor) = &self.editor else {
            return Ok(String::new());
        };
        let desk = self.deps.desk();
        let draft = editor.draft();
        let message = match &editor.editing {
            Some(existing) => {
                let updated = desk.update(existing, &draft, ctx.today())?;
                format!("Reservation #{} updated.", updated.id)
            }
            None => {
                let created = desk.create(user_id, &draft, ctx.today())?;
                let message = format!("Reservation #{} created.", created.id);
                self.requests.push(WindowRequest::Notify(Notice::info(&message)));
                self.requests
                    .push(WindowRequest::Close("reservations".to_string()));
                message
            }
        };
        self.editor = None;
        Ok(message)
    }

    fn run(&mut self, action: ListAction) {
        let desk = self.deps.desk();
        let result = match action {
            ListAction::Cancel(id) => match self.reservations.iter().find(|r| r.id == id) {
                Some(existing) => desk
                    .cancel(existing)
                    .map(|_| format!("Reservation #{id} cancelled.")),
                None => Err(DeskError::not_found("reservation", id)),
            },
            ListAction::Delete(id) => desk
                .delete(id)
                .map(|_| format!("Reservation #{id} deleted.")),
        };
        self.notice = Some(match result {
            Ok(message) => Notice::Info(message),
            Err(err) => err.into(),
        });
    }

    fn handle_editor_key(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        let Some(key) = key_press(event) else {
            return false;
        };
        let Some(editor) = &mut self.editor else {
            return false;
        };
        if let Some(next) = step_field(editor.active, FIELD_COUNT, key) {
            editor.active = next;
            return true;
        }
        match key.code {
            KeyCode::Esc => {
                self.editor = None;
                self.notice = None;
            }
            KeyCode::Enter => {
                self.notice = Some(match self.save(ctx) {
                    Ok(message) => Notice::Info(message),
                    Err(err) => err.into(),
                });
            }
            _ => {
                return match editor.active {
                    0 => editor.room.handle_key(key),
                    1 => editor.check_in.handle_key(key),
                    _ => editor.check_out.handle_key(key),
                };
            }
        }
        true
    }

    fn handle_list_key(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        if let Some(confirm) = self.confirm.take() {
            if let Some(key) = key_press(event)
                && let Some(action) = confirm.resolve(key)
            {
                self.run(action);
            }
            return true;
        }
        let Some(key) = key_press(event) else {
            return self.list.handle_event(event, ctx);
        };
        let selected = self
            .list
            .selection()
            .and_then(|i| self.reservations.get(i))
            .cloned();
        match (key.code, selected) {
            (KeyCode::Char('n'), _) => {
                if let Err(err) = self.open_editor(None) {
                    self.notice = Some(err.into());
                }
            }
            (KeyCode::Char('e') | KeyCode::Enter, Some(existing)) => {
                if let Err(err) = self.open_editor(Some(existing)) {
                    self.notice = Some(err.into());
                }
            }
            (KeyCode::Char('c'), Some(existing)) => {
                self.confirm = Some(Confirm::new(
                    ListAction::Cancel(existing.id),
                    format!("Cancel reservation #{}?", existing.id),
                ));
            }
            (KeyCode::Char('d'), Some(existing)) => {
                self.confirm = Some(Confirm::new(
                    ListAction::Delete(existing.id),
                    format!("Delete reservation #{}?", existing.id),
                ));
            }
            _ => return self.list.handle_event(event, ctx),
        }
        true
    }
}

impl Component for ReservationsPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height < 2 {
            return;
        }
        let footer = area.bottom().saturating_sub(1);
        if let Some(editor) = &self.editor {
            let heading = match &editor.editing {
                Some(r) => format!("Edit reservation #{}", r.id),
                None => "New reservation".to_string(),
            };
            frame.set_line(area.x, area.y, &heading, theme::tab(false));
            let focused = ctx.focused();
            editor
                .room
                .render(frame, area.x, area.y + 2, focused && editor.active == 0);
            editor
                .check_in
                .render(frame, area.x, area.y + 3, focused && editor.active == 1);
            editor
                .check_out
                .render(frame, area.x, area.y + 4, focused && editor.active == 2);
            frame.set_line(
                area.x,
                area.y + 6,
                "Dates as YYYY-MM-DD. Enter saves, Esc goes back.",
                theme::muted(),
            );
        } else {
            let body = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));
            self.list.render(frame, body, ctx);
        }
        if let Some(confirm) = &self.confirm {
            frame.set_line(area.x, footer, &confirm.prompt(), theme::error());
        } else if let Some(notice) = &self.notice {
            notice.render(frame, area.x, footer);
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        if self.editor.is_some() {
            self.handle_editor_key(event, ctx)
        } else {
            self.handle_list_key(event, ctx)
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
        if self.editor.is_some() {
            "Up/Down field  Left/Right room  Enter save  Esc back"
        } else {
            "n new  e edit  c cancel  d delete"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Seed};
    use crate::components::testing::{key, render, send, typed};
    use crate::context::AppContext;
    use crate::model::ReservationStatus;
    use crate::storage::MemoryStorage;
    use std::rc::Rc;

    fn signed_in() -> AppContext {
        let mut app = AppContext::new(
            Rc::new(MemoryBackend::new(Seed::demo().unwrap())),
            Rc::new(MemoryStorage::new()),
        );
        app.login("demo@hotel.test", "demo").unwrap();
        app
    }

    #[test]
    fn lists_only_active_reservations() {
        let app = signed_in();
        let mut pane = ReservationsPane::new(app.deps().clone());
        assert_eq!(pane.reservations.len(), 1);
        let screen = render(&mut pane, 70, 4);
        assert!(screen.contains("#1   102 - Double"));
        assert!(!screen.contains("cancelled"));
    }

    #[test]
    fn create_broadcasts_and_closes_window() {
        let app = signed_in();
        let mut pane = ReservationsPane::new(app.deps().clone());
        send(&mut pane, &[key(KeyCode::Char('n')), key(KeyCode::Right)]);
        send(&mut pane, &[key(KeyCode::Down)]);
        send(&mut pane, &typed("2026-12-01"));
        send(&mut pane, &[key(KeyCode::Down)]);
        send(&mut pane, &typed("2026-12-04"));
        send(&mut pane, &[key(KeyCode::Enter)]);

        assert!(pane.editor.is_none());
        assert_eq!(pane.notice, Some(Notice::info("Reservation #3 created.")));
        assert_eq!(
            pane.take_requests(),
            vec![
                WindowRequest::Notify(Notice::info("Reservation #3 created.")),
                WindowRequest::Close("reservations".into()),
            ]
        );
        pane.tick();
        assert_eq!(pane.reservations.len(), 2);
        assert_eq!(pane.reservations[1].room_id, 1);
    }

    #[test]
    fn invalid_dates_keep_editor_open() {
        let app = signed_in();
        let mut pane = ReservationsPane::new(app.deps().clone());
        send(&mut pane, &[key(KeyCode::Char('n')), key(KeyCode::Right)]);
        send(&mut pane, &[key(KeyCode::Down)]);
        send(&mut pane, &typed("2026-10-01"));
        send(&mut pane, &[key(KeyCode::Down)]);
        send(&mut pane, &typed("2026-10-03"));
        send(&mut pane, &[key(KeyCode::Enter)]);
        assert!(pane.editor.is_some());
        assert_eq!(
            pane.notice,
            Some(Notice::Error("check-in cannot be before today".into()))
        );
        assert!(pane.take_requests().is_empty());
    }

    #[test]
    fn edit_keeps_status_and_stays_open() {
        let app = signed_in();
        let mut pane = ReservationsPane::new(app.deps().clone());
        send(&mut pane, &[key(KeyCode::Char('e'))]);
        let editor = pane.editor.as_ref().unwrap();
        assert_eq!(editor.room.selected_id(), Some(2));
        assert_eq!(editor.check_in.value(), "2026-11-02");

        send(&mut pane, &[key(KeyCode::Up), key(KeyCode::Backspace)]);
        send(&mut pane, &typed("6"));
        send(&mut pane, &[key(KeyCode::Enter)]);
        assert!(pane.take_requests().is_empty());
        pane.tick();
        assert_eq!(pane.reservations[0].check_out.to_string(), "2026-11-06");
        assert_eq!(pane.reservations[0].status, ReservationStatus::Confirmed);
    }

    #[test]
    fn cancel_hides_reservation_after_confirm() {
        let app = signed_in();
        let mut pane = ReservationsPane::new(app.deps().clone());
        send(&mut pane, &[key(KeyCode::Char('c'))]);
        assert!(render(&mut pane, 60, 4).contains("Cancel reservation #1? (y/n)"));
        send(&mut pane, &[key(KeyCode::Char('y'))]);
        pane.tick();
        assert!(pane.reservations.is_empty());
    }
}
