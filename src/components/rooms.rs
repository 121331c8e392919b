use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;

use crate::broadcast::{RefreshFlag, Subscription};
use crate::components::{
    Component, ComponentContext, ListComponent, Notice, WindowRequest, key_press,
};
use crate::context::{PaneDeps, WindowSpec};
use crate::model::{Room, RoomStatus};
use crate::theme;
use crate::ui::UiFrame;

/// Room catalogue. `r` or Enter opens a reservation form for the selection.
pub struct RoomsPane {
    deps: PaneDeps,
    rooms: Vec<Room>,
    list: ListComponent,
    notice: Option<Notice>,
    requests: Vec<WindowRequest>,
    refresh: RefreshFlag,
    _subscription: Subscription,
}

impl RoomsPane {
    pub fn new(deps: PaneDeps) -> Self {
        let refresh = RefreshFlag::new();
        let subscription = refresh.listen(&deps.channel);
        let mut pane = Self {
            deps,
            rooms: Vec::new(),
            list: ListComponent::new("No rooms listed."),
            notice: None,
            requests: Vec::new(),
            refresh,
            _subscription: subscription,
        };
        pane.reload();
        pane
    }

    fn reload(&mut self) {
        match self.deps.backend.rooms() {
            Ok(rooms) => {
                self.list.set_items(
                    rooms
                        .iter()
                        .map(|room| {
                            format!(
                                "{:<24} {:>3} guests  ${:>4}/night  {}",
                                room.label(),
                                room.capacity,
                                room.price,
                                room.status
                            )
                        })
                        .collect(),
                );
                self.rooms = rooms;
            }
            Err(err) => {
                tracing::warn!(%err, "room list refresh failed");
                self.notice = Some(err.into());
            }
        }
    }

    fn reserve_selected(&mut self) {
        let Some(room) = self.list.selection().and_then(|i| self.rooms.get(i)) else {
            return;
        };
        if room.status != RoomStatus::Available {
            self.notice = Some(Notice::Error(format!(
                "Room {} is {} right now.",
                room.number, room.status
            )));
            return;
        }
        self.notice = None;
        self.requests
            .push(WindowRequest::Open(WindowSpec::ReservationForm {
                room_id: room.id,
            }));
    }
}

impl Component for RoomsPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height < 2 {
            return;
        }
        frame.set_line(area.x, area.y, "Our rooms", theme::tab(false));
        let body = Rect::new(
            area.x,
            area.y.saturating_add(2),
            area.width,
            area.height.saturating_sub(3),
        );
        self.list.render(frame, body, ctx);
        if let Some(notice) = &self.notice {
            notice.render(frame, area.x, area.bottom().saturating_sub(1));
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        if let Some(key) = key_press(event)
            && matches!(key.code, KeyCode::Enter | KeyCode::Char('r'))
        {
            self.reserve_selected();
            return true;
        }
        self.list.handle_event(event, ctx)
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
        "Up/Down select  Enter/r reserve"
    }
}
