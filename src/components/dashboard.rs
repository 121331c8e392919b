use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::broadcast::{RefreshFlag, Subscription};
use crate::components::{Component, ComponentContext, ListComponent, Notice};
use crate::context::PaneDeps;
use crate::dashboard::DashboardSummary;
use crate::theme;
use crate::ui::UiFrame;

/// Guest summary: active stays, chosen services and the grand total.
pub struct DashboardPane {
    deps: PaneDeps,
    summary: Option<DashboardSummary>,
    list: ListComponent,
    notice: Option<Notice>,
    refresh: RefreshFlag,
    _subscription: Subscription,
}

impl DashboardPane {
    pub fn new(deps: PaneDeps) -> Self {
        let refresh = RefreshFlag::new();
        let subscription = refresh.listen(&deps.channel);
        let mut pane = Self {
            deps,
            summary: None,
            list: ListComponent::new("Nothing booked yet."),
            notice: None,
            refresh,
            _subscription: subscription,
        };
        pane.reload();
        pane
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.summary.as_ref()
    }

    fn reload(&mut self) {
        let Some(cart) = self.deps.cart() else {
            self.summary = None;
            self.list.set_items(Vec::new());
            return;
        };
        match DashboardSummary::load(self.deps.backend.as_ref(), &cart) {
            Ok(summary) => {
                self.list.set_items(summary_rows(&summary));
                self.summary = Some(summary);
                self.notice = None;
            }
            Err(err) => {
                tracing::warn!(%err, "dashboard refresh failed");
                self.notice = Some(err.into());
            }
        }
    }
}

fn summary_rows(summary: &DashboardSummary) -> Vec<String> {
    let mut rows = Vec::new();
    for stay in &summary.stays {
        let r = &stay.reservation;
        let room = match &stay.room {
            Some(room) => format!("{} ${}", room.label(), room.price),
            None => format!("room #{} (unavailable)", r.room_id),
        };
        rows.push(format!(
            "#{} {room}  {} -> {}  {}",
            r.id, r.check_in, r.check_out, r.status
        ));
    }
    for service in &summary.services {
        rows.push(format!("+ {} ${}", service.name, service.price));
    }
    rows
}

impl Component for DashboardPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height == 0 {
            return;
        }
        let Some(user) = self.deps.user() else {
            frame.set_line(
                area.x,
                area.y,
                "Sign in (F5) to see your stays and services.",
                theme::muted(),
            );
            return;
        };
        let bold = Style::default().add_modifier(Modifier::BOLD);
        frame.set_line(
            area.x,
            area.y,
            &format!("Welcome back, {} <{}>", user.name, user.email),
            bold,
        );
        let total = self.summary.as_ref().map_or(0, |s| s.total);
        let footer_y = area.bottom().saturating_sub(1);
        match &self.notice {
            Some(notice) => notice.render(frame, area.x, footer_y),
            None => frame.set_line(area.x, footer_y, &format!("Total: ${total}"), bold),
        }
        let body = Rect::new(
            area.x,
            area.y.saturating_add(2),
            area.width,
            area.height.saturating_sub(4),
        );
        self.list.render(frame, body, ctx);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        self.list.handle_event(event, ctx)
    }

    fn tick(&mut self) {
        if self.refresh.take() {
            self.reload();
        }
    }
}
