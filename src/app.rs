//! The desk shell: page tabs, the focused target and the floating windows
//! drawn over the page.

use chrono::{Local, NaiveDate};
use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use crate::actions::Action;
use crate::components::{
    Component, ComponentContext, DashboardPane, HistoryPane, LoginPane, Notice, ReviewsPane,
    RoomsPane, WindowRequest, key_press,
};
use crate::context::{AppContext, PaneDeps, WindowSpec};
use crate::keybindings::KeyBindings;
use crate::layout::{OverlayHit, OverlayLayout};
use crate::theme;
use crate::ui::UiFrame;
use crate::window::WindowMode;
use crate::window::decorator::{DeskDecorator, WindowDecorator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Dashboard,
    Rooms,
    History,
    Reviews,
    Login,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Dashboard,
        Page::Rooms,
        Page::History,
        Page::Reviews,
        Page::Login,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Rooms => "Rooms",
            Page::History => "History",
            Page::Reviews => "Reviews",
            Page::Login => "Account",
        }
    }

    fn build(self, deps: PaneDeps) -> Box<dyn Component> {
        match self {
            Page::Dashboard => Box::new(DashboardPane::new(deps)),
            Page::Rooms => Box::new(RoomsPane::new(deps)),
            Page::History => Box::new(HistoryPane::new(deps)),
            Page::Reviews => Box::new(ReviewsPane::new(deps)),
            Page::Login => Box::new(LoginPane::new(deps)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Focus {
    Page,
    Window(String),
}

pub struct DeskApp {
    ctx: AppContext,
    page: Page,
    page_pane: Box<dyn Component>,
    focus: Focus,
    bindings: KeyBindings,
    decorator: DeskDecorator,
    layout: OverlayLayout,
    status: Option<Notice>,
    today: NaiveDate,
    quit: bool,
}

impl DeskApp {
    pub fn new(ctx: AppContext) -> Self {
        Self::with_today(ctx, Local::now().date_naive())
    }

    /// Build with a fixed calendar date; date validation in the forms is
    /// relative to it.
    pub fn with_today(ctx: AppContext, today: NaiveDate) -> Self {
        let page = if ctx.user().is_some() {
            Page::Dashboard
        } else {
            Page::Login
        };
        let page_pane = page.build(ctx.deps().clone());
        Self {
            ctx,
            page,
            page_pane,
            focus: Focus::Page,
            bindings: KeyBindings::default(),
            decorator: DeskDecorator,
            layout: OverlayLayout::default(),
            status: None,
            today,
            quit: false,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Id of the focused window, `None` while the page has focus.
    pub fn focused_window(&self) -> Option<&str> {
        match &self.focus {
            Focus::Page => None,
            Focus::Window(id) => Some(id),
        }
    }

    pub fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    pub fn show_page(&mut self, page: Page) {
        self.page = page;
        self.page_pane = page.build(self.ctx.deps().clone());
        self.focus = Focus::Page;
        tracing::debug!(page = page.title(), "page shown");
    }

    fn component_ctx(&self, focused: bool) -> ComponentContext {
        ComponentContext::new(focused, self.today)
    }

    pub fn handle_event(&mut self, event: &Event) -> bool {
        if let Some(key) = key_press(event) {
            self.clear_status();
            if let Some(action) = self.bindings.action_for_key(key) {
                self.perform(action);
                return true;
            }
        }
        if let Event::Mouse(mouse) = event
            && let MouseEventKind::Down(MouseButton::Left) = mouse.kind
        {
            match self.layout.hit_test(mouse.column, mouse.row) {
                Some(hit) => {
                    self.apply_hit(hit);
                    return true;
                }
                None => self.focus = Focus::Page,
            }
        }
        self.dispatch(event)
    }

    fn dispatch(&mut self, event: &Event) -> bool {
        let ctx = self.component_ctx(true);
        if let Focus::Window(id) = &self.focus
            && !self.ctx.overlay().is_minimized(id)
            && let Some(content) = self.ctx.registry_mut().content_mut(id)
        {
            return content.handle_event(event, &ctx);
        }
        self.page_pane.handle_event(event, &ctx)
    }

    fn apply_hit(&mut self, hit: OverlayHit) {
        match hit {
            OverlayHit::ToggleMinimize(id) => {
                let minimized = self.ctx.toggle_minimize(&id);
                self.focus = if minimized {
                    Focus::Page
                } else {
                    Focus::Window(id)
                };
            }
            OverlayHit::Close(id) => self.close_window(&id),
            OverlayHit::Focus(id) => self.focus = Focus::Window(id),
        }
    }

    pub fn perform(&mut self, action: Action) {
        tracing::trace!(%action, "action");
        match action {
            Action::Quit => self.quit = true,
            Action::FocusNext => self.cycle_focus(true),
            Action::FocusPrev => self.cycle_focus(false),
            Action::ShowPage(page) => self.show_page(page),
            Action::ToggleMinimize => self.toggle_focused(),
            Action::CloseWindow => match &self.focus {
                Focus::Window(id) => {
                    let id = id.clone();
                    self.close_window(&id);
                }
                Focus::Page => self.status = Some(Notice::info("No window is focused.")),
            },
            Action::ToggleActivityLog => self.toggle_activity_log(),
            Action::Logout => self.logout(),
        }
    }

    fn focus_targets(&self) -> Vec<Focus> {
        std::iter::once(Focus::Page)
            .chain(self.ctx.registry().ids().into_iter().map(Focus::Window))
            .collect()
    }

    fn cycle_focus(&mut self, forward: bool) {
        let targets = self.focus_targets();
        let len = targets.len();
        let current = targets.iter().position(|t| *t == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.focus = targets[next].clone();
    }

    fn toggle_focused(&mut self) {
        let Focus::Window(id) = &self.focus else {
            self.status = Some(Notice::info("Focus a window with Tab first."));
            return;
        };
        let id = id.clone();
        match self.ctx.registry().get(&id).map(|w| w.mode()) {
            Some(WindowMode::Full) => {
                self.ctx.toggle_minimize(&id);
            }
            Some(WindowMode::Simple) => {
                self.status = Some(Notice::info("This window can only be closed."));
            }
            None => self.focus = Focus::Page,
        }
    }

    fn close_window(&mut self, id: &str) {
        match self.ctx.registry().get(id).map(|w| w.mode()) {
            Some(WindowMode::Simple) => {
                self.ctx.registry_mut().close(id);
                self.focus = Focus::Page;
            }
            Some(WindowMode::Full) => {
                self.status = Some(Notice::info("Minimize this window instead."));
            }
            None => {}
        }
    }

    fn toggle_activity_log(&mut self) {
        let id = WindowSpec::ActivityLog.id();
        if self.ctx.registry_mut().close(&id).is_some() {
            if self.focus == Focus::Window(id) {
                self.focus = Focus::Page;
            }
            return;
        }
        self.ctx.open(WindowSpec::ActivityLog);
        self.focus = Focus::Window(id);
    }

    fn logout(&mut self) {
        if self.ctx.user().is_none() {
            self.status = Some(Notice::info("Nobody is signed in."));
            return;
        }
        match self.ctx.logout() {
            Ok(()) => {
                tracing::info!("signed out");
                self.status = Some(Notice::info("Signed out."));
                self.show_page(Page::Login);
            }
            Err(err) => {
                tracing::warn!(error = %err, "sign out failed");
                self.status = Some(err.into());
            }
        }
    }

    /// Let panes refetch stale data, then carry out their window requests.
    pub fn tick(&mut self) {
        self.page_pane.tick();
        let mut requests = self.page_pane.take_requests();
        for id in self.ctx.registry().ids() {
            if let Some(content) = self.ctx.registry_mut().content_mut(&id) {
                content.tick();
                requests.extend(content.take_requests());
            }
        }

        let mut session_changed = false;
        for request in requests {
            let request = match request {
                WindowRequest::Notify(notice) => {
                    self.status = Some(notice);
                    continue;
                }
                other => other,
            };
            let opened = match &request {
                WindowRequest::Open(spec) => Some(spec.id()),
                _ => None,
            };
            session_changed |= self.ctx.apply(request);
            if let Some(id) = opened {
                self.focus = Focus::Window(id);
            }
        }
        if session_changed {
            let page = match (self.page, self.ctx.user()) {
                (Page::Login, Some(_)) => Page::Dashboard,
                (page, _) => page,
            };
            self.show_page(page);
        }

        if let Focus::Window(id) = &self.focus
            && !self.ctx.registry().contains(id)
        {
            self.focus = Focus::Page;
        }
    }

    pub fn draw(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        if area.width == 0 || area.height < 3 {
            return;
        }
        let tabs = Rect::new(area.x, area.y, area.width, 1);
        let body = Rect::new(area.x, area.y + 1, area.width, area.height - 2);
        let status = Rect::new(area.x, area.y + area.height - 1, area.width, 1);

        self.draw_tabs(frame, tabs);

        let page_focused = self.focus == Focus::Page;
        let ctx = self.component_ctx(page_focused);
        self.page_pane.render(frame, body, &ctx);

        self.layout = OverlayLayout::compute(body, self.ctx.registry(), self.ctx.overlay());
        let (registry, _) = self.ctx.parts_mut();
        for placement in self.layout.placements() {
            let focused = self.focus == Focus::Window(placement.id.clone());
            self.decorator.render(frame, placement, focused);
            if placement.is_panel()
                && let Some(content) = registry.content_mut(&placement.id)
            {
                let ctx = ComponentContext::new(focused, self.today);
                content.render(frame, placement.content_rect(), &ctx);
            }
        }

        self.draw_status(frame, status);
    }

    fn draw_tabs(&self, frame: &mut UiFrame<'_>, area: Rect) {
        frame.set_line(
            area.x,
            area.y,
            &" ".repeat(area.width as usize),
            theme::status_bar(),
        );
        let mut x = area.x;
        for (index, page) in Page::ALL.into_iter().enumerate() {
            let label = format!(" F{} {} ", index + 1, page.title());
            frame.set_line(x, area.y, &label, theme::tab(page == self.page));
            x = x.saturating_add(label.chars().count() as u16 + 1);
        }
        if let Some(user) = self.ctx.user() {
            let who = format!(" {} ", user.name);
            let len = who.chars().count() as u16;
            if area.width > x.saturating_sub(area.x) + len {
                frame.set_line(area.x + area.width - len, area.y, &who, theme::status_bar());
            }
        }
    }

    fn draw_status(&self, frame: &mut UiFrame<'_>, area: Rect) {
        frame.set_line(
            area.x,
            area.y,
            &" ".repeat(area.width as usize),
            theme::status_bar(),
        );
        if let Some(notice) = &self.status {
            let style = if notice.is_error() {
                theme::error()
            } else {
                theme::status_bar()
            };
            frame.set_line(area.x + 1, area.y, notice.text(), style);
            return;
        }
        let hints = match &self.focus {
            Focus::Window(id) => self
                .ctx
                .registry()
                .get(id)
                .map(|w| w.content().hints())
                .unwrap_or_default(),
            Focus::Page => self.page_pane.hints(),
        };
        let mut line = String::from("Ctrl+Q quit  Tab focus  F9 minimize  F10 close");
        if !hints.is_empty() {
            line = format!("{hints}  |  {line}");
        }
        frame.set_line(area.x + 1, area.y, &line, theme::status_bar());
    }

    /// Drop the transient status message. Every key press does this.
    pub fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;

    use super::*;
    use crate::backend::{MemoryBackend, Seed};
    use crate::components::testing::{key, typed};
    use crate::storage::MemoryStorage;
    use crate::ui::buffer_text;

    fn app() -> DeskApp {
        let mut ctx = AppContext::new(
            Rc::new(MemoryBackend::new(Seed::demo().unwrap())),
            Rc::new(MemoryStorage::new()),
        );
        ctx.sync_session_windows();
        ctx.mount_overlay();
        DeskApp::with_today(ctx, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    fn draw(app: &mut DeskApp) -> String {
        let area = Rect::new(0, 0, 120, 40);
        let mut buffer = Buffer::empty(area);
        app.draw(&mut UiFrame::from_parts(area, &mut buffer));
        buffer_text(&buffer)
    }

    fn send(app: &mut DeskApp, events: &[Event]) {
        for e in events {
            app.handle_event(e);
        }
        app.tick();
    }

    fn sign_in(app: &mut DeskApp) {
        let mut events = typed("demo@hotel.test");
        events.push(key(KeyCode::Down));
        events.extend(typed("demo"));
        events.push(key(KeyCode::Enter));
        send(app, &events);
    }

    fn click(app: &mut DeskApp, column: u16, row: u16) {
        app.handle_event(&Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }));
    }

    #[test]
    fn starts_on_login_page_when_signed_out() {
        let mut app = app();
        assert_eq!(app.page(), Page::Login);
        let screen = draw(&mut app);
        assert!(screen.contains("F5 Account"));
        assert!(screen.contains("+ Contact Us"));
    }

    #[test]
    fn signing_in_opens_guest_windows_and_shows_dashboard() {
        let mut app = app();
        sign_in(&mut app);
        assert_eq!(app.page(), Page::Dashboard);
        assert_eq!(
            app.context().registry().ids(),
            vec!["contact", "reservations", "services"]
        );
        // Opened after the overlay mounted, so they start expanded.
        assert!(!app.context().overlay().is_minimized("services"));
        assert!(app.context().overlay().is_minimized("contact"));
        let screen = draw(&mut app);
        assert!(screen.contains("My Reservations"));
        assert!(screen.contains("Welcome back"));
    }

    #[test]
    fn function_keys_switch_pages() {
        let mut app = app();
        app.handle_event(&key(KeyCode::F(2)));
        assert_eq!(app.page(), Page::Rooms);
        app.handle_event(&Event::Key(KeyEvent::new(
            KeyCode::Char('4'),
            KeyModifiers::ALT,
        )));
        assert_eq!(app.page(), Page::Reviews);
    }

    #[test]
    fn tab_cycles_through_windows_and_back_to_page() {
        let mut app = app();
        sign_in(&mut app);
        app.handle_event(&key(KeyCode::Tab));
        assert_eq!(app.focused_window(), Some("contact"));
        app.handle_event(&key(KeyCode::BackTab));
        assert_eq!(app.focused_window(), None);
        app.handle_event(&key(KeyCode::BackTab));
        assert_eq!(app.focused_window(), Some("services"));
    }

    #[test]
    fn f9_toggles_focused_full_window() {
        let mut app = app();
        app.handle_event(&key(KeyCode::Tab));
        assert_eq!(app.focused_window(), Some("contact"));
        app.handle_event(&key(KeyCode::F(9)));
        assert!(!app.context().overlay().is_minimized("contact"));
        app.handle_event(&key(KeyCode::F(9)));
        assert!(app.context().overlay().is_minimized("contact"));
    }

    #[test]
    fn clicking_a_bubble_restores_and_focuses_window() {
        let mut app = app();
        draw(&mut app);
        let bubble = app
            .layout()
            .placements()
            .iter()
            .find(|p| p.id == "contact")
            .map(|p| p.rect)
            .unwrap();
        click(&mut app, bubble.x + 1, bubble.y);
        assert!(!app.context().overlay().is_minimized("contact"));
        assert_eq!(app.focused_window(), Some("contact"));
    }

    #[test]
    fn reserving_a_room_opens_simple_window_that_closes_with_f10() {
        let mut app = app();
        sign_in(&mut app);
        app.handle_event(&key(KeyCode::F(2)));
        send(&mut app, &[key(KeyCode::Down), key(KeyCode::Char('r'))]);
        assert_eq!(app.focused_window(), Some("reservation-2"));
        assert_eq!(
            app.context().registry().get("reservation-2").map(|w| w.mode()),
            Some(WindowMode::Simple)
        );
        app.handle_event(&key(KeyCode::F(10)));
        assert!(!app.context().registry().contains("reservation-2"));
        assert_eq!(app.focused_window(), None);
    }

    #[test]
    fn booking_notice_outlives_the_closed_form() {
        let mut app = app();
        sign_in(&mut app);
        app.handle_event(&key(KeyCode::F(2)));
        send(&mut app, &[key(KeyCode::Down), key(KeyCode::Char('r'))]);
        let mut events = typed("2026-10-20");
        events.push(key(KeyCode::Down));
        events.extend(typed("2026-10-22"));
        events.push(key(KeyCode::Enter));
        send(&mut app, &events);

        assert!(!app.context().registry().contains("reservation-2"));
        assert_eq!(
            app.status().map(|n| n.text()),
            Some("Reservation #3 created.")
        );
        assert!(draw(&mut app).contains("Reservation #3 created."));
    }

    #[test]
    fn full_windows_cannot_be_closed() {
        let mut app = app();
        app.handle_event(&key(KeyCode::Tab));
        app.handle_event(&key(KeyCode::F(10)));
        assert!(app.context().registry().contains("contact"));
        assert_eq!(
            app.status().map(|n| n.text()),
            Some("Minimize this window instead.")
        );
    }

    #[test]
    fn logout_closes_guest_windows() {
        let mut app = app();
        sign_in(&mut app);
        app.handle_event(&key(KeyCode::F(11)));
        assert_eq!(app.context().registry().ids(), vec!["contact"]);
        assert_eq!(app.page(), Page::Login);
        assert!(app.context().user().is_none());
    }

    #[test]
    fn activity_log_toggles() {
        let mut app = app();
        app.handle_event(&key(KeyCode::F(12)));
        assert_eq!(app.focused_window(), Some("activity-log"));
        assert!(!app.context().overlay().is_minimized("activity-log"));
        app.handle_event(&key(KeyCode::F(12)));
        assert!(!app.context().registry().contains("activity-log"));
        assert_eq!(app.focused_window(), None);
    }

    #[test]
    fn ctrl_q_quits() {
        let mut app = app();
        app.handle_event(&Event::Key(KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }
}
