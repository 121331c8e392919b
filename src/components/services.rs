use std::collections::HashSet;

use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::broadcast::{RefreshFlag, Subscription};
use crate::components::{Component, ComponentContext, ListComponent, Notice, key_press};
use crate::context::PaneDeps;
use crate::error::{DeskError, Result};
use crate::model::Service;
use crate::theme;
use crate::ui::UiFrame;

/// The "My Services" window: the service catalogue with the guest's picks
/// checked. Space or Enter toggles the selected service.
pub struct ServicesPane {
    deps: PaneDeps,
    catalogue: Vec<Service>,
    chosen: HashSet<u64>,
    total: u64,
    list: ListComponent,
    notice: Option<Notice>,
    refresh: RefreshFlag,
    _subscription: Subscription,
}

impl ServicesPane {
    pub fn new(deps: PaneDeps) -> Self {
        let refresh = RefreshFlag::new();
        let subscription = refresh.listen(&deps.channel);
        let mut pane = Self {
            deps,
            catalogue: Vec::new(),
            chosen: HashSet::new(),
            total: 0,
            list: ListComponent::new("No services offered."),
            notice: None,
            refresh,
            _subscription: subscription,
        };
        pane.reload();
        pane
    }

    fn reload(&mut self) {
        if let Err(err) = self.load() {
            tracing::warn!(%err, "service refresh failed");
            self.notice = Some(err.into());
        }
    }

    fn load(&mut self) -> Result<()> {
        self.catalogue = self.deps.backend.services()?;
        let selected = match self.deps.cart() {
            Some(cart) => cart.selected()?,
            None => Vec::new(),
        };
        self.chosen = selected.iter().map(|s| s.id).collect();
        self.total = selected.iter().map(|s| s.price).sum();
        let rows = self
            .catalogue
            .iter()
            .map(|s| {
                let mark = if self.chosen.contains(&s.id) { "x" } else { " " };
                format!("[{mark}] {:<18} ${:>3}  {}", s.name, s.price, s.description)
            })
            .collect();
        self.list.set_items(rows);
        Ok(())
    }

    fn toggle_selected(&mut self) -> Result<String> {
        let cart = self.deps.cart().ok_or(DeskError::NotSignedIn)?;
        let Some(service) = self
            .list
            .selection()
            .and_then(|i| self.catalogue.get(i))
            .cloned()
        else {
            return Ok(String::new());
        };
        if cart.contains(service.id)? {
            cart.remove(service.id)?;
            Ok(format!("{} removed.", service.name))
        } else {
            let name = service.name.clone();
            cart.add(service)?;
            Ok(format!("{name} added."))
        }
    }
}

impl Component for ServicesPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height < 2 {
            return;
        }
        let body = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(2));
        self.list.render(frame, body, ctx);
        let total_y = area.bottom().saturating_sub(2);
        frame.set_line(
            area.x,
            total_y,
            &format!("Services total: ${}", self.total),
            Style::default().add_modifier(Modifier::BOLD),
        );
        let footer = area.bottom().saturating_sub(1);
        match &self.notice {
            Some(notice) => notice.render(frame, area.x, footer),
            None if self.deps.user().is_none() => {
                frame.set_line(area.x, footer, "Sign in to pick services.", theme::muted())
            }
            None => {}
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        if let Some(key) = key_press(event)
            && matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
        {
            self.notice = Some(match self.toggle_selected() {
                Ok(message) => Notice::Info(message),
                Err(err) => err.into(),
            });
            return true;
        }
        self.list.handle_event(event, ctx)
    }

    fn tick(&mut self) {
        if self.refresh.take() {
            self.reload();
        }
    }

    fn hints(&self) -> &str {
        "Up/Down select  Space add/remove"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Seed};
    use crate::components::testing::{key, render, send};
    use crate::context::AppContext;
    use crate::storage::{MemoryStorage, services_key};
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
    fn toggling_writes_cart_and_refreshes() {
        let app = signed_in();
        let mut pane = ServicesPane::new(app.deps().clone());
        send(&mut pane, &[key(KeyCode::Down), key(KeyCode::Char(' '))]);
        assert_eq!(pane.notice, Some(Notice::info("Spa access added.")));
        assert!(
            app.deps()
                .storage
                .get(&services_key(1))
                .unwrap()
                .is_some_and(|s| s.contains("Spa access"))
        );
        pane.tick();
        assert_eq!(pane.total, 40);
        let screen = render(&mut pane, 70, 8);
        assert!(screen.contains("[x] Spa access"));
        assert!(screen.contains("Services total: $40"));

        send(&mut pane, &[key(KeyCode::Enter)]);
        pane.tick();
        assert_eq!(pane.total, 0);
        assert!(pane.chosen.is_empty());
    }

    #[test]
    fn signed_out_cannot_pick() {
        let app = AppContext::new(
            Rc::new(MemoryBackend::new(Seed::demo().unwrap())),
            Rc::new(MemoryStorage::new()),
        );
        let mut pane = ServicesPane::new(app.deps().clone());
        send(&mut pane, &[key(KeyCode::Enter)]);
        assert_eq!(pane.notice, Some(Notice::from(DeskError::NotSignedIn)));
    }
}
