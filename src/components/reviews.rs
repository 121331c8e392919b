use std::collections::HashMap;

use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;

use crate::broadcast::{DataChanged, RefreshFlag, Subscription};
use crate::components::{
    Component, ComponentContext, ListComponent, Notice, TextField, key_press,
};
use crate::context::PaneDeps;
use crate::error::{DeskError, Result};
use crate::model::{MAX_RATING, MIN_RATING, NewReview};
use crate::theme;
use crate::ui::UiFrame;

/// Guest reviews plus a one-line composer. Left/Right set the rating,
/// typing edits the comment, Enter posts.
pub struct ReviewsPane {
    deps: PaneDeps,
    list: ListComponent,
    comment: TextField,
    rating: u8,
    notice: Option<Notice>,
    refresh: RefreshFlag,
    _subscription: Subscription,
}

impl ReviewsPane {
    pub fn new(deps: PaneDeps) -> Self {
        let refresh = RefreshFlag::new();
        let subscription = refresh.listen(&deps.channel);
        let mut pane = Self {
            deps,
            list: ListComponent::new("No reviews yet. Be the first!"),
            comment: TextField::new("Comment"),
            rating: MAX_RATING,
            notice: None,
            refresh,
            _subscription: subscription,
        };
        pane.reload();
        pane
    }

    fn reload(&mut self) {
        match self.rows() {
            Ok(rows) => self.list.set_items(rows),
            Err(err) => {
                tracing::warn!(%err, "review refresh failed");
                self.notice = Some(err.into());
            }
        }
    }

    fn rows(&self) -> Result<Vec<String>> {
        let names: HashMap<u64, String> = self
            .deps
            .backend
            .users()?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();
        Ok(self
            .deps
            .backend
            .reviews()?
            .iter()
            .map(|review| {
                let author = names
                    .get(&review.user_id)
                    .map_or("guest", String::as_str);
                format!("{:<5} {author}: {}", review.stars(), review.comment)
            })
            .collect())
    }

    fn post(&mut self) -> Result<()> {
        let user_id = self
            .deps
            .session
            .borrow()
            .user_id()
            .ok_or(DeskError::NotSignedIn)?;
        self.deps.backend.add_review(NewReview {
            user_id,
            comment: self.comment.value().to_string(),
            rating: self.rating,
        })?;
        self.deps.channel.emit(DataChanged);
        Ok(())
    }
}

impl Component for ReviewsPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height < 4 {
            return;
        }
        frame.set_line(area.x, area.y, "What our guests say", theme::tab(false));
        let body = Rect::new(
            area.x,
            area.y.saturating_add(2),
            area.width,
            area.height.saturating_sub(5),
        );
        self.list.render(frame, body, ctx);

        let composer_y = area.bottom().saturating_sub(2);
        let stars = format!(
            "{}{}",
            "*".repeat(self.rating as usize),
            ".".repeat((MAX_RATING - self.rating) as usize)
        );
        frame.set_line(area.x, composer_y, &format!("[{stars}]"), theme::bubble(false));
        self.comment
            .render(frame, area.x.saturating_add(8), composer_y, ctx.focused());
        if let Some(notice) = &self.notice {
            notice.render(frame, area.x, area.bottom().saturating_sub(1));
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        let Some(key) = key_press(event) else {
            return self.list.handle_event(event, ctx);
        };
        match key.code {
            KeyCode::Left => self.rating = self.rating.saturating_sub(1).max(MIN_RATING),
            KeyCode::Right => self.rating = (self.rating + 1).min(MAX_RATING),
            KeyCode::Enter => match self.post() {
                Ok(()) => {
                    self.comment.clear();
                    self.rating = MAX_RATING;
                    self.notice = Some(Notice::info("Thanks for your review!"));
                }
                Err(err) => self.notice = Some(err.into()),
            },
            _ if self.comment.handle_key(key) => {}
            _ => return self.list.handle_event(event, ctx),
        }
        true
    }

    fn tick(&mut self) {
        if self.refresh.take() {
            self.reload();
        }
    }

    fn hints(&self) -> &str {
        "type comment  Left/Right rating  Enter post"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Seed};
    use crate::components::testing::{key, render, send, typed};
    use crate::context::AppContext;
    use crate::storage::MemoryStorage;
    use std::rc::Rc;

    fn app() -> AppContext {
        AppContext::new(
            Rc::new(MemoryBackend::new(Seed::demo().unwrap())),
            Rc::new(MemoryStorage::new()),
        )
    }

    #[test]
    fn lists_reviews_with_author_names() {
        let app = app();
        let mut pane = ReviewsPane::new(app.deps().clone());
        let screen = render(&mut pane, 70, 8);
        assert!(screen.contains("***** demo: Quiet rooms"));
        assert!(screen.contains("****  ana: Friendly staff"));
    }

    #[test]
    fn posting_requires_sign_in() {
        let app = app();
        let mut pane = ReviewsPane::new(app.deps().clone());
        send(&mut pane, &typed("lovely"));
        send(&mut pane, &[key(KeyCode::Enter)]);
        assert_eq!(pane.notice, Some(Notice::from(DeskError::NotSignedIn)));
        assert_eq!(pane.comment.value(), "lovely");
    }

    #[test]
    fn posted_review_appears_after_refresh() {
        let mut app = app();
        app.login("ana@hotel.test", "ana").unwrap();
        let mut pane = ReviewsPane::new(app.deps().clone());
        send(&mut pane, &typed("Great view"));
        send(&mut pane, &[key(KeyCode::Left), key(KeyCode::Left), key(KeyCode::Enter)]);
        assert_eq!(pane.comment.value(), "");
        pane.tick();
        assert_eq!(pane.list.len(), 3);
        assert!(pane.list.items()[2].starts_with("***   ana: Great view"));
    }

    #[test]
    fn empty_comment_is_rejected() {
        let mut app = app();
        app.login("ana@hotel.test", "ana").unwrap();
        let mut pane = ReviewsPane::new(app.deps().clone());
        send(&mut pane, &[key(KeyCode::Enter)]);
        assert!(pane.notice.as_ref().is_some_and(Notice::is_error));
    }
}
