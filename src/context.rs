//! Application context: the window registry, its minimization overlay and
//! the update channel, plus the collaborators panes are built from.
//!
//! One `AppContext` is created at startup and handed down explicitly; there
//! is no process-wide instance.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::Backend;
use crate::booking::ReservationDesk;
use crate::broadcast::UpdateChannel;
use crate::components::{
    ActivityLogPane, ContactPane, ReservationFormPane, ReservationsPane, ServicesPane,
    WindowContent, WindowRequest, global_activity_log,
};
use crate::error::Result;
use crate::model::User;
use crate::session::Session;
use crate::storage::{ServiceCart, Storage};
use crate::window::{MinimizeOverlay, WindowMode, WindowRegistry};

/// Windows the application knows how to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpec {
    Reservations,
    Services,
    Contact,
    ActivityLog,
    ReservationForm { room_id: u64 },
}

impl WindowSpec {
    pub fn id(&self) -> String {
        match self {
            WindowSpec::Reservations => "reservations".to_string(),
            WindowSpec::Services => "services".to_string(),
            WindowSpec::Contact => "contact".to_string(),
            WindowSpec::ActivityLog => "activity-log".to_string(),
            WindowSpec::ReservationForm { room_id } => format!("reservation-{room_id}"),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WindowSpec::Reservations => "My Reservations",
            WindowSpec::Services => "My Services",
            WindowSpec::Contact => "Contact Us",
            WindowSpec::ActivityLog => "Activity Log",
            WindowSpec::ReservationForm { .. } => "New reservation",
        }
    }

    pub fn mode(&self) -> WindowMode {
        match self {
            WindowSpec::ReservationForm { .. } => WindowMode::Simple,
            _ => WindowMode::Full,
        }
    }
}

/// Handles a pane needs to load data and perform writes.
#[derive(Clone)]
pub struct PaneDeps {
    pub backend: Rc<dyn Backend>,
    pub storage: Rc<dyn Storage>,
    pub channel: UpdateChannel,
    pub session: Rc<RefCell<Session>>,
}

impl PaneDeps {
    pub fn user(&self) -> Option<User> {
        self.session.borrow().user().cloned()
    }

    pub fn desk(&self) -> ReservationDesk {
        ReservationDesk::new(self.backend.clone(), self.channel.clone())
    }

    /// The signed-in guest's service cart, if anyone is signed in.
    pub fn cart(&self) -> Option<ServiceCart> {
        let user_id = self.session.borrow().user_id()?;
        Some(ServiceCart::new(
            self.storage.clone(),
            self.channel.clone(),
            user_id,
        ))
    }
}

pub struct AppContext {
    registry: WindowRegistry<WindowContent>,
    overlay: MinimizeOverlay,
    deps: PaneDeps,
}

impl AppContext {
    pub fn new(backend: Rc<dyn Backend>, storage: Rc<dyn Storage>) -> Self {
        let session = Rc::new(RefCell::new(Session::new(storage.clone())));
        Self {
            registry: WindowRegistry::new(),
            overlay: MinimizeOverlay::new(),
            deps: PaneDeps {
                backend,
                storage,
                channel: UpdateChannel::new(),
                session,
            },
        }
    }

    pub fn registry(&self) -> &WindowRegistry<WindowContent> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WindowRegistry<WindowContent> {
        &mut self.registry
    }

    pub fn overlay(&self) -> &MinimizeOverlay {
        &self.overlay
    }

    /// Split borrow for drawing: panes render mutably while the overlay
    /// state is read.
    pub fn parts_mut(&mut self) -> (&mut WindowRegistry<WindowContent>, &MinimizeOverlay) {
        (&mut self.registry, &self.overlay)
    }

    pub fn channel(&self) -> &UpdateChannel {
        &self.deps.channel
    }

    pub fn deps(&self) -> &PaneDeps {
        &self.deps
    }

    pub fn user(&self) -> Option<User> {
        self.deps.user()
    }

    pub fn restore_session(&mut self) -> Result<Option<User>> {
        Ok(self.deps.session.borrow_mut().restore()?.cloned())
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self
            .deps
            .session
            .borrow_mut()
            .login(self.deps.backend.as_ref(), email, password)?
            .clone();
        self.sync_session_windows();
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.deps.session.borrow_mut().logout()?;
        self.sync_session_windows();
        Ok(())
    }

    /// Seed the minimized set from the windows open right now. Only the
    /// first call has an effect.
    pub fn mount_overlay(&mut self) {
        self.overlay.mount(&self.registry);
    }

    pub fn toggle_minimize(&mut self, id: &str) -> bool {
        self.overlay.toggle(id)
    }

    pub fn build(&self, spec: WindowSpec) -> WindowContent {
        let deps = self.deps.clone();
        match spec {
            WindowSpec::Reservations => Box::new(ReservationsPane::new(deps)),
            WindowSpec::Services => Box::new(ServicesPane::new(deps)),
            WindowSpec::Contact => Box::new(ContactPane::new(deps)),
            WindowSpec::ReservationForm { room_id } => {
                Box::new(ReservationFormPane::new(deps, room_id))
            }
            WindowSpec::ActivityLog => match global_activity_log() {
                Some(handle) => Box::new(ActivityLogPane::from_handle(handle)),
                None => Box::new(ActivityLogPane::new_default().0),
            },
        }
    }

    fn title_for(&self, spec: WindowSpec) -> String {
        if let WindowSpec::ReservationForm { room_id } = spec
            && let Ok(room) = self.deps.backend.room(room_id)
        {
            return format!("Reserve {}", room.label());
        }
        spec.title().to_string()
    }

    pub fn open(&mut self, spec: WindowSpec) {
        let content = self.build(spec);
        let title = self.title_for(spec);
        self.registry.open(spec.id(), title, content, spec.mode());
    }

    /// Reconcile the standing windows with the session: a signed-in guest
    /// gets reservations, services and contact; a guest who is signed out
    /// keeps only contact.
    pub fn sync_session_windows(&mut self) {
        if self.user().is_some() {
            for spec in [
                WindowSpec::Reservations,
                WindowSpec::Services,
                WindowSpec::Contact,
            ] {
                self.open(spec);
            }
        } else {
            self.registry.close_all();
            self.open(WindowSpec::Contact);
        }
        tracing::debug!(windows = self.registry.len(), "session windows synced");
    }

    /// Carry out a pane request. Returns `true` when the session changed.
    pub fn apply(&mut self, request: WindowRequest) -> bool {
        match request {
            WindowRequest::Open(spec) => {
                self.open(spec);
                false
            }
            WindowRequest::Close(id) => {
                self.registry.close(&id);
                false
            }
            WindowRequest::SessionChanged => {
                self.sync_session_windows();
                true
            }
            WindowRequest::Notify(_) => false,
        }
    }
}
