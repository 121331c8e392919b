use std::rc::Rc;

use crate::backend::Backend;
use crate::error::{DeskError, Result};
use crate::model::{NewUser, User};
use crate::storage::Storage;

pub const SESSION_KEY: &str = "session-user";

/// The signed-in guest, remembered in [`Storage`] between runs.
pub struct Session {
    storage: Rc<dyn Storage>,
    user: Option<User>,
}

impl Session {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self {
            storage,
            user: None,
        }
    }

    /// Reload the remembered user. A corrupt entry is discarded.
    pub fn restore(&mut self) -> Result<Option<&User>> {
        self.user = match self.storage.get(SESSION_KEY)? {
            Some(text) => match serde_json::from_str(&text) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::warn!(%err, "discarding unreadable session");
                    self.storage.remove(SESSION_KEY)?;
                    None
                }
            },
            None => None,
        };
        Ok(self.user.as_ref())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<u64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn login(&mut self, backend: &dyn Backend, email: &str, password: &str) -> Result<&User> {
        let user = backend
            .users()?
            .into_iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(DeskError::InvalidCredentials)?;
        tracing::info!(user = user.id, "signed in");
        self.remember(user)
    }

    pub fn register(
        &mut self,
        backend: &dyn Backend,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&User> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(DeskError::invalid("name, email and password are required"));
        }
        let user = backend.register_user(NewUser {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        tracing::info!(user = user.id, "registered and signed in");
        self.remember(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(user) = self.user.take() {
            tracing::info!(user = user.id, "signed out");
        }
        self.storage.remove(SESSION_KEY)
    }

    fn remember(&mut self, user: User) -> Result<&User> {
        self.storage
            .set(SESSION_KEY, &serde_json::to_string(&user)?)?;
        Ok(self.user.insert(user))
    }
}
