//! Client-side key-value storage and the per-user service cart kept in it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::broadcast::{DataChanged, UpdateChannel};
use crate::error::Result;
use crate::model::Service;

pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage persisted as one JSON object. Every write rewrites the file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open `path`, treating a missing file as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "file storage opened");
        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&*self.entries.borrow())?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed {
            self.persist()?;
        }
        Ok(())
    }
}

pub fn services_key(user_id: u64) -> String {
    format!("services-{user_id}")
}

/// The ancillary services one guest has picked, kept in [`Storage`].
///
/// Every successful write broadcasts [`DataChanged`].
pub struct ServiceCart {
    storage: Rc<dyn Storage>,
    channel: UpdateChannel,
    user_id: u64,
}

impl ServiceCart {
    pub fn new(storage: Rc<dyn Storage>, channel: UpdateChannel, user_id: u64) -> Self {
        Self {
            storage,
            channel,
            user_id,
        }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn selected(&self) -> Result<Vec<Service>> {
        match self.storage.get(&services_key(self.user_id))? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn contains(&self, service_id: u64) -> Result<bool> {
        Ok(self.selected()?.iter().any(|s| s.id == service_id))
    }

    /// Add `service` unless it is already selected.
    pub fn add(&self, service: Service) -> Result<bool> {
        let mut selected = self.selected()?;
        if selected.iter().any(|s| s.id == service.id) {
            return Ok(false);
        }
        tracing::info!(user = self.user_id, service = service.id, "service added");
        selected.push(service);
        self.store(&selected)?;
        Ok(true)
    }

    pub fn remove(&self, service_id: u64) -> Result<bool> {
        let mut selected = self.selected()?;
        let before = selected.len();
        selected.retain(|s| s.id != service_id);
        if selected.len() == before {
            return Ok(false);
        }
        tracing::info!(user = self.user_id, service = service_id, "service removed");
        self.store(&selected)?;
        Ok(true)
    }

    pub fn total(&self) -> Result<u64> {
        Ok(self.selected()?.iter().map(|s| s.price).sum())
    }

    fn store(&self, selected: &[Service]) -> Result<()> {
        let text = serde_json::to_string(selected)?;
        self.storage.set(&services_key(self.user_id), &text)?;
        self.channel.emit(DataChanged);
        Ok(())
    }
}
