use super::{Window, WindowMode};

/// Ordered collection of open windows, unique by id.
///
/// All mutation goes through [`open`](Self::open), [`close`](Self::close) and
/// [`close_all`](Self::close_all); readers get a shared slice from
/// [`list`](Self::list).
#[derive(Debug, Clone)]
pub struct WindowRegistry<T> {
    windows: Vec<Window<T>>,
}

impl<T> Default for WindowRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WindowRegistry<T> {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
        }
    }

    /// Insert a window, or replace title, content and mode of the window that
    /// already has `id`. A replaced window keeps its position.
    pub fn open(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        content: T,
        mode: WindowMode,
    ) {
        let id = id.into();
        let title = title.into();
        if let Some(existing) = self.windows.iter_mut().find(|w| w.id == id) {
            tracing::debug!(id = %id, %mode, "window replaced");
            existing.title = title;
            existing.content = content;
            existing.mode = mode;
            return;
        }
        tracing::debug!(id = %id, %mode, "window opened");
        self.windows.push(Window::new(id, title, content, mode));
    }

    pub fn open_full(&mut self, id: impl Into<String>, title: impl Into<String>, content: T) {
        self.open(id, title, content, WindowMode::Full);
    }

    /// Remove the window with `id`. Unknown ids are a no-op.
    pub fn close(&mut self, id: &str) -> Option<Window<T>> {
        let index = self.windows.iter().position(|w| w.id == id)?;
        tracing::debug!(id, "window closed");
        Some(self.windows.remove(index))
    }

    pub fn close_all(&mut self) {
        if !self.windows.is_empty() {
            tracing::debug!(count = self.windows.len(), "closing all windows");
        }
        self.windows.clear();
    }

    pub fn list(&self) -> &[Window<T>] {
        &self.windows
    }

    pub fn get(&self, id: &str) -> Option<&Window<T>> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Mutable access to one window's content. The sequence itself stays
    /// closed to outside mutation.
    pub fn content_mut(&mut self, id: &str) -> Option<&mut T> {
        self.windows
            .iter_mut()
            .find(|w| w.id == id)
            .map(|w| &mut w.content)
    }

    pub fn ids(&self) -> Vec<String> {
        self.windows.iter().map(|w| w.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles<'a>(reg: &'a WindowRegistry<&'static str>) -> Vec<&'a str> {
        reg.list().iter().map(|w| w.title()).collect()
    }

    #[test]
    fn reopening_an_id_replaces_in_place() {
        let mut reg = WindowRegistry::new();
        reg.open("a", "Room", "X", WindowMode::Full);
        reg.open("b", "Services", "S", WindowMode::Full);
        reg.open("a", "Room2", "Y", WindowMode::Simple);

        assert_eq!(reg.len(), 2);
        assert_eq!(titles(&reg), vec!["Room2", "Services"]);
        let a = reg.get("a").unwrap();
        assert_eq!(*a.content(), "Y");
        assert_eq!(a.mode(), WindowMode::Simple);
    }

    #[test]
    fn open_then_close_restores_previous_state() {
        let mut reg = WindowRegistry::new();
        reg.open_full("a", "A", "1");
        reg.open_full("b", "B", "2");
        let before = reg.ids();

        reg.open("c", "C", "3", WindowMode::Simple);
        let closed = reg.close("c").expect("c was open");
        assert_eq!(closed.into_content(), "3");
        assert_eq!(reg.ids(), before);
    }

    #[test]
    fn close_unknown_id_is_noop() {
        let mut reg: WindowRegistry<()> = WindowRegistry::new();
        reg.open_full("a", "A", ());
        assert!(reg.close("missing").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn close_all_empties() {
        let mut reg = WindowRegistry::new();
        reg.open("b", "Srv", "Z", WindowMode::Simple);
        reg.open_full("a", "Room", "X");
        reg.close_all();
        assert!(reg.list().is_empty());
        assert!(reg.is_empty());
    }

    #[test]
    fn content_mut_forwards_to_caller_content() {
        let mut reg = WindowRegistry::new();
        reg.open_full("counter", "Counter", 0u32);
        *reg.content_mut("counter").unwrap() += 5;
        assert_eq!(*reg.get("counter").unwrap().content(), 5);
        assert!(reg.content_mut("nope").is_none());
    }

    #[test]
    fn replaced_content_is_dropped() {
        use std::rc::Rc;
        let first = Rc::new(());
        let mut reg = WindowRegistry::new();
        reg.open_full("a", "A", Rc::clone(&first));
        assert_eq!(Rc::strong_count(&first), 2);
        reg.open_full("a", "A", Rc::new(()));
        assert_eq!(Rc::strong_count(&first), 1);
    }
}
