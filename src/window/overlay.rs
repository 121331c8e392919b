//! Minimization overlay: presentation-only state layered over the registry.
//!
//! Minimizing never touches the [`WindowRegistry`]; it only flips membership
//! of an id in the [`MinimizedSet`]. The two views split the registry by
//! [`WindowMode`], so every window is rendered by exactly one of them.

use std::collections::HashSet;

use super::{Window, WindowMode, WindowRegistry};

/// Ids currently collapsed to a bubble. Ids that are no longer open are
/// harmless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinimizedSet {
    ids: HashSet<String>,
}

impl MinimizedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`; returns whether it is minimized afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Overlay state owned by the full view.
///
/// On first mount every window that is already open starts minimized; later
/// mounts leave the set alone.
#[derive(Debug, Default)]
pub struct MinimizeOverlay {
    minimized: MinimizedSet,
    mounted: bool,
}

impl MinimizeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount<T>(&mut self, registry: &WindowRegistry<T>) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        for window in registry.list() {
            self.minimized.insert(window.id());
        }
        tracing::debug!(seeded = self.minimized.len(), "minimize overlay mounted");
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let minimized = self.minimized.toggle(id);
        tracing::debug!(id, minimized, "window minimize toggled");
        minimized
    }

    pub fn is_minimized(&self, id: &str) -> bool {
        self.minimized.contains(id)
    }

    pub fn minimized(&self) -> &MinimizedSet {
        &self.minimized
    }
}

/// A `Full` window as seen by the full view. The bubble is always shown;
/// the expanded panel only when `minimized` is false.
#[derive(Debug)]
pub struct FullPanel<'a, T> {
    pub window: &'a Window<T>,
    pub minimized: bool,
}

impl<T> FullPanel<'_, T> {
    pub fn expanded(&self) -> bool {
        !self.minimized
    }
}

impl<T> Clone for FullPanel<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FullPanel<'_, T> {}

pub fn full_view<'a, T>(
    registry: &'a WindowRegistry<T>,
    minimized: &MinimizedSet,
) -> Vec<FullPanel<'a, T>> {
    registry
        .list()
        .iter()
        .filter(|w| w.mode() == WindowMode::Full)
        .map(|window| FullPanel {
            window,
            minimized: minimized.contains(window.id()),
        })
        .collect()
}

pub fn simple_view<T>(registry: &WindowRegistry<T>) -> Vec<&Window<T>> {
    registry
        .list()
        .iter()
        .filter(|w| w.mode() == WindowMode::Simple)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> WindowRegistry<()> {
        let mut reg = WindowRegistry::new();
        reg.open("reservations", "My Reservations", (), WindowMode::Full);
        reg.open("reservation-3", "Reserve", (), WindowMode::Simple);
        reg.open("services", "My Services", (), WindowMode::Full);
        reg.open("reservation-5", "Reserve", (), WindowMode::Simple);
        reg
    }

    #[test]
    fn views_partition_the_registry() {
        let reg = populated();
        let set = MinimizedSet::new();
        let full: Vec<&str> = full_view(&reg, &set).iter().map(|p| p.window.id()).collect();
        let simple: Vec<&str> = simple_view(&reg).iter().map(|w| w.id()).collect();
        assert_eq!(full, vec!["reservations", "services"]);
        assert_eq!(simple, vec!["reservation-3", "reservation-5"]);
        for w in reg.list() {
            let in_full = full.contains(&w.id());
            let in_simple = simple.contains(&w.id());
            assert!(in_full ^ in_simple, "{} rendered by both or neither", w.id());
        }
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut set = MinimizedSet::new();
        assert!(set.toggle("a"));
        assert!(!set.toggle("a"));
        assert!(!set.contains("a"));
        set.insert("b");
        set.toggle("b");
        set.toggle("b");
        assert!(set.contains("b"));
    }

    #[test]
    fn first_mount_seeds_every_open_window() {
        let mut reg = populated();
        let mut overlay = MinimizeOverlay::new();
        overlay.mount(&reg);
        assert!(overlay.is_minimized("reservations"));
        assert!(overlay.is_minimized("services"));

        reg.open_full("contact", "Contact Us", ());
        overlay.toggle("services");
        overlay.mount(&reg);
        assert!(!overlay.is_minimized("contact"));
        assert!(!overlay.is_minimized("services"));
    }

    #[test]
    fn minimize_state_drives_expanded_flag_without_touching_registry() {
        let reg = populated();
        let mut overlay = MinimizeOverlay::new();
        overlay.toggle("services");
        let view = full_view(&reg, overlay.minimized());
        assert!(view[0].expanded());
        assert!(!view[1].expanded());
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn stale_ids_are_harmless() {
        let mut reg = populated();
        let mut overlay = MinimizeOverlay::new();
        overlay.mount(&reg);
        reg.close("services");
        assert!(overlay.is_minimized("services"));
        overlay.toggle("services");
        overlay.toggle("never-opened");
        let view = full_view(&reg, overlay.minimized());
        assert_eq!(view.len(), 1);
    }
}
