pub mod decorator;
pub mod overlay;

mod registry;

pub use overlay::{FullPanel, MinimizeOverlay, MinimizedSet, full_view, simple_view};
pub use registry::WindowRegistry;

use std::fmt;

/// Display policy of a floating window.
///
/// `Full` windows can be minimized to a bubble and restored; `Simple` windows
/// can only be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowMode {
    #[default]
    Full,
    Simple,
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindowMode::Full => "full",
            WindowMode::Simple => "simple",
        };
        write!(f, "{}", s)
    }
}

/// One floating panel. `content` belongs to the caller; the registry only
/// stores and forwards it.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    id: String,
    title: String,
    content: T,
    mode: WindowMode,
}

impl<T> Window<T> {
    fn new(id: String, title: String, content: T, mode: WindowMode) -> Self {
        Self {
            id,
            title,
            content,
            mode,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn into_content(self) -> T {
        self.content
    }
}
