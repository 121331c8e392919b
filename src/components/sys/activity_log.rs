use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::components::{Component, ComponentContext, ListComponent};
use crate::ui::UiFrame;

const DEFAULT_MAX_LINES: usize = 2000;
static GLOBAL_LOG: OnceLock<ActivityLogHandle> = OnceLock::new();

pub fn set_global_activity_log(handle: ActivityLogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_activity_log() -> Option<ActivityLogHandle> {
    GLOBAL_LOG.get().cloned()
}

#[derive(Debug)]
struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LogBuffer {
    fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

/// Shared, bounded buffer of log lines. Cloning shares the buffer.
#[derive(Clone, Debug)]
pub struct ActivityLogHandle {
    inner: Arc<Mutex<LogBuffer>>,
}

impl ActivityLogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogBuffer::new(max_lines))),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|buffer| buffer.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn writer(&self) -> ActivityLogWriter {
        ActivityLogWriter::new(self.clone())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ActivityLogHandle {
    type Writer = ActivityLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer()
    }
}

/// `io::Write` adapter that splits output into lines for the buffer.
#[derive(Debug)]
pub struct ActivityLogWriter {
    handle: ActivityLogHandle,
    pending: Vec<u8>,
}

impl ActivityLogWriter {
    pub fn new(handle: ActivityLogHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self, force: bool) {
        if self.pending.is_empty() {
            return;
        }
        let drained: Vec<u8> = if force {
            std::mem::take(&mut self.pending)
        } else {
            let Some(pos) = self.pending.iter().rposition(|b| *b == b'\n') else {
                return;
            };
            self.pending.drain(..=pos).collect()
        };
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n').filter(|l| !l.is_empty()) {
            self.handle.push(line.to_string());
        }
    }
}

impl Write for ActivityLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for ActivityLogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

/// Window content showing the tail of the activity log.
#[derive(Debug)]
pub struct ActivityLogPane {
    handle: ActivityLogHandle,
    list: ListComponent,
    follow_tail: bool,
}

impl ActivityLogPane {
    pub fn new(max_lines: usize) -> (Self, ActivityLogHandle) {
        let handle = ActivityLogHandle::new(max_lines);
        (Self::from_handle(handle.clone()), handle)
    }

    pub fn new_default() -> (Self, ActivityLogHandle) {
        Self::new(DEFAULT_MAX_LINES)
    }

    pub fn from_handle(handle: ActivityLogHandle) -> Self {
        Self {
            handle,
            list: ListComponent::new("(no activity yet)"),
            follow_tail: true,
        }
    }

    fn at_bottom(&self) -> bool {
        self.list.selected() + 1 >= self.list.len()
    }
}

impl Component for ActivityLogPane {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        self.list.set_items(self.handle.lines());
        if self.follow_tail {
            self.list.set_selected(usize::MAX);
        }
        self.list.render(frame, area, ctx);
    }

    fn handle_event(&mut self, event: &Event, ctx: &ComponentContext) -> bool {
        let handled = self.list.handle_event(event, ctx);
        if handled {
            self.follow_tail = self.at_bottom();
        }
        handled
    }

    fn hints(&self) -> &str {
        "Up/Down scroll  End follow"
    }
}
