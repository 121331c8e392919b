//! Subscriber setup. While the desk owns the terminal, formatted events go
//! to the activity log window; stderr would tear the screen.

use std::io;

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::components::ActivityLogHandle;
use crate::config::DeskConfig;

/// Install the global subscriber at the configured level, writing into
/// `log` when given and to stderr otherwise. Returns false when a
/// subscriber was already installed.
pub fn init_tracing(config: &DeskConfig, log: Option<&ActivityLogHandle>) -> bool {
    let writer = match log {
        Some(handle) => BoxMakeWriter::new(handle.clone()),
        None => BoxMakeWriter::new(io::stderr),
    };
    tracing::subscriber::set_global_default(desk_subscriber(config.log_level, writer)).is_ok()
}

fn desk_subscriber<W>(level: Level, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_at_or_above_level_reach_the_activity_log() {
        let log = ActivityLogHandle::new(10);
        let subscriber = desk_subscriber(Level::INFO, log.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::info!(room = 102, "reservation created");
            tracing::warn!("cart is empty");
        });

        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("reservation created room=102"));
        assert!(lines[1].contains("cart is empty"));
    }

    #[test]
    fn debug_level_keeps_debug_events() {
        let log = ActivityLogHandle::new(10);
        tracing::subscriber::with_default(desk_subscriber(Level::DEBUG, log.clone()), || {
            tracing::debug!("overlay mounted");
        });
        assert_eq!(log.len(), 1);
    }
}
