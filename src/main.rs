use std::io;
use std::rc::Rc;

use clap::Parser;

use hotel_desk::app::DeskApp;
use hotel_desk::backend::{Backend, MemoryBackend, Seed};
use hotel_desk::components::{ActivityLogHandle, set_global_activity_log};
use hotel_desk::config::{Cli, DeskConfig};
use hotel_desk::context::AppContext;
use hotel_desk::logging::init_tracing;
use hotel_desk::drivers::console::{ConsoleInputDriver, ConsoleSession};
use hotel_desk::runner::run_desk;
use hotel_desk::storage::{FileStorage, MemoryStorage, Storage};

const ACTIVITY_LOG_LINES: usize = 2_000;

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = DeskConfig::try_from(&cli)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;

    let activity_log = ActivityLogHandle::new(ACTIVITY_LOG_LINES);
    set_global_activity_log(activity_log.clone());
    init_tracing(&config, Some(&activity_log));

    let seed = match &config.data {
        Some(path) => Seed::load(path)?,
        None => Seed::demo()?,
    };
    let backend = Rc::new(MemoryBackend::new(seed));
    let storage: Rc<dyn Storage> = match &config.storage {
        Some(path) => Rc::new(FileStorage::open(path)?),
        None => Rc::new(MemoryStorage::new()),
    };

    let mut ctx = AppContext::new(backend.clone() as Rc<dyn Backend>, storage);
    if let Some(user) = ctx.restore_session()? {
        tracing::info!(user = %user.email, "session restored");
    }
    if let Some(creds) = &config.credentials {
        let user = ctx.login(&creds.email, &creds.password)?;
        tracing::info!(user = %user.email, "signed in from command line");
    }
    ctx.sync_session_windows();
    ctx.mount_overlay();
    let mut app = DeskApp::new(ctx);

    let mut session = ConsoleSession::new()?;
    session.enter()?;
    let result = run_desk(
        session.terminal(),
        ConsoleInputDriver::new(),
        &mut app,
        config.tick,
    );
    session.exit()?;
    result?;

    if config.write_back
        && let Some(path) = &config.data
    {
        backend.snapshot().save(path)?;
        tracing::info!(path = %path.display(), "database written back");
    }
    Ok(())
}
