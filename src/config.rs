use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use crate::error::DeskError;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hotel-desk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Terminal client for browsing rooms and managing hotel reservations"
)]
pub struct Cli {
    /// JSON database to load instead of the bundled demo data.
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// File that keeps the session and service carts between runs.
    /// Without it everything stays in memory.
    #[arg(long, value_name = "FILE")]
    pub storage: Option<PathBuf>,

    /// Save the database back to `--data` on exit.
    #[arg(long, requires = "data")]
    pub write_back: bool,

    /// Sign in with this email on startup.
    #[arg(long, requires = "password")]
    pub email: Option<String>,

    #[arg(long, requires = "email")]
    pub password: Option<String>,

    /// trace, debug, info, warn or error.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Event loop poll interval.
    #[arg(long, value_name = "MS", default_value_t = 50)]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub data: Option<PathBuf>,
    pub storage: Option<PathBuf>,
    pub write_back: bool,
    pub credentials: Option<Credentials>,
    pub log_level: Level,
    pub tick: Duration,
}

impl TryFrom<&Cli> for DeskConfig {
    type Error = DeskError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let log_level = cli
            .log_level
            .parse::<Level>()
            .map_err(|_| DeskError::invalid(format!("unknown log level `{}`", cli.log_level)))?;
        if !(10..=1000).contains(&cli.tick_ms) {
            return Err(DeskError::invalid(
                "tick must be between 10 and 1000 milliseconds",
            ));
        }
        let credentials = match (&cli.email, &cli.password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            (None, None) => None,
            _ => {
                return Err(DeskError::invalid(
                    "--email and --password must be given together",
                ));
            }
        };
        if cli.write_back && cli.data.is_none() {
            return Err(DeskError::invalid("--write-back needs --data"));
        }
        Ok(Self {
            data: cli.data.clone(),
            storage: cli.storage.clone(),
            write_back: cli.write_back,
            credentials,
            log_level,
            tick: Duration::from_millis(cli.tick_ms),
        })
    }
}
