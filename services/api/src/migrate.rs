use clap::Args;
use recruitify::config::{AppConfig, ConfigError};
use recruitify::error::AppError;
use recruitify::recruiting::SqliteStore;
use recruitify::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct MigrateArgs {
    /// SQLite database file; defaults to APP_DATABASE_PATH
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

/// Opening the store applies every pending migration.
pub(crate) fn run(args: MigrateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let path = args
        .database
        .or(config.database.path)
        .ok_or(ConfigError::MissingDatabasePath)?;

    SqliteStore::open(&path)?;
    info!(path = %path.display(), "schema is up to date");
    Ok(())
}
