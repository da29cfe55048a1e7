use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use mongo_backup_daemon::{run_schedule, shutdown_signal, BackupJob, Config};
use mongo_backup_dump::MongoDump;
use mongo_backup_storage::BackupStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        host = %config.host,
        retention_days = config.retention_days,
        schedule = ?config.schedule,
        "starting backup driver"
    );

    let job = Arc::new(BackupJob::new(
        &config,
        Arc::new(MongoDump::default()),
        BackupStore::default(),
    ));

    let exit = run_schedule(job, config.schedule, shutdown_signal()).await;
    Ok(exit.into())
}
