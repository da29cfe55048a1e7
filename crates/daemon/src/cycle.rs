use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use mongo_backup_dump::{DumpError, Dumper};
use mongo_backup_storage::{BackupStore, RemoveOutcome};
use thiserror::Error;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("mongodump failed: {0}")]
    Dump(DumpError),
    #[error("backup remove failed: {0:#}")]
    Cleanup(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub backup_dir: PathBuf,
    pub cleanup: RemoveOutcome,
}

/// One dump followed by retention cleanup, bound to a host and a retention window.
pub struct BackupJob {
    host: String,
    retention_days: u32,
    dumper: Arc<dyn Dumper>,
    store: BackupStore,
}

impl BackupJob {
    pub fn new(config: &Config, dumper: Arc<dyn Dumper>, store: BackupStore) -> Self {
        Self {
            host: config.host.clone(),
            retention_days: config.retention_days,
            dumper,
            store,
        }
    }

    /// Runs a cycle dated by the local clock.
    pub async fn run_now(&self) -> Result<CycleReport, CycleError> {
        self.run(Local::now().date_naive()).await
    }

    /// Dumps into today's directory, then removes the backup that just left
    /// the retention window. Cleanup is skipped when the dump fails.
    pub async fn run(&self, today: NaiveDate) -> Result<CycleReport, CycleError> {
        let span = info_span!("cycle", cycle_id = %Uuid::new_v4(), %today);
        async {
            let result = self.run_inner(today).await;
            if let Err(e) = &result {
                error!(host = %self.host, "{e}");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&self, today: NaiveDate) -> Result<CycleReport, CycleError> {
        let backup_dir = self.store.layout().dir_for(today);
        self.dumper
            .dump(&self.host, &backup_dir)
            .await
            .map_err(CycleError::Dump)?;

        let cleanup = self
            .store
            .remove_expired(today, self.retention_days)
            .await
            .map_err(CycleError::Cleanup)?;

        Ok(CycleReport {
            backup_dir,
            cleanup,
        })
    }
}
