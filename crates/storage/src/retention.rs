use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mongo_backup_core::{retention_target, BackupLayout};
use tracing::{debug, info};

/// Filesystem view of the backup root, used for retention cleanup.
#[derive(Debug, Clone, Default)]
pub struct BackupStore {
    layout: BackupLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The expired backup directory was deleted.
    Removed(PathBuf),
    /// Nothing exists at the expired path.
    Missing,
    /// Something exists at the expired path but it is not a directory; left untouched.
    NotADirectory(PathBuf),
}

impl BackupStore {
    pub fn new(layout: BackupLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &BackupLayout {
        &self.layout
    }

    /// Removes the one backup directory dated exactly `today - retention_days`.
    ///
    /// Older directories are never swept: only the exact date is considered.
    pub async fn remove_expired(
        &self,
        today: NaiveDate,
        retention_days: u32,
    ) -> Result<RemoveOutcome> {
        let path = self.layout.dir_for(retention_target(today, retention_days));
        tokio::task::spawn_blocking(move || remove_backup_dir(&path))
            .await
            .context("retention cleanup task panicked")?
    }
}

fn remove_backup_dir(path: &Path) -> Result<RemoveOutcome> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no expired backup to remove");
            return Ok(RemoveOutcome::Missing);
        }
        Err(e) => return Err(e).with_context(|| format!("stat backup dir: {}", path.display())),
    };

    if !metadata.is_dir() {
        debug!(path = %path.display(), "expired backup path is not a directory, skipping");
        return Ok(RemoveOutcome::NotADirectory(path.to_path_buf()));
    }

    info!(path = %path.display(), "removing expired backup");
    fs::remove_dir_all(path).with_context(|| format!("remove backup dir: {}", path.display()))?;
    Ok(RemoveOutcome::Removed(path.to_path_buf()))
}
