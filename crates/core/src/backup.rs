use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

/// Root under which every dated backup directory lives in production.
pub const DEFAULT_BACKUP_ROOT: &str = "/backup";

const DIR_PREFIX: &str = "backup-";

/// Formats a calendar date as `YYYY-MM-DD`.
///
/// This string is the only identity a backup directory has, so both the dump
/// target and the retention target are derived from it.
pub fn format_backup_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Directory name for the backup taken on `date`, e.g. `backup-2024-01-02`.
pub fn backup_dir_name(date: NaiveDate) -> String {
    format!("{DIR_PREFIX}{}", format_backup_date(date))
}

/// The single date whose backup falls out of a `retention_days` window.
///
/// Calendar subtraction, so month and year rollovers and leap days are
/// handled. Saturates at the earliest representable date.
pub fn retention_target(today: NaiveDate, retention_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(retention_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Maps calendar dates to backup directories under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupLayout {
    root: PathBuf,
}

impl BackupLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_for(&self, date: NaiveDate) -> PathBuf {
        self.root.join(backup_dir_name(date))
    }
}

impl Default for BackupLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_ROOT)
    }
}
