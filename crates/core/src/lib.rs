pub mod backup;

pub use backup::{
    backup_dir_name, format_backup_date, retention_target, BackupLayout, DEFAULT_BACKUP_ROOT,
};
