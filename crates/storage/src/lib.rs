mod retention;

pub use retention::{BackupStore, RemoveOutcome};
