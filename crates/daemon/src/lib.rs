pub mod config;
pub mod cycle;
pub mod scheduler;

pub use config::{Config, ConfigError, Schedule};
pub use cycle::{BackupJob, CycleError, CycleReport};
pub use scheduler::{run_periodic, run_schedule, shutdown_signal, SchedulerExit};
