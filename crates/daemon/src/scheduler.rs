use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Schedule;
use crate::cycle::BackupJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    Success,
    Failure,
}

impl From<SchedulerExit> for ExitCode {
    fn from(exit: SchedulerExit) -> Self {
        match exit {
            SchedulerExit::Success => ExitCode::SUCCESS,
            SchedulerExit::Failure => ExitCode::FAILURE,
        }
    }
}

/// Drives `job` according to `schedule`.
///
/// Single-run schedules return once the cycle finishes. A periodic schedule
/// only returns when `shutdown` resolves.
pub async fn run_schedule<F>(
    job: Arc<BackupJob>,
    schedule: Schedule,
    shutdown: F,
) -> SchedulerExit
where
    F: Future<Output = ()>,
{
    match schedule {
        Schedule::Once => match job.run_now().await {
            Ok(_) => SchedulerExit::Success,
            Err(_) => SchedulerExit::Failure,
        },
        Schedule::OnceForced => {
            // Outcome is already logged; a forced run never fails the process.
            let _ = job.run_now().await;
            SchedulerExit::Success
        }
        Schedule::Every(interval) => {
            run_periodic(job, interval, shutdown).await;
            SchedulerExit::Success
        }
    }
}

/// Starts a cycle immediately and then once per `interval`.
///
/// Every tick spawns its own cycle. A cycle that outlasts the interval
/// overlaps with the next one; ticks are never skipped.
pub async fn run_periodic<F>(job: Arc<BackupJob>, interval: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    info!(?interval, "starting periodic backups");
    let mut ticker = tokio::time::interval(interval);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, stopping scheduler");
                return;
            }
            _ = ticker.tick() => {
                let job = Arc::clone(&job);
                tokio::spawn(async move {
                    let _ = job.run_now().await;
                });
            }
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
