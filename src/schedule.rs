//! Periodic dump trigger
//!
//! Runs are executed one at a time on the blocking pool. A tick that fires
//! while a run is still going is skipped, so runs never overlap.

use crate::config::{Config, ScheduleConfig};
use crate::dump::{DumpOrchestrator, DumpReport};
use std::future::Future;
use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Run `job` every `schedule.interval()` until `shutdown` resolves
///
/// Returns the number of runs started. Job failures are the job's concern;
/// a panicking job is logged and the loop continues.
pub async fn run_scheduled<F>(
    schedule: &ScheduleConfig,
    job: F,
    shutdown: impl Future<Output = ()>,
) -> u64
where
    F: Fn() -> Option<DumpReport> + Send + Sync + 'static,
{
    let period = schedule.interval();
    let start = if schedule.run_on_start {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut interval = interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let job = Arc::new(job);
    let mut runs = 0;
    tokio::pin!(shutdown);

    info!("Scheduler started (every {:?}, run_on_start={})", period, schedule.run_on_start);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Scheduler stopping after {} runs", runs);
                break;
            }
            _ = interval.tick() => {
                runs += 1;
                let job = job.clone();
                match tokio::task::spawn_blocking(move || (*job)()).await {
                    Ok(Some(report)) => info!(
                        "Scheduled run {} wrote {} pages",
                        report.run_id,
                        report.pages.len()
                    ),
                    Ok(None) => {}
                    Err(e) => error!("Scheduled run panicked: {}", e),
                }
            }
        }
    }
    runs
}

/// Build a fresh orchestrator from `config` and run it, logging any failure
///
/// Blocking; call from a blocking thread.
pub fn dump_once(config: &Config) -> Option<DumpReport> {
    match DumpOrchestrator::from_config(config) {
        Ok(orchestrator) => orchestrator.run_and_log(),
        Err(e) => {
            error!("Cannot start dump run: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn schedule(run_on_start: bool) -> ScheduleConfig {
        ScheduleConfig {
            interval_secs: 3600,
            run_on_start,
        }
    }

    #[tokio::test]
    async fn runs_immediately_when_configured() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();

        let runs = run_scheduled(
            &schedule(true),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            },
            tokio::time::sleep(Duration::from_millis(200)),
        )
        .await;

        assert_eq!(runs, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn waits_one_interval_otherwise() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();

        let runs = run_scheduled(
            &schedule(false),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                None
            },
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

        assert_eq!(runs, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
