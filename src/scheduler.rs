//! Drives a [`RateUpdateJob`] on its daily schedule

use crate::core::schedule::DailySchedule;
use crate::job::RateUpdateJob;
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct Scheduler {
    job: RateUpdateJob,
    schedule: DailySchedule,
    run_timeout: Duration,
    run_on_start: bool,
}

impl Scheduler {
    pub fn new(job: RateUpdateJob, schedule: DailySchedule, run_timeout: Duration) -> Self {
        Self {
            job,
            schedule,
            run_timeout,
            run_on_start: false,
        }
    }

    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    pub fn job(&self) -> &RateUpdateJob {
        &self.job
    }

    /// Runs the job at every trigger until `shutdown` resolves. Runs never
    /// overlap; a run that outlives `run_timeout` is abandoned.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(schedule = %self.schedule, "Scheduler started");

        if self.run_on_start {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler shutting down");
                    return;
                }
                _ = self.run_once() => {}
            }
        }

        let mut cursor = Utc::now();
        loop {
            let next = self.schedule.next_after(cursor);
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            info!(next_run = %next.with_timezone(&self.schedule.offset()), "Waiting for next trigger");

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler shutting down");
                    return;
                }
                _ = async {
                    tokio::time::sleep(wait).await;
                    self.run_once().await;
                } => {}
            }

            // Never fire the same trigger twice if the clock lags the timer
            cursor = next.max(Utc::now());
        }
    }

    async fn run_once(&self) {
        debug!("Trigger fired");
        if tokio::time::timeout(self.run_timeout, self.job.run())
            .await
            .is_err()
        {
            warn!(
                timeout_secs = self.run_timeout.as_secs(),
                document = %self.job.settings().document,
                "Gold rate update abandoned after timeout"
            );
        }
    }
}
