use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::interfaces::scheduler::ScheduledJob;
use crate::schedule::Schedule;

#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<Arc<dyn ScheduledJob>>,
    handles: Vec<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_job(&mut self, job: Arc<dyn ScheduledJob>) {
        self.jobs.push(job);
    }

    pub fn job_names(&self) -> Vec<String> {
        self.jobs.iter().map(|job| job.name().to_string()).collect()
    }

    /// Spawns one task per registered job. Calling `start` twice is a no-op.
    pub fn start(&mut self) {
        if self.shutdown.is_some() {
            return;
        }
        let (tx, rx) = watch::channel(false);
        for job in &self.jobs {
            self.handles.push(tokio::spawn(run_job(job.clone(), rx.clone())));
        }
        self.shutdown = Some(tx);
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        let handles = std::mem::take(&mut self.handles);
        for result in futures::future::join_all(handles).await {
            if let Err(err) = result {
                warn!(error = %err, "scheduled job task ended abnormally");
            }
        }
    }
}

/// Next fire time for a job whose previous run was due at `previous`.
///
/// Anchored on the later of `previous` and `now`, so a timer that wakes a
/// little early never fires the same slot twice and a slow run skips the
/// slots it overran.
pub fn next_fire(
    schedule: &Schedule,
    previous: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    let anchor = previous.map_or(now, |previous| previous.max(now));
    schedule.next_run(anchor)
}

async fn run_job(job: Arc<dyn ScheduledJob>, mut shutdown: watch::Receiver<bool>) {
    let mut previous = None;
    loop {
        let now = OffsetDateTime::now_utc();
        let Some(next) = next_fire(&job.schedule(), previous, now) else {
            info!(job = job.name(), "schedule exhausted, job stopped");
            return;
        };
        previous = Some(next);
        let delay = Duration::try_from(next - now).unwrap_or(Duration::ZERO);
        debug!(job = job.name(), delay_ms = delay.as_millis() as u64, "next run scheduled");

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => return,
        }
        if *shutdown.borrow() {
            return;
        }

        if let Err(err) = job.run().await {
            error!(job = job.name(), error = %err, "scheduled job failed");
        }
    }
}
