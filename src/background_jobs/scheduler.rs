use super::context::JobContext;
use super::job::{BackgroundJob, JobError, ShutdownBehavior};
use crate::metrics;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Upper bound on how long the scheduler sleeps between checks.
const MAX_SLEEP: Duration = Duration::from_secs(60);

/// How long shutdown waits for each running job.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

struct RunningJob {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Runs registered jobs on their interval until the shutdown token fires.
pub struct JobScheduler {
    jobs: HashMap<&'static str, Arc<dyn BackgroundJob>>,

    /// Next due time per job. Jobs without an entry are due immediately.
    next_runs: HashMap<&'static str, Instant>,

    running: HashMap<&'static str, RunningJob>,

    shutdown_token: CancellationToken,

    job_context: JobContext,
}

impl JobScheduler {
    pub fn new(shutdown_token: CancellationToken, job_context: JobContext) -> Self {
        Self {
            jobs: HashMap::new(),
            next_runs: HashMap::new(),
            running: HashMap::new(),
            shutdown_token,
            job_context,
        }
    }

    /// Register a job with the scheduler.
    pub fn register_job(&mut self, job: Arc<dyn BackgroundJob>) {
        info!(
            "Registering job {} ({}): {}",
            job.id(),
            job.name(),
            job.description()
        );
        self.jobs.insert(job.id(), job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Main scheduler loop.
    pub async fn run(&mut self) {
        info!("Starting job scheduler with {} registered jobs", self.job_count());

        loop {
            self.cleanup_completed_jobs().await;
            self.run_due_jobs();

            let sleep_duration = self.time_until_next_job();
            debug!(
                "Scheduler sleeping for {:?} until next scheduled job",
                sleep_duration
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {}
                _ = self.shutdown_token.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    self.shutdown().await;
                    break;
                }
            }
        }

        info!("Job scheduler stopped");
    }

    fn time_until_next_job(&self) -> Duration {
        let now = Instant::now();
        self.jobs
            .keys()
            .filter(|id| !self.running.contains_key(*id))
            .map(|id| match self.next_runs.get(id) {
                Some(next_run) => next_run.saturating_duration_since(now),
                None => Duration::ZERO,
            })
            .min()
            .unwrap_or(MAX_SLEEP)
            .min(MAX_SLEEP)
    }

    fn run_due_jobs(&mut self) {
        let now = Instant::now();
        let due: Vec<&'static str> = self
            .jobs
            .keys()
            .copied()
            .filter(|id| !self.running.contains_key(id))
            .filter(|id| self.next_runs.get(id).map_or(true, |next| *next <= now))
            .collect();

        for job_id in due {
            self.spawn_job(job_id);
        }
    }

    fn spawn_job(&mut self, job_id: &'static str) {
        let Some(job) = self.jobs.get(job_id).cloned() else {
            error!("Attempted to spawn unknown job: {}", job_id);
            return;
        };

        info!("Starting job: {}", job_id);

        // Measured from the start so a slow run does not drift the schedule.
        self.next_runs
            .insert(job_id, Instant::now() + job.schedule().interval());

        let cancel_token = self.job_context.cancellation_token.child_token();
        let ctx = self.job_context.with_token(cancel_token.clone());

        let handle = tokio::spawn(async move {
            let start_time = Instant::now();
            let result = tokio::task::spawn_blocking(move || job.execute(&ctx)).await;
            let elapsed = start_time.elapsed();

            let status_label = match result {
                Ok(Ok(())) => {
                    info!("Job {} completed successfully in {:?}", job_id, elapsed);
                    "success"
                }
                Ok(Err(JobError::Cancelled)) => {
                    info!("Job {} was cancelled after {:?}", job_id, elapsed);
                    "cancelled"
                }
                Ok(Err(e)) => {
                    error!("Job {} failed after {:?}: {}", job_id, elapsed, e);
                    "failed"
                }
                Err(e) => {
                    error!("Job {} panicked after {:?}: {}", job_id, elapsed, e);
                    "panic"
                }
            };

            metrics::record_background_job_execution(job_id, status_label, elapsed);
        });

        self.running.insert(
            job_id,
            RunningJob {
                handle,
                cancel_token,
            },
        );
    }

    async fn cleanup_completed_jobs(&mut self) {
        let completed: Vec<&'static str> = self
            .running
            .iter()
            .filter(|(_, job)| job.handle.is_finished())
            .map(|(id, _)| *id)
            .collect();

        for job_id in completed {
            if let Some(job) = self.running.remove(job_id) {
                let _ = job.handle.await;
            }
        }
    }

    /// Cancel cancellable jobs and wait for all of them to finish.
    async fn shutdown(&mut self) {
        info!("Shutting down scheduler...");

        for (job_id, running) in self.running.drain() {
            let behavior = self
                .jobs
                .get(job_id)
                .map(|job| job.shutdown_behavior())
                .unwrap_or_default();

            if behavior == ShutdownBehavior::Cancellable {
                debug!("Cancelling job: {}", job_id);
                running.cancel_token.cancel();
            } else {
                info!("Waiting for job {} to complete...", job_id);
            }
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, running.handle).await;
        }

        info!("Scheduler shutdown complete");
    }
}
