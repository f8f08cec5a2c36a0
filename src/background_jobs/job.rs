use super::context::JobContext;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub enum JobSchedule {
    /// First run when the scheduler starts, then every `Duration`.
    Interval(Duration),
}

impl JobSchedule {
    pub fn interval(&self) -> Duration {
        match self {
            JobSchedule::Interval(every) => *every,
        }
    }
}

/// What the scheduler does with a running job on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownBehavior {
    /// Fire the job's cancellation token.
    #[default]
    Cancellable,
    /// Let the run finish, up to the shutdown grace period.
    WaitForCompletion,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job failed: {0}")]
    ExecutionFailed(String),
    #[error("Job cancelled")]
    Cancelled,
}

/// Periodic maintenance work over the scenes database.
///
/// `execute` runs on the blocking pool. Async work is driven through
/// `JobContext::runtime`, and a job that notices `ctx.is_cancelled()`
/// returns `JobError::Cancelled`.
pub trait BackgroundJob: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn schedule(&self) -> JobSchedule;

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        ShutdownBehavior::default()
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}
