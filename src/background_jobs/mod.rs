//! Background job scheduling and execution system.
//!
//! Keeps the relationship graph fresh and the recommendation cache small
//! while the engine runs in watch mode.

mod context;
mod job;
pub mod jobs;
mod scheduler;

pub use context::JobContext;
pub use job::{BackgroundJob, JobError, JobSchedule, ShutdownBehavior};
pub use scheduler::JobScheduler;
