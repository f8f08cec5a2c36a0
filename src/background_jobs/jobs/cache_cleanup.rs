//! Removal of expired recommendation cache rows.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError, JobSchedule, ShutdownBehavior},
};
use std::time::Duration;
use tracing::{debug, info};

pub struct RecommendationCacheCleanupJob {
    interval: Duration,
}

impl RecommendationCacheCleanupJob {
    pub fn new(interval_hours: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_hours * 60 * 60),
        }
    }
}

impl BackgroundJob for RecommendationCacheCleanupJob {
    fn id(&self) -> &'static str {
        "recommendation_cache_cleanup"
    }

    fn name(&self) -> &'static str {
        "Recommendation Cache Cleanup"
    }

    fn description(&self) -> &'static str {
        "Delete expired cached user recommendations"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.interval)
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        ShutdownBehavior::WaitForCompletion
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let removed = ctx
            .scene_store
            .purge_expired_recommendations()
            .map_err(|e| {
                JobError::ExecutionFailed(format!("Failed to purge recommendation cache: {}", e))
            })?;

        if removed > 0 {
            info!("Removed {} expired cached recommendations", removed);
        } else {
            debug!("No expired cached recommendations");
        }
        Ok(())
    }
}
