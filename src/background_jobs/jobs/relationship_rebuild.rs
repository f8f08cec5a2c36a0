//! Periodic rebuild of the scene relationship graph.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError, JobSchedule, ShutdownBehavior},
};
use std::time::Duration;
use tracing::{info, warn};

pub struct RelationshipRebuildJob {
    interval: Duration,
}

impl RelationshipRebuildJob {
    pub fn new(interval_hours: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_hours * 60 * 60),
        }
    }
}

impl BackgroundJob for RelationshipRebuildJob {
    fn id(&self) -> &'static str {
        "relationship_rebuild"
    }

    fn name(&self) -> &'static str {
        "Relationship Rebuild"
    }

    fn description(&self) -> &'static str {
        "Infer scene relationships from memberships, the industry graph and campaigns"
    }

    fn schedule(&self) -> JobSchedule {
        JobSchedule::Interval(self.interval)
    }

    fn shutdown_behavior(&self) -> ShutdownBehavior {
        // Edges are only written after the full scan.
        ShutdownBehavior::Cancellable
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let engine = ctx.relationship_engine.clone();
        let token = ctx.cancellation_token.clone();
        let report = ctx.runtime.block_on(async move {
            tokio::select! {
                report = engine.rebuild_scene_relationships() => Some(report),
                _ = token.cancelled() => None,
            }
        });

        let Some(report) = report else {
            return Err(JobError::Cancelled);
        };

        if report.pairs_failed > 0 {
            warn!(
                "{} of {} scene pairs failed during rebuild",
                report.pairs_failed, report.pairs_analyzed
            );
        }
        if report.pairs_analyzed > 0 && report.pairs_failed == report.pairs_analyzed {
            return Err(JobError::ExecutionFailed(format!(
                "all {} scene pairs failed",
                report.pairs_analyzed
            )));
        }

        info!(
            "Relationship rebuild job stored {} edges",
            report.edges_upserted
        );
        Ok(())
    }
}
