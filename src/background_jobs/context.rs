use crate::relationships::RelationshipEngine;
use crate::scenes_store::SceneStore;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
///
/// Contains references to shared resources and a cancellation token
/// for graceful shutdown handling.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Access to the scenes database.
    pub scene_store: Arc<dyn SceneStore>,

    pub relationship_engine: RelationshipEngine,

    /// Runtime the scheduler runs on, for jobs that drive async work.
    pub runtime: Handle,
}

impl JobContext {
    pub fn new(
        cancellation_token: CancellationToken,
        scene_store: Arc<dyn SceneStore>,
        relationship_engine: RelationshipEngine,
        runtime: Handle,
    ) -> Self {
        Self {
            cancellation_token,
            scene_store,
            relationship_engine,
            runtime,
        }
    }

    /// Same resources, different cancellation token.
    pub fn with_token(&self, cancellation_token: CancellationToken) -> Self {
        Self {
            cancellation_token,
            ..self.clone()
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
