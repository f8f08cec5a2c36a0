//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{relationship_engine, store_with_scenes, FakeSignals};
//!
//! #[tokio::test]
//! async fn test_rebuild() {
//!     let store = store_with_scenes(&[]);
//!     let (_, signals) = FakeSignals::new().into_adapters();
//!     let engine = relationship_engine(store, signals);
//!     engine.rebuild_scene_relationships().await;
//! }
//! ```

#![allow(dead_code)]

mod constants;
mod fixtures;
mod signals;

pub use constants::*;
pub use fixtures::{add_microgenre, scene, store_with_scenes};
pub use signals::{pulse, FakeSignals};

use scenes_engine::config::{RecommendationSettings, RelationshipSettings};
use scenes_engine::{RecommendationEngine, RelationshipEngine, SceneStore, SignalAdapters};
use std::sync::Arc;
use std::time::Duration;

/// Per-call adapter budget used by the engines under test.
pub const TEST_ADAPTER_TIMEOUT: Duration = Duration::from_millis(200);

pub fn relationship_engine<S: SceneStore + 'static>(
    store: Arc<S>,
    signals: SignalAdapters,
) -> RelationshipEngine {
    RelationshipEngine::new(
        store,
        signals,
        RelationshipSettings::default(),
        TEST_ADAPTER_TIMEOUT,
    )
}

pub fn recommendation_engine<S: SceneStore + 'static>(
    store: Arc<S>,
    signals: SignalAdapters,
) -> RecommendationEngine {
    RecommendationEngine::new(
        store,
        signals,
        RecommendationSettings::default(),
        TEST_ADAPTER_TIMEOUT,
    )
}
