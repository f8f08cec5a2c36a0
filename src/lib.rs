//! Scenes Engine Library
//!
//! Scene relationship graph inference and scene/microgenre recommendations
//! over a SQLite scenes database and external signal services.

pub mod adapters;
pub mod background_jobs;
pub mod config;
pub mod metrics;
pub mod recommendations;
pub mod relationships;
pub mod scenes_store;
pub mod seed_import;
pub mod similarity;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use adapters::{HttpSignalsClient, NullSignals, SignalAdapters};
pub use recommendations::RecommendationEngine;
pub use relationships::RelationshipEngine;
pub use scenes_store::{SceneStore, SqliteScenesStore};
