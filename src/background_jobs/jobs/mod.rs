//! Specific background job implementations.

pub mod cache_cleanup;
pub mod relationship_rebuild;

pub use cache_cleanup::RecommendationCacheCleanupJob;
pub use relationship_rebuild::RelationshipRebuildJob;
