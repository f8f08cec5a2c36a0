//! SceneStore trait definition.

use super::models::{
    CachedRecommendation, EdgeInput, Microgenre, Scene, SceneMembership, SceneRelationship,
};
use anyhow::Result;
use serde_json::Value as JsonValue;

/// Trait for scene storage backends.
///
/// The engines only read scenes, microgenres and memberships. The write
/// methods for those exist for curation tooling and seeding.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait SceneStore: Send + Sync {
    // =========================================================================
    // Curated entities
    // =========================================================================

    /// List all scenes ordered by name.
    fn list_scenes(&self) -> Result<Vec<Scene>>;

    /// Get a scene by slug.
    fn get_scene_by_slug(&self, slug: &str) -> Result<Option<Scene>>;

    /// List microgenres, optionally restricted to one parent scene.
    fn list_microgenres(&self, parent_scene_slug: Option<&str>) -> Result<Vec<Microgenre>>;

    /// Get a microgenre by slug.
    fn get_microgenre_by_slug(&self, slug: &str) -> Result<Option<Microgenre>>;

    /// Get all memberships of a scene, highest confidence first.
    fn get_scene_memberships(&self, scene_slug: &str) -> Result<Vec<SceneMembership>>;

    /// Create or update a scene.
    fn upsert_scene(&self, scene: &Scene) -> Result<()>;

    /// Create or update a microgenre.
    fn upsert_microgenre(&self, microgenre: &Microgenre) -> Result<()>;

    /// Create or update a membership, keyed by entity and scene.
    fn set_scene_membership(&self, membership: &SceneMembership) -> Result<()>;

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Get all edges touching a scene, heaviest first.
    fn get_scene_relationships(&self, scene_slug: &str) -> Result<Vec<SceneRelationship>>;

    /// Upsert edges keyed by `(source, target, relation_type)`, last writer wins.
    /// Returns the stored rows for the given inputs.
    fn batch_set_relationships(&self, edges: &[EdgeInput]) -> Result<Vec<SceneRelationship>>;

    // =========================================================================
    // Recommendation cache
    // =========================================================================

    /// Get the unexpired cached recommendation for a subject.
    fn get_cached_recommendation(&self, subject_id: &str) -> Result<Option<CachedRecommendation>>;

    /// Replace the cached recommendation for a subject.
    fn cache_recommendation(&self, subject_id: &str, payload: &JsonValue, ttl_hours: u64)
        -> Result<()>;

    /// Delete expired cache rows. Returns the number of rows removed.
    fn purge_expired_recommendations(&self) -> Result<usize>;
}
