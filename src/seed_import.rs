//! Import of curated scenes, microgenres and memberships from a JSON seed.
//!
//! ```json
//! {
//!   "scenes": [{"slug": "grime", "name": "Grime", "region": "uk", "microgenres": ["eskibeat"]}],
//!   "microgenres": [{"slug": "eskibeat", "name": "Eskibeat", "parent_scene_slug": "grime"}],
//!   "memberships": [{"entity_slug": "wiley", "entity_type": "artist", "scene_slug": "grime", "confidence": 0.9}]
//! }
//! ```

use crate::scenes_store::{Microgenre, Scene, SceneMembership, SceneStore};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedDocument {
    pub scenes: Vec<Scene>,
    pub microgenres: Vec<Microgenre>,
    pub memberships: Vec<SceneMembership>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub scenes: usize,
    pub microgenres: usize,
    pub memberships: usize,
    /// Entries rejected by validation or by the store.
    pub rejected: usize,
}

pub fn load_seed(path: &Path) -> Result<SeedDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse seed file: {:?}", path))
}

/// Write every entry of `seed` to the store. Invalid entries are skipped and
/// counted, the rest of the import continues.
pub fn import_seed(store: &dyn SceneStore, seed: &SeedDocument) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for scene in &seed.scenes {
        match store.upsert_scene(scene) {
            Ok(()) => summary.scenes += 1,
            Err(e) => {
                warn!("Skipping scene {}: {:#}", scene.slug, e);
                summary.rejected += 1;
            }
        }
    }

    for microgenre in &seed.microgenres {
        match store.upsert_microgenre(microgenre) {
            Ok(()) => summary.microgenres += 1,
            Err(e) => {
                warn!("Skipping microgenre {}: {:#}", microgenre.slug, e);
                summary.rejected += 1;
            }
        }
    }

    for membership in &seed.memberships {
        match store.set_scene_membership(membership) {
            Ok(()) => summary.memberships += 1,
            Err(e) => {
                warn!(
                    "Skipping membership {} in {}: {:#}",
                    membership.entity_slug, membership.scene_slug, e
                );
                summary.rejected += 1;
            }
        }
    }

    info!(
        "Imported {} scenes, {} microgenres, {} memberships ({} rejected)",
        summary.scenes, summary.microgenres, summary.memberships, summary.rejected
    );
    summary
}
