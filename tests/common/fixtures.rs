//! Scenes database fixtures.

use scenes_engine::scenes_store::{
    EntityType, Microgenre, Scene, SceneMembership, SceneStore, SqliteScenesStore,
};
use std::sync::Arc;

pub fn scene(slug: &str, region: Option<&str>, microgenres: &[&str]) -> Scene {
    Scene {
        slug: slug.to_string(),
        name: slug.to_string(),
        region: region.map(String::from),
        microgenres: microgenres.iter().map(|s| s.to_string()).collect(),
    }
}

/// An in-memory store holding `scenes`, each with the given artist members.
pub fn store_with_scenes(scenes: &[(Scene, &[&str])]) -> Arc<SqliteScenesStore> {
    let store = SqliteScenesStore::in_memory().unwrap();
    for (scene, members) in scenes {
        store.upsert_scene(scene).unwrap();
        for member in members.iter() {
            store
                .set_scene_membership(&SceneMembership {
                    entity_slug: member.to_string(),
                    entity_type: EntityType::Artist,
                    scene_slug: scene.slug.clone(),
                    confidence: 0.9,
                })
                .unwrap();
        }
    }
    Arc::new(store)
}

pub fn add_microgenre(store: &dyn SceneStore, slug: &str, name: &str, parent: Option<&str>) {
    store
        .upsert_microgenre(&Microgenre {
            slug: slug.to_string(),
            name: name.to_string(),
            parent_scene_slug: parent.map(String::from),
        })
        .unwrap();
}
