//! Scene clusters: the neighborhood of a scene in the relationship graph.

use crate::scenes_store::{RelationType, Scene, SceneStore};
use crate::similarity::WeightedGraph;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A group of closely related scenes around a center scene. Computed on
/// demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCluster {
    /// Members in discovery order, center first.
    pub scenes: Vec<String>,
    pub center_scene: String,
    /// Edges among members per member pair, clamped to `[0, 1]`.
    pub avg_interconnectedness: f64,
    pub dominant_region: Option<String>,
    /// Microgenres listed by every member, in the center scene's order.
    pub shared_microgenres: Vec<String>,
}

impl SceneCluster {
    /// A cluster holding only `seed`.
    pub fn degenerate(seed: &str) -> Self {
        Self {
            scenes: vec![seed.to_string()],
            center_scene: seed.to_string(),
            avg_interconnectedness: 0.0,
            dominant_region: None,
            shared_microgenres: Vec::new(),
        }
    }
}

/// The persisted relationships seen as an undirected weighted graph.
pub(crate) struct StoreGraph<'a> {
    store: &'a dyn SceneStore,
}

impl<'a> StoreGraph<'a> {
    pub fn new(store: &'a dyn SceneStore) -> Self {
        Self { store }
    }
}

impl WeightedGraph for StoreGraph<'_> {
    fn neighbors(&self, node: &str) -> Result<Vec<(String, f64)>> {
        Ok(self
            .store
            .get_scene_relationships(node)?
            .into_iter()
            .filter_map(|rel| {
                rel.other_end(node)
                    .map(|other| (other.to_string(), rel.weight))
            })
            .collect())
    }
}

/// Build the cluster summary for already discovered `members`.
pub(crate) fn summarize_cluster(
    store: &dyn SceneStore,
    seed: &str,
    members: Vec<String>,
) -> Result<SceneCluster> {
    if members.len() < 2 {
        return Ok(SceneCluster::degenerate(seed));
    }

    let member_set: HashSet<&str> = members.iter().map(String::as_str).collect();
    // Every edge is seen from both of its ends.
    let mut member_edges: HashSet<(String, String, RelationType)> = HashSet::new();
    let mut scenes: Vec<Option<Scene>> = Vec::with_capacity(members.len());

    for slug in &members {
        for rel in store.get_scene_relationships(slug)? {
            let joins_members = rel
                .other_end(slug)
                .is_some_and(|other| other != slug && member_set.contains(other));
            if joins_members {
                member_edges.insert((
                    rel.source_scene_slug,
                    rel.target_scene_slug,
                    rel.relation_type,
                ));
            }
        }
        scenes.push(store.get_scene_by_slug(slug)?);
    }

    // A pair can hold one edge per relation type, so the ratio can exceed 1.
    let n = members.len() as f64;
    let possible_pairs = n * (n - 1.0) / 2.0;
    let avg_interconnectedness = (member_edges.len() as f64 / possible_pairs).clamp(0.0, 1.0);

    Ok(SceneCluster {
        center_scene: seed.to_string(),
        avg_interconnectedness,
        dominant_region: dominant_region(&scenes),
        shared_microgenres: shared_microgenres(&scenes),
        scenes: members,
    })
}

/// Most frequent region among the members. Ties go to the alphabetically
/// first region.
fn dominant_region(scenes: &[Option<Scene>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for region in scenes.iter().flatten().filter_map(|s| s.region.as_deref()) {
        *counts.entry(region).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (region, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((region, count));
        }
    }
    best.map(|(region, _)| region.to_string())
}

/// Microgenres common to every member. A member missing from the store
/// shares nothing.
fn shared_microgenres(scenes: &[Option<Scene>]) -> Vec<String> {
    let Some(Some(center)) = scenes.first() else {
        return Vec::new();
    };

    let mut shared: Vec<String> = Vec::new();
    for microgenre in &center.microgenres {
        if shared.contains(microgenre) {
            continue;
        }
        let in_all = scenes[1..].iter().all(|scene| {
            scene
                .as_ref()
                .is_some_and(|s| s.microgenres.contains(microgenre))
        });
        if in_all {
            shared.push(microgenre.clone());
        }
    }
    shared
}
