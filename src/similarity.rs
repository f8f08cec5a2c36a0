//! Set similarity and bounded traversal over weighted graphs.

use anyhow::Result;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`. Two empty sets score 0.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// An undirected graph with weighted edges between string-keyed nodes.
pub trait WeightedGraph {
    /// Neighbors of `node` with the weight of the connecting edge. A neighbor
    /// may appear more than once when parallel edges exist.
    fn neighbors(&self, node: &str) -> Result<Vec<(String, f64)>>;
}

/// In-memory adjacency list.
#[derive(Debug, Default, Clone)]
pub struct AdjacencyGraph {
    adjacency: HashMap<String, Vec<(String, f64)>>,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, a: &str, b: &str, weight: f64) {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .push((b.to_string(), weight));
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .push((a.to_string(), weight));
    }
}

impl WeightedGraph for AdjacencyGraph {
    fn neighbors(&self, node: &str) -> Result<Vec<(String, f64)>> {
        Ok(self.adjacency.get(node).cloned().unwrap_or_default())
    }
}

/// Breadth-first discovery of the neighborhood around `seed`.
///
/// Each of the `depth` levels expands the current frontier to neighbors
/// reached through an edge with weight strictly above `weight_threshold`
/// that have not been visited yet. Frontier nodes of one level are expanded
/// in parallel and merged at the level barrier, so the result only depends
/// on the graph. Returns visited nodes in discovery order, seed first, each
/// level sorted by slug.
pub fn bounded_cluster_bfs<G>(
    graph: &G,
    seed: &str,
    depth: usize,
    weight_threshold: f64,
) -> Result<Vec<String>>
where
    G: WeightedGraph + Sync,
{
    let mut visited: HashSet<String> = HashSet::from([seed.to_string()]);
    let mut discovered = vec![seed.to_string()];
    let mut frontier = vec![seed.to_string()];

    for _ in 0..depth {
        if frontier.is_empty() {
            break;
        }

        let expansions = frontier
            .par_iter()
            .map(|node| graph.neighbors(node))
            .collect::<Result<Vec<_>>>()?;

        let mut next: Vec<String> = expansions
            .into_iter()
            .flatten()
            .filter(|(_, weight)| *weight > weight_threshold)
            .map(|(node, _)| node)
            .collect();
        next.sort();
        next.dedup();
        next.retain(|node| visited.insert(node.clone()));

        discovered.extend(next.iter().cloned());
        frontier = next;
    }

    Ok(discovered)
}
