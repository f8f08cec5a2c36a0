use super::analyzers::{crossover_edge, graph_connection_edge, shared_members_edge, MemberKey};
use super::cluster::{summarize_cluster, SceneCluster, StoreGraph};
use crate::adapters::guard::guarded;
use crate::adapters::{SignalAdapters, TimeRange};
use crate::config::RelationshipSettings;
use crate::metrics;
use crate::scenes_store::{EdgeInput, SceneRelationship, SceneStore};
use crate::similarity::bounded_cluster_bfs;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

type MemberSets = HashMap<String, Arc<HashSet<MemberKey>>>;

/// Outcome of a full relationship rebuild.
#[derive(Debug, Clone, Default)]
pub struct RebuildReport {
    pub pairs_analyzed: usize,
    /// Pairs whose analysis aborted and contributed no edges.
    pub pairs_failed: usize,
    pub edges_upserted: usize,
    pub edges: Vec<SceneRelationship>,
}

/// Infers and persists weighted edges between scenes, and answers cluster
/// queries over them.
///
/// Public methods never fail: signal failures drop that signal, store
/// failures are logged and produce an empty or degenerate result.
#[derive(Clone)]
pub struct RelationshipEngine {
    store: Arc<dyn SceneStore>,
    signals: SignalAdapters,
    settings: RelationshipSettings,
    adapter_timeout: Duration,
}

impl RelationshipEngine {
    pub fn new(
        store: Arc<dyn SceneStore>,
        signals: SignalAdapters,
        settings: RelationshipSettings,
        adapter_timeout: Duration,
    ) -> Self {
        Self {
            store,
            signals,
            settings,
            adapter_timeout,
        }
    }

    pub fn settings(&self) -> &RelationshipSettings {
        &self.settings
    }

    /// Analyze every unordered scene pair and upsert all inferred edges in
    /// one batch after the scan.
    pub async fn rebuild_scene_relationships(&self) -> RebuildReport {
        let started = Instant::now();

        let scenes = match self.store.list_scenes() {
            Ok(scenes) => scenes,
            Err(e) => {
                error!("Failed to list scenes for relationship rebuild: {}", e);
                return RebuildReport::default();
            }
        };

        let slugs: Vec<String> = scenes.into_iter().map(|s| s.slug).collect();
        let members = Arc::new(self.load_member_sets(&slugs));

        let mut pairs = Vec::with_capacity(slugs.len() * slugs.len().saturating_sub(1) / 2);
        for (i, a) in slugs.iter().enumerate() {
            for b in &slugs[i + 1..] {
                pairs.push((a.clone(), b.clone()));
            }
        }

        info!(
            "Rebuilding relationships: {} scenes, {} pairs, concurrency {}",
            slugs.len(),
            pairs.len(),
            self.settings.rebuild_concurrency
        );

        let pairs_analyzed = pairs.len();
        let results: Vec<_> = stream::iter(pairs)
            .map(|(a, b)| {
                let engine = self.clone();
                let members = Arc::clone(&members);
                tokio::spawn(async move { engine.analyze_pair(&a, &b, &members).await })
            })
            .buffer_unordered(self.settings.rebuild_concurrency.max(1))
            .collect()
            .await;

        let mut pairs_failed = 0;
        let mut edges: Vec<EdgeInput> = Vec::new();
        for result in results {
            match result {
                Ok(pair_edges) => edges.extend(pair_edges),
                Err(e) => {
                    error!("Scene pair analysis aborted: {}", e);
                    pairs_failed += 1;
                }
            }
        }

        // Completion order varies between runs, the write order does not.
        edges.sort_by(|a, b| a.key().cmp(&b.key()));

        let stored = match self.store.batch_set_relationships(&edges) {
            Ok(stored) => stored,
            Err(e) => {
                error!("Failed to store {} relationships: {}", edges.len(), e);
                Vec::new()
            }
        };

        for rel in &stored {
            metrics::record_edge_upserted(rel.relation_type.to_db_str());
        }
        let elapsed = started.elapsed();
        metrics::record_rebuild(elapsed, pairs_failed);

        info!(
            "Relationship rebuild complete in {:?}: {} pairs, {} failed, {} edges",
            elapsed,
            pairs_analyzed,
            pairs_failed,
            stored.len()
        );

        RebuildReport {
            pairs_analyzed,
            pairs_failed,
            edges_upserted: stored.len(),
            edges: stored,
        }
    }

    /// Member sets per scene. Scenes whose memberships could not be read are
    /// absent, which disables the shared-members signal for their pairs.
    fn load_member_sets(&self, slugs: &[String]) -> MemberSets {
        let mut sets = HashMap::with_capacity(slugs.len());
        for slug in slugs {
            match self.store.get_scene_memberships(slug) {
                Ok(memberships) => {
                    let set: HashSet<MemberKey> = memberships
                        .into_iter()
                        .map(|m| (m.entity_type, m.entity_slug))
                        .collect();
                    sets.insert(slug.clone(), Arc::new(set));
                }
                Err(e) => warn!("Failed to load memberships of {}: {}", slug, e),
            }
        }
        sets
    }

    /// Run the three analyzers of one pair. The external signals are fetched
    /// concurrently, each behind its own timeout.
    async fn analyze_pair(&self, a: &str, b: &str, members: &MemberSets) -> Vec<EdgeInput> {
        let subject = format!("{} <-> {}", a, b);
        let range = TimeRange::trailing_days(self.settings.crossover_window_days);

        let (connection, crossover) = tokio::join!(
            guarded(
                "graph",
                "infer_connection",
                &subject,
                self.adapter_timeout,
                self.signals.graph.infer_connection(a, b),
            ),
            guarded(
                "campaigns",
                "analyze_crossover",
                &subject,
                self.adapter_timeout,
                self.signals.campaigns.analyze_crossover(a, b, range),
            ),
        );

        let mut edges = Vec::new();

        if let (Some(members_a), Some(members_b)) = (members.get(a), members.get(b)) {
            edges.extend(shared_members_edge(
                a,
                b,
                members_a,
                members_b,
                &self.settings,
            ));
        }
        if let Some(connection) = connection {
            edges.extend(graph_connection_edge(a, b, &connection, &self.settings));
        }
        if let Some(crossover) = crossover {
            edges.extend(crossover_edge(a, b, &crossover, &self.settings));
        }

        debug!("Pair {} produced {} edges", subject, edges.len());
        edges
    }

    /// Edges touching `scene_slug`, heaviest first. Empty on store failure.
    pub fn get_scene_relationships(&self, scene_slug: &str) -> Vec<SceneRelationship> {
        self.store
            .get_scene_relationships(scene_slug)
            .unwrap_or_else(|e| {
                error!("Failed to read relationships of {}: {}", scene_slug, e);
                Vec::new()
            })
    }

    /// Scenes reachable from `scene_slug` within `depth` hops over edges
    /// heavier than the cluster threshold.
    pub fn get_scene_cluster(&self, scene_slug: &str, depth: usize) -> SceneCluster {
        let graph = StoreGraph::new(self.store.as_ref());
        let result = bounded_cluster_bfs(
            &graph,
            scene_slug,
            depth,
            self.settings.cluster_weight_threshold,
        )
        .and_then(|members| summarize_cluster(self.store.as_ref(), scene_slug, members));

        match result {
            Ok(cluster) => cluster,
            Err(e) => {
                error!("Failed to compute cluster of {}: {}", scene_slug, e);
                SceneCluster::degenerate(scene_slug)
            }
        }
    }

    /// Relationships whose weight has recently grown.
    ///
    /// Edge weights are not tracked over time yet, so there is nothing to
    /// compare against and the result is always empty.
    pub fn find_emerging_relationships(&self, scene_slug: &str) -> Vec<SceneRelationship> {
        debug!(
            "Emerging relationship detection requested for {}, weight history not tracked",
            scene_slug
        );
        Vec::new()
    }
}
