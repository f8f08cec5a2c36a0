//! Configurable in-process signal sources.

use async_trait::async_trait;
use scenes_engine::adapters::{
    AdapterError, AdapterResult, ArtistSceneSignals, CampaignAdapter, ConnectionInference,
    CreativeProfileAdapter, CrossoverAnalysis, EntitySceneProfile, GraphAdapter,
    GrowthClassification, ProfileService, PulseService, SceneSuggestion, ScenePulse,
    SimilarArtist, TimeRange,
};
use scenes_engine::scenes_store::EntityType;
use scenes_engine::SignalAdapters;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Answers every signal from in-memory tables. Unknown subjects get an
/// empty answer. Individual operations can be made to fail or stall.
#[derive(Default)]
pub struct FakeSignals {
    connections: HashMap<(String, String), ConnectionInference>,
    crossovers: HashMap<(String, String), CrossoverAnalysis>,
    artist_signals: HashMap<String, ArtistSceneSignals>,
    creative_microgenres: HashMap<String, Vec<String>>,
    similar_artists: HashMap<String, Vec<SimilarArtist>>,
    profiles: HashMap<String, EntitySceneProfile>,
    pulses: Vec<ScenePulse>,
    failing: Vec<&'static str>,
    panicking_pairs: Vec<(String, String)>,
    delays: HashMap<&'static str, Duration>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(
        mut self,
        a: &str,
        b: &str,
        strength: f64,
        shared_artists: u32,
        shared_tastemakers: u32,
    ) -> Self {
        self.connections.insert(
            pair_key(a, b),
            ConnectionInference {
                connection_strength: strength,
                shared_nodes: shared_artists + shared_tastemakers,
                shared_artists,
                shared_tastemakers,
            },
        );
        self
    }

    pub fn with_crossover(mut self, a: &str, b: &str, campaigns: u32) -> Self {
        self.crossovers.insert(
            pair_key(a, b),
            CrossoverAnalysis {
                crossover_campaigns: campaigns,
                shared_artists: 2,
                avg_success_rate: 0.5,
            },
        );
        self
    }

    pub fn with_campaign_suggestions(mut self, artist: &str, scenes: &[(&str, f64)]) -> Self {
        self.artist_signals.insert(
            artist.to_string(),
            ArtistSceneSignals {
                suggested_scenes: scenes
                    .iter()
                    .map(|(slug, score)| SceneSuggestion {
                        scene_slug: slug.to_string(),
                        score: *score,
                        reason: format!("campaigns in {} converted well", slug),
                    })
                    .collect(),
            },
        );
        self
    }

    pub fn with_creative_microgenres(mut self, artist: &str, microgenres: &[&str]) -> Self {
        self.creative_microgenres.insert(
            artist.to_string(),
            microgenres.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_similar_artists(mut self, artist: &str, similar: &[(&str, f64)]) -> Self {
        self.similar_artists.insert(
            artist.to_string(),
            similar
                .iter()
                .map(|(id, score)| SimilarArtist {
                    artist_id: id.to_string(),
                    similarity_score: *score,
                })
                .collect(),
        );
        self
    }

    pub fn with_profile(mut self, entity: &str, profile: EntitySceneProfile) -> Self {
        self.profiles.insert(entity.to_string(), profile);
        self
    }

    pub fn with_pulses(mut self, pulses: Vec<ScenePulse>) -> Self {
        self.pulses = pulses;
        self
    }

    /// Make `operation` fail with `Unavailable`. `"*"` fails everything.
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.push(operation);
        self
    }

    /// Panic while inferring the connection between `a` and `b`.
    pub fn panicking_on(mut self, a: &str, b: &str) -> Self {
        self.panicking_pairs.push(pair_key(a, b));
        self
    }

    /// Make `operation` sleep before answering.
    pub fn with_delay(mut self, operation: &'static str, delay: Duration) -> Self {
        self.delays.insert(operation, delay);
        self
    }

    pub fn into_adapters(self) -> (Arc<Self>, SignalAdapters) {
        let signals = Arc::new(self);
        (Arc::clone(&signals), SignalAdapters::from_single(signals))
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    async fn enter(&self, operation: &'static str) -> AdapterResult<()> {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;

        if let Some(delay) = self.delays.get(operation) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&"*") || self.failing.contains(&operation) {
            return Err(AdapterError::Unavailable(format!("{} is down", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl GraphAdapter for FakeSignals {
    async fn infer_connection(&self, a: &str, b: &str) -> AdapterResult<ConnectionInference> {
        self.enter("infer_connection").await?;
        let key = pair_key(a, b);
        if self.panicking_pairs.contains(&key) {
            panic!("graph lookup crashed for {} and {}", key.0, key.1);
        }
        Ok(self
            .connections
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CampaignAdapter for FakeSignals {
    async fn analyze_crossover(
        &self,
        a: &str,
        b: &str,
        _range: TimeRange,
    ) -> AdapterResult<CrossoverAnalysis> {
        self.enter("analyze_crossover").await?;
        Ok(self
            .crossovers
            .get(&pair_key(a, b))
            .cloned()
            .unwrap_or_default())
    }

    async fn artist_scene_signals(&self, artist_slug: &str) -> AdapterResult<ArtistSceneSignals> {
        self.enter("artist_scene_signals").await?;
        Ok(self
            .artist_signals
            .get(artist_slug)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl CreativeProfileAdapter for FakeSignals {
    async fn derive_microgenres(&self, artist_slug: &str) -> AdapterResult<Vec<String>> {
        self.enter("derive_microgenres").await?;
        Ok(self
            .creative_microgenres
            .get(artist_slug)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_similar_artists(
        &self,
        artist_slug: &str,
        limit: usize,
    ) -> AdapterResult<Vec<SimilarArtist>> {
        self.enter("find_similar_artists").await?;
        let mut similar = self
            .similar_artists
            .get(artist_slug)
            .cloned()
            .unwrap_or_default();
        similar.truncate(limit);
        Ok(similar)
    }
}

#[async_trait]
impl ProfileService for FakeSignals {
    async fn get_entity_scene_profile(
        &self,
        entity_slug: &str,
        _entity_type: EntityType,
    ) -> AdapterResult<EntitySceneProfile> {
        self.enter("get_entity_scene_profile").await?;
        Ok(self.profiles.get(entity_slug).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PulseService for FakeSignals {
    async fn get_scene_pulse(&self, scene_slug: &str) -> AdapterResult<ScenePulse> {
        self.enter("get_scene_pulse").await?;
        self.pulses
            .iter()
            .find(|p| p.scene_slug == scene_slug)
            .cloned()
            .ok_or_else(|| AdapterError::Unavailable(format!("no pulse for {}", scene_slug)))
    }

    async fn get_global_scene_pulse(&self, limit: usize) -> AdapterResult<Vec<ScenePulse>> {
        self.enter("get_global_scene_pulse").await?;
        let mut pulses = self.pulses.clone();
        pulses.sort_by(|a, b| b.hotness_score.total_cmp(&a.hotness_score));
        pulses.truncate(limit);
        Ok(pulses)
    }
}

pub fn pulse(
    slug: &str,
    hotness: f64,
    classification: GrowthClassification,
    growth_rate: f64,
) -> ScenePulse {
    ScenePulse {
        scene_slug: slug.to_string(),
        scene_name: slug.to_uppercase(),
        hotness_score: hotness,
        growth_classification: classification,
        growth_rate,
    }
}
