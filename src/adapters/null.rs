//! Signal source used when no signals service is configured.

use super::models::{
    ArtistSceneSignals, ConnectionInference, CrossoverAnalysis, EntitySceneProfile, ScenePulse,
    SimilarArtist, TimeRange,
};
use super::provider::{
    AdapterError, AdapterResult, CampaignAdapter, CreativeProfileAdapter, GraphAdapter,
    ProfileService, PulseService,
};
use crate::scenes_store::EntityType;
use async_trait::async_trait;

/// Reports every signal as unavailable.
pub struct NullSignals;

fn unavailable<T>() -> AdapterResult<T> {
    Err(AdapterError::Unavailable(
        "no signals service configured".to_string(),
    ))
}

#[async_trait]
impl GraphAdapter for NullSignals {
    async fn infer_connection(&self, _a: &str, _b: &str) -> AdapterResult<ConnectionInference> {
        unavailable()
    }
}

#[async_trait]
impl CampaignAdapter for NullSignals {
    async fn analyze_crossover(
        &self,
        _a: &str,
        _b: &str,
        _range: TimeRange,
    ) -> AdapterResult<CrossoverAnalysis> {
        unavailable()
    }

    async fn artist_scene_signals(&self, _artist_slug: &str) -> AdapterResult<ArtistSceneSignals> {
        unavailable()
    }
}

#[async_trait]
impl CreativeProfileAdapter for NullSignals {
    async fn derive_microgenres(&self, _artist_slug: &str) -> AdapterResult<Vec<String>> {
        unavailable()
    }

    async fn find_similar_artists(
        &self,
        _artist_slug: &str,
        _limit: usize,
    ) -> AdapterResult<Vec<SimilarArtist>> {
        unavailable()
    }
}

#[async_trait]
impl ProfileService for NullSignals {
    async fn get_entity_scene_profile(
        &self,
        _entity_slug: &str,
        _entity_type: EntityType,
    ) -> AdapterResult<EntitySceneProfile> {
        unavailable()
    }
}

#[async_trait]
impl PulseService for NullSignals {
    async fn get_scene_pulse(&self, _scene_slug: &str) -> AdapterResult<ScenePulse> {
        unavailable()
    }

    async fn get_global_scene_pulse(&self, _limit: usize) -> AdapterResult<Vec<ScenePulse>> {
        unavailable()
    }
}
