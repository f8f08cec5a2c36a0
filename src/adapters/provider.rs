//! Traits for the external services that feed the engines.

use super::models::{
    ArtistSceneSignals, ConnectionInference, CrossoverAnalysis, EntitySceneProfile, ScenePulse,
    SimilarArtist, TimeRange,
};
use crate::scenes_store::EntityType;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling an external service.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl AdapterError {
    /// Label used for failure metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Timeout(_) => "timeout",
            AdapterError::Unavailable(_) => "unavailable",
            AdapterError::Http(_) => "http",
            AdapterError::Status { .. } => "status",
            AdapterError::Decode(_) => "decode",
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Industry relationship graph.
#[async_trait]
pub trait GraphAdapter: Send + Sync {
    async fn infer_connection(
        &self,
        scene_a: &str,
        scene_b: &str,
    ) -> AdapterResult<ConnectionInference>;
}

/// Campaign performance analytics.
#[async_trait]
pub trait CampaignAdapter: Send + Sync {
    async fn analyze_crossover(
        &self,
        scene_a: &str,
        scene_b: &str,
        range: TimeRange,
    ) -> AdapterResult<CrossoverAnalysis>;

    async fn artist_scene_signals(&self, artist_slug: &str) -> AdapterResult<ArtistSceneSignals>;
}

/// Creative and emotional profile analysis.
#[async_trait]
pub trait CreativeProfileAdapter: Send + Sync {
    async fn derive_microgenres(&self, artist_slug: &str) -> AdapterResult<Vec<String>>;

    async fn find_similar_artists(
        &self,
        artist_slug: &str,
        limit: usize,
    ) -> AdapterResult<Vec<SimilarArtist>>;
}

/// Membership and scene profile service.
#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_entity_scene_profile(
        &self,
        entity_slug: &str,
        entity_type: EntityType,
    ) -> AdapterResult<EntitySceneProfile>;
}

/// Scene hotness and growth.
#[async_trait]
pub trait PulseService: Send + Sync {
    async fn get_scene_pulse(&self, scene_slug: &str) -> AdapterResult<ScenePulse>;

    /// Pulses of up to `limit` scenes, hottest first.
    async fn get_global_scene_pulse(&self, limit: usize) -> AdapterResult<Vec<ScenePulse>>;
}
