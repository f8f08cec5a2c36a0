//! HTTP client for the signals service.
//!
//! One JSON API fronts the industry graph, campaign analytics, creative
//! profiles, memberships and scene pulse.

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
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use urlencoding::encode;

pub struct HttpSignalsClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MicrogenresResponse {
    #[serde(default)]
    microgenres: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimilarArtistsResponse {
    #[serde(default)]
    artists: Vec<SimilarArtist>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlobalPulseResponse {
    #[serde(default)]
    scenes: Vec<ScenePulse>,
}

impl HttpSignalsClient {
    /// Create a new signals client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the signals service (e.g., "http://localhost:8090")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: &str, timeout_sec: u64) -> AdapterResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> AdapterResult<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AdapterError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AdapterError::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl GraphAdapter for HttpSignalsClient {
    async fn infer_connection(
        &self,
        scene_a: &str,
        scene_b: &str,
    ) -> AdapterResult<ConnectionInference> {
        self.get_json(&format!(
            "/graph/connection?sceneA={}&sceneB={}",
            encode(scene_a),
            encode(scene_b)
        ))
        .await
    }
}

#[async_trait]
impl CampaignAdapter for HttpSignalsClient {
    async fn analyze_crossover(
        &self,
        scene_a: &str,
        scene_b: &str,
        range: TimeRange,
    ) -> AdapterResult<CrossoverAnalysis> {
        self.get_json(&format!(
            "/campaigns/crossover?sceneA={}&sceneB={}&start={}&end={}",
            encode(scene_a),
            encode(scene_b),
            encode(&range.start.to_rfc3339()),
            encode(&range.end.to_rfc3339())
        ))
        .await
    }

    async fn artist_scene_signals(&self, artist_slug: &str) -> AdapterResult<ArtistSceneSignals> {
        self.get_json(&format!("/campaigns/artists/{}/scenes", encode(artist_slug)))
            .await
    }
}

#[async_trait]
impl CreativeProfileAdapter for HttpSignalsClient {
    async fn derive_microgenres(&self, artist_slug: &str) -> AdapterResult<Vec<String>> {
        let response: MicrogenresResponse = self
            .get_json(&format!("/creative/artists/{}/microgenres", encode(artist_slug)))
            .await?;
        Ok(response.microgenres)
    }

    async fn find_similar_artists(
        &self,
        artist_slug: &str,
        limit: usize,
    ) -> AdapterResult<Vec<SimilarArtist>> {
        let response: SimilarArtistsResponse = self
            .get_json(&format!(
                "/creative/artists/{}/similar?limit={}",
                encode(artist_slug),
                limit
            ))
            .await?;
        Ok(response.artists)
    }
}

#[async_trait]
impl ProfileService for HttpSignalsClient {
    async fn get_entity_scene_profile(
        &self,
        entity_slug: &str,
        entity_type: EntityType,
    ) -> AdapterResult<EntitySceneProfile> {
        self.get_json(&format!(
            "/profiles/{}/{}",
            entity_type.to_db_str(),
            encode(entity_slug)
        ))
        .await
    }
}

#[async_trait]
impl PulseService for HttpSignalsClient {
    async fn get_scene_pulse(&self, scene_slug: &str) -> AdapterResult<ScenePulse> {
        self.get_json(&format!("/pulse/scenes/{}", encode(scene_slug)))
            .await
    }

    async fn get_global_scene_pulse(&self, limit: usize) -> AdapterResult<Vec<ScenePulse>> {
        let response: GlobalPulseResponse =
            self.get_json(&format!("/pulse/global?limit={}", limit)).await?;
        Ok(response.scenes)
    }
}
