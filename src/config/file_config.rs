use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub signals_url: Option<String>,

    // Feature configs
    pub relationships: Option<RelationshipsConfig>,
    pub recommendations: Option<RecommendationsConfig>,
    pub adapters: Option<AdaptersConfig>,
    pub jobs: Option<JobsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RelationshipsConfig {
    pub shared_audience_threshold: Option<f64>,
    pub graph_connection_threshold: Option<f64>,
    pub crossover_min_campaigns: Option<u32>,
    pub crossover_saturation_campaigns: Option<u32>,
    pub crossover_window_days: Option<u32>,
    pub cluster_weight_threshold: Option<f64>,
    pub default_cluster_depth: Option<usize>,
    pub rebuild_concurrency: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RecommendationsConfig {
    pub user_cache_ttl_hours: Option<u64>,
    pub trending_limit: Option<usize>,
    pub max_scene_items: Option<usize>,
    pub max_microgenre_items: Option<usize>,
    pub max_microgenre_recommendations: Option<usize>,
    pub emerging_limit: Option<usize>,
    pub similar_artists_limit: Option<usize>,
    pub pulse_fetch_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AdaptersConfig {
    pub call_timeout_ms: Option<u64>,
    pub http_timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct JobsConfig {
    pub rebuild_interval_hours: Option<u64>,
    pub cache_cleanup_interval_hours: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
