mod file_config;

pub use file_config::{
    AdaptersConfig, FileConfig, JobsConfig, RecommendationsConfig, RelationshipsConfig,
};

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub signals_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub signals_url: Option<String>,

    pub relationships: RelationshipSettings,
    pub recommendations: RecommendationSettings,
    pub adapters: AdapterSettings,
    pub jobs: JobSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via --db-path or in config file")
            })?;
        if db_path.is_dir() {
            bail!("db_path points to a directory: {:?}", db_path);
        }

        let signals_url = file.signals_url.or_else(|| cli.signals_url.clone());

        let relationships =
            RelationshipSettings::from_file(&file.relationships.unwrap_or_default());
        let recommendations =
            RecommendationSettings::from_file(&file.recommendations.unwrap_or_default());

        let adapters_file = file.adapters.unwrap_or_default();
        let adapter_defaults = AdapterSettings::default();
        let adapters = AdapterSettings {
            call_timeout: adapters_file
                .call_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(adapter_defaults.call_timeout),
            http_timeout_sec: adapters_file
                .http_timeout_sec
                .unwrap_or(adapter_defaults.http_timeout_sec),
        };

        let jobs_file = file.jobs.unwrap_or_default();
        let job_defaults = JobSettings::default();
        let jobs = JobSettings {
            rebuild_interval_hours: jobs_file
                .rebuild_interval_hours
                .unwrap_or(job_defaults.rebuild_interval_hours),
            cache_cleanup_interval_hours: jobs_file
                .cache_cleanup_interval_hours
                .unwrap_or(job_defaults.cache_cleanup_interval_hours),
        };

        if relationships.rebuild_concurrency == 0 {
            bail!("relationships.rebuild_concurrency must be at least 1");
        }
        if jobs.rebuild_interval_hours == 0 || jobs.cache_cleanup_interval_hours == 0 {
            bail!("job intervals must be at least one hour");
        }

        Ok(Self {
            db_path,
            signals_url,
            relationships,
            recommendations,
            adapters,
            jobs,
        })
    }
}

/// Thresholds and limits of the relationship rebuild and cluster discovery.
#[derive(Debug, Clone)]
pub struct RelationshipSettings {
    /// Jaccard similarity above which a shared-audience edge is emitted.
    pub shared_audience_threshold: f64,
    /// Graph connection strength above which an influence/adjacency edge is emitted.
    pub graph_connection_threshold: f64,
    /// Crossover campaign count above which a crossover edge is emitted.
    pub crossover_min_campaigns: u32,
    /// Campaign count at which a crossover edge reaches weight 1.0.
    pub crossover_saturation_campaigns: u32,
    pub crossover_window_days: u32,
    /// Edges at or below this weight are not traversed during cluster discovery.
    pub cluster_weight_threshold: f64,
    pub default_cluster_depth: usize,
    /// Maximum number of scene pairs analyzed at once.
    pub rebuild_concurrency: usize,
}

impl Default for RelationshipSettings {
    fn default() -> Self {
        Self {
            shared_audience_threshold: 0.2,
            graph_connection_threshold: 0.3,
            crossover_min_campaigns: 5,
            crossover_saturation_campaigns: 20,
            crossover_window_days: 90,
            cluster_weight_threshold: 0.3,
            default_cluster_depth: 2,
            rebuild_concurrency: 8,
        }
    }
}

impl RelationshipSettings {
    fn from_file(file: &RelationshipsConfig) -> Self {
        let defaults = Self::default();
        Self {
            shared_audience_threshold: file
                .shared_audience_threshold
                .unwrap_or(defaults.shared_audience_threshold),
            graph_connection_threshold: file
                .graph_connection_threshold
                .unwrap_or(defaults.graph_connection_threshold),
            crossover_min_campaigns: file
                .crossover_min_campaigns
                .unwrap_or(defaults.crossover_min_campaigns),
            crossover_saturation_campaigns: file
                .crossover_saturation_campaigns
                .unwrap_or(defaults.crossover_saturation_campaigns)
                .max(1),
            crossover_window_days: file
                .crossover_window_days
                .unwrap_or(defaults.crossover_window_days),
            cluster_weight_threshold: file
                .cluster_weight_threshold
                .unwrap_or(defaults.cluster_weight_threshold),
            default_cluster_depth: file
                .default_cluster_depth
                .unwrap_or(defaults.default_cluster_depth),
            rebuild_concurrency: file
                .rebuild_concurrency
                .unwrap_or(defaults.rebuild_concurrency),
        }
    }
}

/// Scores, limits and cache policy of the recommendation engine.
#[derive(Debug, Clone)]
pub struct RecommendationSettings {
    pub user_cache_ttl_hours: u64,
    pub trending_limit: usize,
    pub max_scene_items: usize,
    pub max_microgenre_items: usize,
    pub max_microgenre_recommendations: usize,
    pub emerging_limit: usize,
    pub similar_artists_limit: usize,
    /// How many global pulses to scan when looking for emerging scenes.
    pub pulse_fetch_limit: usize,
    pub creative_scene_score: f64,
    pub creative_microgenre_score: f64,
    pub creative_microgenre_recommendation_score: f64,
    pub similarity_propagation_factor: f64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            user_cache_ttl_hours: 24,
            trending_limit: 10,
            max_scene_items: 10,
            max_microgenre_items: 7,
            max_microgenre_recommendations: 10,
            emerging_limit: 3,
            similar_artists_limit: 5,
            pulse_fetch_limit: 50,
            creative_scene_score: 0.7,
            creative_microgenre_score: 0.75,
            creative_microgenre_recommendation_score: 0.8,
            similarity_propagation_factor: 0.7,
        }
    }
}

impl RecommendationSettings {
    fn from_file(file: &RecommendationsConfig) -> Self {
        let defaults = Self::default();
        Self {
            user_cache_ttl_hours: file
                .user_cache_ttl_hours
                .unwrap_or(defaults.user_cache_ttl_hours),
            trending_limit: file.trending_limit.unwrap_or(defaults.trending_limit),
            max_scene_items: file.max_scene_items.unwrap_or(defaults.max_scene_items),
            max_microgenre_items: file
                .max_microgenre_items
                .unwrap_or(defaults.max_microgenre_items),
            max_microgenre_recommendations: file
                .max_microgenre_recommendations
                .unwrap_or(defaults.max_microgenre_recommendations),
            emerging_limit: file.emerging_limit.unwrap_or(defaults.emerging_limit),
            similar_artists_limit: file
                .similar_artists_limit
                .unwrap_or(defaults.similar_artists_limit),
            pulse_fetch_limit: file.pulse_fetch_limit.unwrap_or(defaults.pulse_fetch_limit),
            ..defaults
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdapterSettings {
    /// Budget for a single external call, independent of other calls.
    pub call_timeout: Duration,
    pub http_timeout_sec: u64,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            http_timeout_sec: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobSettings {
    pub rebuild_interval_hours: u64,
    pub cache_cleanup_interval_hours: u64,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            rebuild_interval_hours: 24,
            cache_cleanup_interval_hours: 6,
        }
    }
}
