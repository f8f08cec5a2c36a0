//! Payloads exchanged with the external signal services.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// Connection inferred between two scenes by the industry graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInference {
    pub connection_strength: f64,
    #[serde(default)]
    pub shared_nodes: u32,
    #[serde(default)]
    pub shared_artists: u32,
    #[serde(default)]
    pub shared_tastemakers: u32,
}

/// Closed time window for campaign analytics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// The `days` days leading up to now.
    pub fn trailing_days(days: u32) -> Self {
        let end = Utc::now();
        Self {
            start: end - ChronoDuration::days(days as i64),
            end,
        }
    }
}

/// Campaigns that ran across two scenes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossoverAnalysis {
    pub crossover_campaigns: u32,
    #[serde(default)]
    pub shared_artists: u32,
    #[serde(default)]
    pub avg_success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSuggestion {
    pub scene_slug: String,
    pub score: f64,
    pub reason: String,
}

/// Scenes where an artist's campaigns performed well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSceneSignals {
    #[serde(default)]
    pub suggested_scenes: Vec<SceneSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarArtist {
    pub artist_id: String,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileScene {
    pub slug: String,
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMicrogenre {
    pub slug: String,
    pub name: String,
    pub confidence: f64,
}

/// Scene affiliations of an entity as known to the membership service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySceneProfile {
    #[serde(default)]
    pub primary_scene: Option<ProfileScene>,
    #[serde(default)]
    pub microgenres: Vec<ProfileMicrogenre>,
}

/// Growth pattern of a scene as classified by the pulse service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthClassification {
    Emerging,
    Hot,
    Stable,
    Cooling,
    Dormant,
    Niche,
}

impl GrowthClassification {
    /// Short human-readable description used in recommendation reasons.
    pub fn describe(&self) -> &'static str {
        match self {
            GrowthClassification::Emerging => "emerging scene with fast growth",
            GrowthClassification::Hot => "hot scene with strong momentum",
            GrowthClassification::Stable => "established scene with steady activity",
            GrowthClassification::Cooling => "large scene that is cooling down",
            GrowthClassification::Dormant => "quiet scene with little activity",
            GrowthClassification::Niche => "niche scene with a loyal following",
        }
    }
}

impl std::fmt::Display for GrowthClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GrowthClassification::Emerging => "Emerging",
            GrowthClassification::Hot => "Hot",
            GrowthClassification::Stable => "Stable",
            GrowthClassification::Cooling => "Cooling",
            GrowthClassification::Dormant => "Dormant",
            GrowthClassification::Niche => "Niche",
        };
        f.write_str(label)
    }
}

/// Hotness and growth of one scene. `hotness_score` is on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePulse {
    pub scene_slug: String,
    pub scene_name: String,
    pub hotness_score: f64,
    pub growth_classification: GrowthClassification,
    pub growth_rate: f64,
}
