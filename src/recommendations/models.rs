//! Recommendation result types.

use crate::adapters::GrowthClassification;
use crate::scenes_store::clamp_unit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// How a recommendation relates to where the subject already is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Core,
    Adjacent,
    Opportunity,
    Experimental,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::Adjacent => "adjacent",
            Category::Opportunity => "opportunity",
            Category::Experimental => "experimental",
        }
    }
}

/// Signal that produced a recommendation, with the evidence it carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationReason {
    PrimaryScene,
    CreativeProfileMatch,
    ParentOfMicrogenre {
        microgenre_slug: String,
    },
    CampaignPerformance {
        detail: String,
    },
    EmergingGrowth {
        growth_rate: f64,
    },
    GlobalTrend {
        classification: GrowthClassification,
    },
    SimilarArtist {
        artist_id: String,
        similarity: f64,
    },
}

impl std::fmt::Display for RecommendationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationReason::PrimaryScene => write!(f, "Primary scene in the current profile"),
            RecommendationReason::CreativeProfileMatch => {
                write!(f, "Creative/emotional profile match")
            }
            RecommendationReason::ParentOfMicrogenre { microgenre_slug } => write!(
                f,
                "Parent scene of {}, a creative profile match",
                microgenre_slug
            ),
            RecommendationReason::CampaignPerformance { detail } => {
                write!(f, "Campaign performance: {}", detail)
            }
            RecommendationReason::EmergingGrowth { growth_rate } => write!(
                f,
                "Emerging scene, growing {:.0}%",
                growth_rate * 100.0
            ),
            RecommendationReason::GlobalTrend { classification } => {
                write!(f, "Trending: {}", classification.describe())
            }
            RecommendationReason::SimilarArtist {
                artist_id,
                similarity,
            } => write!(
                f,
                "Used by similar artist {} ({:.0}% similar)",
                artist_id,
                similarity * 100.0
            ),
        }
    }
}

/// One recommended scene or microgenre.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub slug: String,
    pub name: String,
    /// Always in `[0, 1]`.
    pub score: f64,
    pub reason: RecommendationReason,
    pub confidence: Confidence,
    pub category: Category,
}

impl RecommendationItem {
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        score: f64,
        reason: RecommendationReason,
        confidence: Confidence,
        category: Category,
    ) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            score: clamp_unit(score),
            reason,
            confidence,
            category,
        }
    }
}

/// Scene and microgenre recommendations for one user or artist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneRecommendations {
    pub subject: String,
    pub scenes: Vec<RecommendationItem>,
    pub microgenres: Vec<RecommendationItem>,
    pub notes: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MicrogenreRecommendations {
    pub artist_slug: String,
    pub microgenres: Vec<RecommendationItem>,
    pub notes: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Drop repeated slugs, keeping the first occurrence even when a later one
/// scores higher. Order is otherwise preserved.
pub fn deduplicate_recommendations(items: Vec<RecommendationItem>) -> Vec<RecommendationItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.slug.clone()))
        .collect()
}

/// Highest score first, keeping insertion order among equal scores, then
/// truncate to `limit`.
pub(crate) fn rank(mut items: Vec<RecommendationItem>, limit: usize) -> Vec<RecommendationItem> {
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
    items.truncate(limit);
    items
}
