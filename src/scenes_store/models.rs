//! Models for the scenes database.
//!
//! Scenes, microgenres and memberships are curated elsewhere and only read
//! by the engines. Relationships are written exclusively by the relationship
//! rebuild and carry typed evidence instead of free-form metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// =============================================================================
// Enumerations
// =============================================================================

/// Kind of entity that can belong to a scene.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Artist,
    Label,
    Venue,
    Tastemaker,
    Outlet,
    Playlist,
}

impl EntityType {
    /// Convert from database string representation
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "artist" => Some(EntityType::Artist),
            "label" => Some(EntityType::Label),
            "venue" => Some(EntityType::Venue),
            "tastemaker" => Some(EntityType::Tastemaker),
            "outlet" => Some(EntityType::Outlet),
            "playlist" => Some(EntityType::Playlist),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EntityType::Artist => "artist",
            EntityType::Label => "label",
            EntityType::Venue => "venue",
            EntityType::Tastemaker => "tastemaker",
            EntityType::Outlet => "outlet",
            EntityType::Playlist => "playlist",
        }
    }
}

/// Type of a scene-to-scene edge. A scene pair holds at most one edge per type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    SharesAudience,
    Influences,
    Adjacent,
    Crossover,
}

impl RelationType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "shares_audience" => Some(RelationType::SharesAudience),
            "influences" => Some(RelationType::Influences),
            "adjacent" => Some(RelationType::Adjacent),
            "crossover" => Some(RelationType::Crossover),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            RelationType::SharesAudience => "shares_audience",
            RelationType::Influences => "influences",
            RelationType::Adjacent => "adjacent",
            RelationType::Crossover => "crossover",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// =============================================================================
// Curated entities
// =============================================================================

/// A named music community or movement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub microgenres: Vec<String>,
}

/// A finer-grained sound classification, optionally nested under a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Microgenre {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub parent_scene_slug: Option<String>,
}

/// An entity's affiliation with a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneMembership {
    pub entity_slug: String,
    pub entity_type: EntityType,
    pub scene_slug: String,
    pub confidence: f64,
}

// =============================================================================
// Relationships
// =============================================================================

/// Evidence backing a relationship, one variant per relation type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "relation_type", rename_all = "snake_case")]
pub enum RelationshipEvidence {
    SharesAudience {
        shared_member_count: usize,
        overlap_percentage: f64,
    },
    Influences {
        connection_strength: f64,
        shared_nodes: u32,
        shared_artists: u32,
        shared_tastemakers: u32,
    },
    Adjacent {
        connection_strength: f64,
        shared_nodes: u32,
        shared_artists: u32,
        shared_tastemakers: u32,
    },
    Crossover {
        crossover_campaigns: u32,
        shared_artists: u32,
        avg_success_rate: f64,
    },
}

impl RelationshipEvidence {
    pub fn relation_type(&self) -> RelationType {
        match self {
            RelationshipEvidence::SharesAudience { .. } => RelationType::SharesAudience,
            RelationshipEvidence::Influences { .. } => RelationType::Influences,
            RelationshipEvidence::Adjacent { .. } => RelationType::Adjacent,
            RelationshipEvidence::Crossover { .. } => RelationType::Crossover,
        }
    }
}

/// A proposed edge, keyed by `(source, target, relation_type)`.
///
/// The pair is stored in lexicographic slug order so that `(a, b)` and
/// `(b, a)` upsert the same row.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeInput {
    source_scene_slug: String,
    target_scene_slug: String,
    weight: f64,
    evidence: RelationshipEvidence,
}

impl EdgeInput {
    pub fn new(scene_a: &str, scene_b: &str, weight: f64, evidence: RelationshipEvidence) -> Self {
        let (source, target) = if scene_a <= scene_b {
            (scene_a, scene_b)
        } else {
            (scene_b, scene_a)
        };
        Self {
            source_scene_slug: source.to_string(),
            target_scene_slug: target.to_string(),
            weight: clamp_unit(weight),
            evidence,
        }
    }

    pub fn source_scene_slug(&self) -> &str {
        &self.source_scene_slug
    }

    pub fn target_scene_slug(&self) -> &str {
        &self.target_scene_slug
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn relation_type(&self) -> RelationType {
        self.evidence.relation_type()
    }

    pub fn evidence(&self) -> &RelationshipEvidence {
        &self.evidence
    }

    /// Upsert key of this edge.
    pub fn key(&self) -> (&str, &str, RelationType) {
        (
            &self.source_scene_slug,
            &self.target_scene_slug,
            self.relation_type(),
        )
    }
}

/// A persisted scene-to-scene edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneRelationship {
    pub source_scene_slug: String,
    pub target_scene_slug: String,
    pub relation_type: RelationType,
    pub weight: f64,
    pub evidence: RelationshipEvidence,
    pub updated_at: i64,
}

impl SceneRelationship {
    /// The endpoint opposite to `scene_slug`, if the edge touches it.
    pub fn other_end(&self, scene_slug: &str) -> Option<&str> {
        if self.source_scene_slug == scene_slug {
            Some(&self.target_scene_slug)
        } else if self.target_scene_slug == scene_slug {
            Some(&self.source_scene_slug)
        } else {
            None
        }
    }
}

// =============================================================================
// Recommendation cache
// =============================================================================

/// A cached recommendation payload for one subject.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedRecommendation {
    pub subject_id: String,
    pub payload: JsonValue,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Clamp a score or weight into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
