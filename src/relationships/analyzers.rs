//! Edge inference from the three independent signals of a scene pair.
//!
//! Each analyzer is a pure function of the fetched signal and returns at
//! most one edge. Fetching and failure handling live in the engine.

use crate::adapters::{ConnectionInference, CrossoverAnalysis};
use crate::config::RelationshipSettings;
use crate::scenes_store::{EdgeInput, EntityType, RelationshipEvidence};
use crate::similarity::jaccard;
use std::collections::HashSet;

/// Identity of a scene member. Slugs are only unique per entity type.
pub type MemberKey = (EntityType, String);

/// `shares_audience` edge when the Jaccard similarity of the two member sets
/// is above the threshold. The weight is the similarity itself.
pub fn shared_members_edge(
    scene_a: &str,
    scene_b: &str,
    members_a: &HashSet<MemberKey>,
    members_b: &HashSet<MemberKey>,
    settings: &RelationshipSettings,
) -> Option<EdgeInput> {
    let similarity = jaccard(members_a, members_b);
    if similarity <= settings.shared_audience_threshold {
        return None;
    }

    let shared_member_count = members_a.intersection(members_b).count();
    Some(EdgeInput::new(
        scene_a,
        scene_b,
        similarity,
        RelationshipEvidence::SharesAudience {
            shared_member_count,
            overlap_percentage: similarity * 100.0,
        },
    ))
}

/// `influences` or `adjacent` edge from the industry graph. Tastemaker-led
/// connections count as influence, artist-led ones as adjacency.
pub fn graph_connection_edge(
    scene_a: &str,
    scene_b: &str,
    inference: &ConnectionInference,
    settings: &RelationshipSettings,
) -> Option<EdgeInput> {
    if inference.connection_strength.is_nan()
        || inference.connection_strength <= settings.graph_connection_threshold
    {
        return None;
    }

    let &ConnectionInference {
        connection_strength,
        shared_nodes,
        shared_artists,
        shared_tastemakers,
    } = inference;

    let evidence = if shared_tastemakers > shared_artists {
        RelationshipEvidence::Influences {
            connection_strength,
            shared_nodes,
            shared_artists,
            shared_tastemakers,
        }
    } else {
        RelationshipEvidence::Adjacent {
            connection_strength,
            shared_nodes,
            shared_artists,
            shared_tastemakers,
        }
    };

    Some(EdgeInput::new(scene_a, scene_b, connection_strength, evidence))
}

/// `crossover` edge when enough campaigns crossed between the scenes.
/// Weight grows linearly and saturates at 1.0.
pub fn crossover_edge(
    scene_a: &str,
    scene_b: &str,
    analysis: &CrossoverAnalysis,
    settings: &RelationshipSettings,
) -> Option<EdgeInput> {
    if analysis.crossover_campaigns <= settings.crossover_min_campaigns {
        return None;
    }

    let saturation = settings.crossover_saturation_campaigns.max(1) as f64;
    let weight = (analysis.crossover_campaigns as f64 / saturation).min(1.0);

    Some(EdgeInput::new(
        scene_a,
        scene_b,
        weight,
        RelationshipEvidence::Crossover {
            crossover_campaigns: analysis.crossover_campaigns,
            shared_artists: analysis.shared_artists,
            avg_success_rate: analysis.avg_success_rate,
        },
    ))
}
