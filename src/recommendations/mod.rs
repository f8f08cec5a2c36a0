//! Scene and microgenre recommendations for users and artists.

mod engine;
mod models;

pub use engine::RecommendationEngine;
pub use models::{
    deduplicate_recommendations, Category, Confidence, MicrogenreRecommendations,
    RecommendationItem, RecommendationReason, SceneRecommendations,
};
