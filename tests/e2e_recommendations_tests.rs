//! End-to-end tests for scene and microgenre recommendations.

mod common;

use common::{
    add_microgenre, pulse, recommendation_engine, scene, store_with_scenes, FakeSignals,
    ARTIST_X, DREAM_POP, DREAM_POP_NAME, INDIE_UK, INDIE_UK_NAME, SCENE_A, SCENE_B, SCENE_C,
    USER_1,
};
use scenes_engine::adapters::{
    EntitySceneProfile, GrowthClassification, ProfileMicrogenre, ProfileScene,
};
use scenes_engine::recommendations::{
    deduplicate_recommendations, Category, Confidence, RecommendationItem, RecommendationReason,
};
use std::time::Duration;

fn profile(primary: Option<(&str, f64)>, microgenres: &[(&str, f64)]) -> EntitySceneProfile {
    EntitySceneProfile {
        primary_scene: primary.map(|(slug, confidence)| ProfileScene {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            confidence,
        }),
        microgenres: microgenres
            .iter()
            .map(|(slug, confidence)| ProfileMicrogenre {
                slug: slug.to_string(),
                name: slug.to_uppercase(),
                confidence: *confidence,
            })
            .collect(),
    }
}

fn find<'a>(items: &'a [RecommendationItem], slug: &str) -> Option<&'a RecommendationItem> {
    items.iter().find(|i| i.slug == slug)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn assert_ranked(items: &[RecommendationItem]) {
    assert!(items.windows(2).all(|w| w[0].score >= w[1].score));
}

// =============================================================================
// Artist scene recommendations
// =============================================================================

#[tokio::test]
async fn test_creative_microgenre_pulls_in_parent_scene() {
    let mut indie = scene(INDIE_UK, Some("uk"), &[DREAM_POP]);
    indie.name = INDIE_UK_NAME.to_string();
    let store = store_with_scenes(&[(indie, &[])]);
    add_microgenre(store.as_ref(), DREAM_POP, DREAM_POP_NAME, Some(INDIE_UK));

    let (_, signals) = FakeSignals::new()
        .with_creative_microgenres(ARTIST_X, &[DREAM_POP])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert_eq!(result.subject, ARTIST_X);
    assert_eq!(result.scenes.len(), 1);
    let parent = &result.scenes[0];
    assert_eq!(parent.slug, INDIE_UK);
    assert_eq!(parent.name, INDIE_UK_NAME);
    assert_close(parent.score, 0.7);
    assert_eq!(parent.category, Category::Adjacent);
    assert_eq!(parent.confidence, Confidence::Medium);
    assert_eq!(
        parent.reason,
        RecommendationReason::ParentOfMicrogenre {
            microgenre_slug: DREAM_POP.to_string()
        }
    );

    assert_eq!(result.microgenres.len(), 1);
    let microgenre = &result.microgenres[0];
    assert_eq!(microgenre.slug, DREAM_POP);
    assert_eq!(microgenre.name, DREAM_POP_NAME);
    assert_close(microgenre.score, 0.75);
    assert_eq!(microgenre.category, Category::Core);
    assert_eq!(microgenre.reason, RecommendationReason::CreativeProfileMatch);

    assert_eq!(
        result.notes[0],
        "1 scenes (0 core, 1 adjacent, 0 opportunity, 0 experimental) and 1 microgenres"
    );
}

#[tokio::test]
async fn test_unknown_creative_microgenre_has_no_parent_scene() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_creative_microgenres(ARTIST_X, &["blackgaze"])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert!(result.scenes.is_empty());
    assert_eq!(result.microgenres.len(), 1);
    assert_eq!(result.microgenres[0].name, "blackgaze");
}

#[tokio::test]
async fn test_primary_scene_wins_over_campaign_duplicate() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_profile(ARTIST_X, profile(Some((SCENE_A, 0.95)), &[("shoegaze", 0.6)]))
        .with_campaign_suggestions(ARTIST_X, &[(SCENE_A, 0.9), (SCENE_B, 0.5), (SCENE_C, 0.8)])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    let slugs: Vec<&str> = result.scenes.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, vec![SCENE_A, SCENE_C, SCENE_B]);

    let primary = find(&result.scenes, SCENE_A).unwrap();
    assert_eq!(primary.category, Category::Core);
    assert_eq!(primary.reason, RecommendationReason::PrimaryScene);
    assert_close(primary.score, 0.95);

    let strong = find(&result.scenes, SCENE_C).unwrap();
    assert_eq!(strong.category, Category::Opportunity);
    assert_eq!(strong.confidence, Confidence::High);

    let weak = find(&result.scenes, SCENE_B).unwrap();
    assert_eq!(weak.confidence, Confidence::Medium);

    // profile microgenres describe where the artist is, they are not recommended
    assert!(result.microgenres.is_empty());
}

#[tokio::test]
async fn test_creative_microgenre_keeps_fixed_score_when_also_in_profile() {
    let store = store_with_scenes(&[]);
    add_microgenre(store.as_ref(), DREAM_POP, DREAM_POP_NAME, None);
    let (_, signals) = FakeSignals::new()
        .with_profile(ARTIST_X, profile(None, &[(DREAM_POP, 0.35)]))
        .with_creative_microgenres(ARTIST_X, &[DREAM_POP])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert_eq!(result.microgenres.len(), 1);
    let microgenre = &result.microgenres[0];
    assert_eq!(microgenre.slug, DREAM_POP);
    assert_close(microgenre.score, 0.75);
    assert_eq!(microgenre.reason, RecommendationReason::CreativeProfileMatch);
    assert_eq!(microgenre.confidence, Confidence::Medium);
}

#[tokio::test]
async fn test_profile_microgenres_do_not_take_microgenre_slots() {
    let store = store_with_scenes(&[]);
    let owned: Vec<(String, f64)> = (0..7).map(|i| (format!("owned-{}", i), 0.95)).collect();
    let owned: Vec<(&str, f64)> = owned.iter().map(|(slug, c)| (slug.as_str(), *c)).collect();
    let creative: Vec<String> = (0..7).map(|i| format!("creative-{}", i)).collect();
    let creative: Vec<&str> = creative.iter().map(String::as_str).collect();

    let (_, signals) = FakeSignals::new()
        .with_profile(ARTIST_X, profile(None, &owned))
        .with_creative_microgenres(ARTIST_X, &creative)
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert_eq!(result.microgenres.len(), 7);
    assert!(result
        .microgenres
        .iter()
        .all(|m| m.reason == RecommendationReason::CreativeProfileMatch));
}

#[tokio::test]
async fn test_artist_results_are_ranked_and_capped() {
    let store = store_with_scenes(&[]);
    let suggestions: Vec<(String, f64)> = (0..15)
        .map(|i| (format!("scene-{:02}", i), 0.3 + i as f64 * 0.04))
        .collect();
    let suggestions: Vec<(&str, f64)> = suggestions
        .iter()
        .map(|(slug, score)| (slug.as_str(), *score))
        .collect();
    let microgenres: Vec<String> = (0..12).map(|i| format!("micro-{:02}", i)).collect();
    let microgenres: Vec<&str> = microgenres.iter().map(String::as_str).collect();

    let (_, signals) = FakeSignals::new()
        .with_campaign_suggestions(ARTIST_X, &suggestions)
        .with_creative_microgenres(ARTIST_X, &microgenres)
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert_eq!(result.scenes.len(), 10);
    assert_eq!(result.microgenres.len(), 7);
    assert_ranked(&result.scenes);
    assert_ranked(&result.microgenres);
    assert_eq!(result.scenes[0].slug, "scene-14");
    assert!(find(&result.scenes, "scene-00").is_none());
}

#[tokio::test]
async fn test_emerging_stage_drops_present_scenes_from_top_three() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_campaign_suggestions(ARTIST_X, &[(SCENE_A, 0.6)])
        .with_pulses(vec![
            pulse(SCENE_A, 50.0, GrowthClassification::Emerging, 0.9),
            pulse("rising-1", 40.0, GrowthClassification::Emerging, 0.8),
            pulse("rising-2", 30.0, GrowthClassification::Emerging, 0.5),
            pulse("rising-3", 20.0, GrowthClassification::Emerging, 0.3),
            pulse("rising-4", 10.0, GrowthClassification::Emerging, 0.2),
            pulse("already-hot", 90.0, GrowthClassification::Hot, 0.95),
        ])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    let mut experimental: Vec<&str> = result
        .scenes
        .iter()
        .filter(|s| s.category == Category::Experimental)
        .map(|s| s.slug.as_str())
        .collect();
    experimental.sort();
    // scene-a is among the three fastest but already an opportunity
    assert_eq!(experimental, vec!["rising-1", "rising-2"]);

    let rising = find(&result.scenes, "rising-1").unwrap();
    assert_close(rising.score, 0.8);
    assert_eq!(rising.confidence, Confidence::Low);
    assert_eq!(
        find(&result.scenes, SCENE_A).unwrap().category,
        Category::Opportunity
    );
}

#[tokio::test]
async fn test_artist_recommendations_survive_every_signal_failing() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new().failing("*").into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert!(result.scenes.is_empty());
    assert!(result.microgenres.is_empty());
    for note in [
        "Scene profile unavailable",
        "Creative profile unavailable",
        "Campaign signals unavailable",
        "Scene pulse unavailable",
        "No recommendations available for artist-x",
    ] {
        assert!(result.notes.iter().any(|n| n == note), "missing note {}", note);
    }
}

#[tokio::test]
async fn test_slow_signal_only_loses_its_stage() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_creative_microgenres(ARTIST_X, &["shoegaze"])
        .with_campaign_suggestions(ARTIST_X, &[(SCENE_A, 0.9)])
        .with_delay("artist_scene_signals", Duration::from_millis(800))
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert!(find(&result.scenes, SCENE_A).is_none());
    assert!(find(&result.microgenres, "shoegaze").is_some());
    assert!(result
        .notes
        .iter()
        .any(|n| n == "Campaign signals unavailable"));
    assert!(!result
        .notes
        .iter()
        .any(|n| n == "Creative profile unavailable"));
}

#[tokio::test]
async fn test_artist_recommendations_are_not_cached() {
    let store = store_with_scenes(&[]);
    let (fake, signals) = FakeSignals::new()
        .with_profile(ARTIST_X, profile(Some((SCENE_A, 0.8)), &[]))
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    engine.recommend_scenes_for_artist(ARTIST_X).await;
    engine.recommend_scenes_for_artist(ARTIST_X).await;

    assert_eq!(fake.call_count("get_entity_scene_profile"), 2);
}

// =============================================================================
// User scene recommendations
// =============================================================================

#[tokio::test]
async fn test_user_recommendations_are_trending_scenes() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_pulses(vec![
            pulse(SCENE_A, 80.0, GrowthClassification::Hot, 0.1),
            pulse(SCENE_B, 60.0, GrowthClassification::Stable, 0.0),
        ])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_scenes_for_user(USER_1).await;

    assert_eq!(result.subject, USER_1);
    let slugs: Vec<&str> = result.scenes.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, vec![SCENE_A, SCENE_B]);
    assert!(result.microgenres.is_empty());
    assert_eq!(result.notes[0], "2 scenes trending across the network");
}

#[tokio::test]
async fn test_user_recommendations_are_served_from_cache() {
    let store = store_with_scenes(&[]);
    let (fake, signals) = FakeSignals::new()
        .with_pulses(vec![pulse(SCENE_A, 70.0, GrowthClassification::Hot, 0.2)])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let first = engine.recommend_scenes_for_user(USER_1).await;
    let second = engine.recommend_scenes_for_user(USER_1).await;

    assert_eq!(fake.call_count("get_global_scene_pulse"), 1);
    assert_eq!(first.scenes, second.scenes);
    assert_eq!(first.notes, second.notes);

    engine.recommend_scenes_for_user("user-2").await;
    assert_eq!(fake.call_count("get_global_scene_pulse"), 2);
}

#[tokio::test]
async fn test_empty_user_recommendations_are_not_cached() {
    let store = store_with_scenes(&[]);
    let (fake, signals) = FakeSignals::new().failing("*").into_adapters();
    let engine = recommendation_engine(store, signals);

    let first = engine.recommend_scenes_for_user(USER_1).await;
    engine.recommend_scenes_for_user(USER_1).await;

    assert!(first.scenes.is_empty());
    assert_eq!(
        first.notes,
        vec!["No trending scene data is available right now".to_string()]
    );
    assert_eq!(fake.call_count("get_global_scene_pulse"), 2);
}

// =============================================================================
// Microgenre recommendations
// =============================================================================

#[tokio::test]
async fn test_microgenres_propagate_from_similar_artists() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_creative_microgenres(ARTIST_X, &[DREAM_POP])
        .with_similar_artists(ARTIST_X, &[("artist-z", 0.5), ("artist-y", 0.9)])
        .with_profile("artist-y", profile(None, &[(DREAM_POP, 0.9), ("shoegaze", 0.8)]))
        .with_profile("artist-z", profile(None, &[("slowcore", 0.7)]))
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_microgenres_for_artist(ARTIST_X).await;

    let slugs: Vec<&str> = result.microgenres.iter().map(|m| m.slug.as_str()).collect();
    assert_eq!(slugs, vec![DREAM_POP, "shoegaze", "slowcore"]);

    let own = &result.microgenres[0];
    assert_close(own.score, 0.8);
    assert_eq!(own.reason, RecommendationReason::CreativeProfileMatch);

    let shoegaze = &result.microgenres[1];
    assert_close(shoegaze.score, 0.63);
    assert_eq!(shoegaze.confidence, Confidence::Medium);
    assert_eq!(shoegaze.category, Category::Adjacent);
    assert_eq!(
        shoegaze.reason,
        RecommendationReason::SimilarArtist {
            artist_id: "artist-y".to_string(),
            similarity: 0.9
        }
    );

    let slowcore = &result.microgenres[2];
    assert_close(slowcore.score, 0.35);
    assert_eq!(slowcore.confidence, Confidence::Low);

    assert_eq!(result.notes[0], "3 microgenres recommended");
}

#[tokio::test]
async fn test_microgenres_consult_at_most_five_similar_artists() {
    let store = store_with_scenes(&[]);
    let similar: Vec<(String, f64)> = (0..7)
        .map(|i| (format!("peer-{}", i), 0.9 - i as f64 * 0.1))
        .collect();
    let similar: Vec<(&str, f64)> = similar.iter().map(|(id, s)| (id.as_str(), *s)).collect();

    let mut fake = FakeSignals::new().with_similar_artists(ARTIST_X, &similar);
    for (id, _) in &similar {
        let sound = format!("{}-sound", id);
        fake = fake.with_profile(id, profile(None, &[(sound.as_str(), 0.5)]));
    }
    let (fake, signals) = fake.into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_microgenres_for_artist(ARTIST_X).await;

    assert_eq!(fake.call_count("get_entity_scene_profile"), 5);
    assert_eq!(result.microgenres.len(), 5);
    assert!(find(&result.microgenres, "peer-5-sound").is_none());
    assert_ranked(&result.microgenres);
}

#[tokio::test]
async fn test_microgenres_survive_every_signal_failing() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new().failing("*").into_adapters();
    let engine = recommendation_engine(store, signals);

    let result = engine.recommend_microgenres_for_artist(ARTIST_X).await;

    assert_eq!(result.artist_slug, ARTIST_X);
    assert!(result.microgenres.is_empty());
    assert_eq!(
        result.notes,
        vec![
            "Creative profile unavailable".to_string(),
            "Similar artists unavailable".to_string(),
            "No microgenre recommendations available for artist-x".to_string(),
        ]
    );
}

// =============================================================================
// Global pulse
// =============================================================================

#[tokio::test]
async fn test_trending_scores_scale_hotness() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_pulses(vec![
            pulse(SCENE_B, 40.0, GrowthClassification::Stable, 0.0),
            pulse(SCENE_A, 85.0, GrowthClassification::Hot, 0.3),
        ])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let trending = engine.get_global_trending_scenes(10).await;

    assert_eq!(trending.len(), 2);
    assert_eq!(trending[0].slug, SCENE_A);
    assert_eq!(trending[0].name, "SCENE-A");
    assert_close(trending[0].score, 0.85);
    assert_close(trending[1].score, 0.4);
    assert_eq!(trending[0].category, Category::Opportunity);
    assert_eq!(trending[0].confidence, Confidence::Medium);
    assert_eq!(
        trending[0].reason,
        RecommendationReason::GlobalTrend {
            classification: GrowthClassification::Hot
        }
    );

    let top = engine.get_global_trending_scenes(1).await;
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].slug, SCENE_A);
}

#[tokio::test]
async fn test_emerging_scenes_fastest_growth_first() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .with_pulses(vec![
            pulse("slow", 30.0, GrowthClassification::Emerging, 0.2),
            pulse("fast", 20.0, GrowthClassification::Emerging, 0.7),
            pulse("steady", 90.0, GrowthClassification::Stable, 0.9),
            pulse("medium", 10.0, GrowthClassification::Emerging, 0.4),
        ])
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    let emerging = engine.get_emerging_scenes(2).await;

    let slugs: Vec<&str> = emerging.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["fast", "medium"]);
    assert!(emerging
        .iter()
        .all(|e| e.category == Category::Experimental));
}

#[tokio::test]
async fn test_global_pulse_failure_yields_empty_lists() {
    let store = store_with_scenes(&[]);
    let (_, signals) = FakeSignals::new()
        .failing("get_global_scene_pulse")
        .into_adapters();
    let engine = recommendation_engine(store, signals);

    assert!(engine.get_global_trending_scenes(10).await.is_empty());
    assert!(engine.get_emerging_scenes(3).await.is_empty());
}

// =============================================================================
// Deduplication
// =============================================================================

#[test]
fn test_deduplicate_keeps_first_occurrence() {
    let first = RecommendationItem::new(
        SCENE_A,
        "First",
        0.2,
        RecommendationReason::PrimaryScene,
        Confidence::High,
        Category::Core,
    );
    let second = RecommendationItem::new(
        SCENE_A,
        "Second",
        0.9,
        RecommendationReason::CampaignPerformance {
            detail: "converted".to_string(),
        },
        Confidence::High,
        Category::Opportunity,
    );
    let other = RecommendationItem::new(
        SCENE_B,
        "Other",
        0.5,
        RecommendationReason::PrimaryScene,
        Confidence::Medium,
        Category::Core,
    );

    let deduped = deduplicate_recommendations(vec![first.clone(), second, other.clone()]);

    assert_eq!(deduped, vec![first, other]);
}
