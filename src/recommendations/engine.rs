use super::models::{
    deduplicate_recommendations, rank, Category, Confidence, MicrogenreRecommendations,
    RecommendationItem, RecommendationReason, SceneRecommendations,
};
use crate::adapters::guard::guarded;
use crate::adapters::{GrowthClassification, ScenePulse, SignalAdapters};
use crate::config::RecommendationSettings;
use crate::metrics;
use crate::scenes_store::{EntityType, Microgenre, SceneStore};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Ranked, explained scene and microgenre recommendations.
///
/// Every public method returns a valid result. Failed signals are logged
/// and leave a note instead of items.
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn SceneStore>,
    signals: SignalAdapters,
    settings: RecommendationSettings,
    adapter_timeout: Duration,
}

impl RecommendationEngine {
    pub fn new(
        store: Arc<dyn SceneStore>,
        signals: SignalAdapters,
        settings: RecommendationSettings,
        adapter_timeout: Duration,
    ) -> Self {
        Self {
            store,
            signals,
            settings,
            adapter_timeout,
        }
    }

    fn user_cache_key(user_id: &str) -> String {
        format!("user:{}", user_id)
    }

    /// Generic trending scenes for a user, cached per user.
    pub async fn recommend_scenes_for_user(&self, user_id: &str) -> SceneRecommendations {
        let cache_key = Self::user_cache_key(user_id);

        match self.store.get_cached_recommendation(&cache_key) {
            Ok(Some(cached)) => {
                match serde_json::from_value::<SceneRecommendations>(cached.payload) {
                    Ok(recommendations) => {
                        metrics::record_cache_lookup(true);
                        debug!("Serving cached recommendations for user {}", user_id);
                        return recommendations;
                    }
                    Err(e) => warn!("Discarding unreadable cache entry {}: {}", cache_key, e),
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read recommendation cache for {}: {}", user_id, e),
        }
        metrics::record_cache_lookup(false);

        let scenes = self
            .get_global_trending_scenes(self.settings.trending_limit)
            .await;

        let mut notes = Vec::new();
        if scenes.is_empty() {
            notes.push("No trending scene data is available right now".to_string());
        } else {
            notes.push(format!(
                "{} scenes trending across the network",
                scenes.len()
            ));
            notes.push("Based on global scene momentum, not on personal history".to_string());
        }

        let recommendations = SceneRecommendations {
            subject: user_id.to_string(),
            scenes,
            microgenres: Vec::new(),
            notes,
            generated_at: Utc::now(),
        };

        // An empty result usually means the pulse service is down; keep it
        // out of the cache so the next request retries.
        if !recommendations.scenes.is_empty() {
            match serde_json::to_value(&recommendations) {
                Ok(payload) => {
                    if let Err(e) = self.store.cache_recommendation(
                        &cache_key,
                        &payload,
                        self.settings.user_cache_ttl_hours,
                    ) {
                        warn!("Failed to cache recommendations for {}: {}", user_id, e);
                    }
                }
                Err(e) => warn!("Failed to serialize recommendations for {}: {}", user_id, e),
            }
        }

        recommendations
    }

    /// Personalized scene and microgenre recommendations for an artist.
    /// Never cached.
    ///
    /// Stages, each additive and in this order:
    /// 1. the artist's current primary scene (core)
    /// 2. microgenres from the creative profile, plus their parent scenes (adjacent)
    /// 3. scenes where the artist's campaigns performed well (opportunity)
    /// 4. the fastest growing emerging scenes, minus those already recommended
    ///    (experimental)
    ///
    /// Duplicate slugs keep their first occurrence, then both lists are
    /// ranked by score and truncated.
    pub async fn recommend_scenes_for_artist(&self, artist_slug: &str) -> SceneRecommendations {
        let timeout = self.adapter_timeout;

        let (profile, creative, campaigns, emerging) = tokio::join!(
            guarded(
                "profiles",
                "get_entity_scene_profile",
                artist_slug,
                timeout,
                self.signals
                    .profiles
                    .get_entity_scene_profile(artist_slug, EntityType::Artist),
            ),
            guarded(
                "creative",
                "derive_microgenres",
                artist_slug,
                timeout,
                self.signals.creative.derive_microgenres(artist_slug),
            ),
            guarded(
                "campaigns",
                "artist_scene_signals",
                artist_slug,
                timeout,
                self.signals.campaigns.artist_scene_signals(artist_slug),
            ),
            self.fetch_emerging_pulses(artist_slug),
        );

        let mut scenes: Vec<RecommendationItem> = Vec::new();
        let mut microgenres: Vec<RecommendationItem> = Vec::new();
        let mut notes: Vec<String> = Vec::new();

        // Stage 1: where the artist already is
        match profile {
            Some(profile) => {
                if let Some(primary) = profile.primary_scene {
                    scenes.push(RecommendationItem::new(
                        primary.slug,
                        primary.name,
                        primary.confidence,
                        RecommendationReason::PrimaryScene,
                        Confidence::High,
                        Category::Core,
                    ));
                }
            }
            None => notes.push("Scene profile unavailable".to_string()),
        }

        // Stage 2: creative profile
        match creative {
            Some(slugs) => {
                for slug in slugs {
                    let microgenre = self.lookup_microgenre(&slug);
                    let name = microgenre
                        .as_ref()
                        .map(|m| m.name.clone())
                        .unwrap_or_else(|| slug.clone());

                    if let Some(parent) = microgenre.and_then(|m| m.parent_scene_slug) {
                        scenes.push(RecommendationItem::new(
                            parent.clone(),
                            self.scene_name(&parent),
                            self.settings.creative_scene_score,
                            RecommendationReason::ParentOfMicrogenre {
                                microgenre_slug: slug.clone(),
                            },
                            Confidence::Medium,
                            Category::Adjacent,
                        ));
                    }

                    microgenres.push(RecommendationItem::new(
                        slug,
                        name,
                        self.settings.creative_microgenre_score,
                        RecommendationReason::CreativeProfileMatch,
                        Confidence::Medium,
                        Category::Core,
                    ));
                }
            }
            None => notes.push("Creative profile unavailable".to_string()),
        }

        // Stage 3: campaign performance
        match campaigns {
            Some(signals) => {
                for suggestion in signals.suggested_scenes {
                    let confidence = if suggestion.score > 0.7 {
                        Confidence::High
                    } else {
                        Confidence::Medium
                    };
                    scenes.push(RecommendationItem::new(
                        suggestion.scene_slug.clone(),
                        self.scene_name(&suggestion.scene_slug),
                        suggestion.score,
                        RecommendationReason::CampaignPerformance {
                            detail: suggestion.reason,
                        },
                        confidence,
                        Category::Opportunity,
                    ));
                }
            }
            None => notes.push("Campaign signals unavailable".to_string()),
        }

        // Stage 4: emerging scenes
        match emerging {
            Some(pulses) => {
                let present: HashSet<&str> = scenes.iter().map(|s| s.slug.as_str()).collect();
                let experimental: Vec<RecommendationItem> = pulses
                    .into_iter()
                    .take(self.settings.emerging_limit)
                    .filter(|p| !present.contains(p.scene_slug.as_str()))
                    .map(emerging_item)
                    .collect();
                scenes.extend(experimental);
            }
            None => notes.push("Scene pulse unavailable".to_string()),
        }

        // Stage 5: dedupe, rank, cap
        let scenes = rank(
            deduplicate_recommendations(scenes),
            self.settings.max_scene_items,
        );
        let microgenres = rank(
            deduplicate_recommendations(microgenres),
            self.settings.max_microgenre_items,
        );

        if scenes.is_empty() && microgenres.is_empty() {
            notes.push(format!("No recommendations available for {}", artist_slug));
        } else {
            notes.insert(0, summarize(&scenes, microgenres.len()));
        }

        info!(
            "Recommended {} scenes and {} microgenres for artist {}",
            scenes.len(),
            microgenres.len(),
            artist_slug
        );

        SceneRecommendations {
            subject: artist_slug.to_string(),
            scenes,
            microgenres,
            notes,
            generated_at: Utc::now(),
        }
    }

    /// Microgenres from the artist's creative profile, extended with the
    /// microgenres held by the most similar artists.
    pub async fn recommend_microgenres_for_artist(
        &self,
        artist_slug: &str,
    ) -> MicrogenreRecommendations {
        let timeout = self.adapter_timeout;
        let limit = self.settings.similar_artists_limit;

        let (creative, similar) = tokio::join!(
            guarded(
                "creative",
                "derive_microgenres",
                artist_slug,
                timeout,
                self.signals.creative.derive_microgenres(artist_slug),
            ),
            guarded(
                "creative",
                "find_similar_artists",
                artist_slug,
                timeout,
                self.signals.creative.find_similar_artists(artist_slug, limit),
            ),
        );

        let mut items: Vec<RecommendationItem> = Vec::new();
        let mut present: HashSet<String> = HashSet::new();
        let mut notes: Vec<String> = Vec::new();

        match creative {
            Some(slugs) => {
                for slug in slugs {
                    if !present.insert(slug.clone()) {
                        continue;
                    }
                    let name = self
                        .lookup_microgenre(&slug)
                        .map(|m| m.name)
                        .unwrap_or_else(|| slug.clone());
                    items.push(RecommendationItem::new(
                        slug,
                        name,
                        self.settings.creative_microgenre_recommendation_score,
                        RecommendationReason::CreativeProfileMatch,
                        Confidence::Medium,
                        Category::Core,
                    ));
                }
            }
            None => notes.push("Creative profile unavailable".to_string()),
        }

        match similar {
            Some(mut artists) => {
                artists.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
                artists.truncate(limit);

                let profiles = join_all(artists.iter().map(|artist| {
                    guarded(
                        "profiles",
                        "get_entity_scene_profile",
                        &artist.artist_id,
                        timeout,
                        self.signals
                            .profiles
                            .get_entity_scene_profile(&artist.artist_id, EntityType::Artist),
                    )
                }))
                .await;

                for (artist, profile) in artists.iter().zip(profiles) {
                    let Some(profile) = profile else {
                        continue;
                    };
                    let score = artist.similarity_score * self.settings.similarity_propagation_factor;
                    for microgenre in profile.microgenres {
                        if !present.insert(microgenre.slug.clone()) {
                            continue;
                        }
                        items.push(RecommendationItem::new(
                            microgenre.slug,
                            microgenre.name,
                            score,
                            RecommendationReason::SimilarArtist {
                                artist_id: artist.artist_id.clone(),
                                similarity: artist.similarity_score,
                            },
                            propagated_confidence(score),
                            Category::Adjacent,
                        ));
                    }
                }
            }
            None => notes.push("Similar artists unavailable".to_string()),
        }

        let microgenres = rank(items, self.settings.max_microgenre_recommendations);
        if microgenres.is_empty() {
            notes.push(format!(
                "No microgenre recommendations available for {}",
                artist_slug
            ));
        } else {
            notes.insert(0, format!("{} microgenres recommended", microgenres.len()));
        }

        MicrogenreRecommendations {
            artist_slug: artist_slug.to_string(),
            microgenres,
            notes,
            generated_at: Utc::now(),
        }
    }

    /// Hottest scenes network-wide. Empty when the pulse service fails.
    pub async fn get_global_trending_scenes(&self, limit: usize) -> Vec<RecommendationItem> {
        let pulses = guarded(
            "pulse",
            "get_global_scene_pulse",
            "global",
            self.adapter_timeout,
            self.signals.pulse.get_global_scene_pulse(limit),
        )
        .await
        .unwrap_or_default();

        let items = pulses
            .into_iter()
            .map(|pulse| {
                RecommendationItem::new(
                    pulse.scene_slug,
                    pulse.scene_name,
                    pulse.hotness_score / 100.0,
                    RecommendationReason::GlobalTrend {
                        classification: pulse.growth_classification,
                    },
                    Confidence::Medium,
                    Category::Opportunity,
                )
            })
            .collect();

        rank(deduplicate_recommendations(items), limit)
    }

    /// Fastest growing scenes classified as emerging. Empty when the pulse
    /// service fails.
    pub async fn get_emerging_scenes(&self, limit: usize) -> Vec<RecommendationItem> {
        self.fetch_emerging_pulses("global")
            .await
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(emerging_item)
            .collect()
    }

    /// Emerging pulses, fastest growth first. `None` when the pulse service
    /// failed.
    async fn fetch_emerging_pulses(&self, subject: &str) -> Option<Vec<ScenePulse>> {
        let pulses = guarded(
            "pulse",
            "get_global_scene_pulse",
            subject,
            self.adapter_timeout,
            self.signals
                .pulse
                .get_global_scene_pulse(self.settings.pulse_fetch_limit),
        )
        .await?;

        let mut seen = HashSet::new();
        let mut emerging: Vec<ScenePulse> = pulses
            .into_iter()
            .filter(|p| p.growth_classification == GrowthClassification::Emerging)
            .filter(|p| seen.insert(p.scene_slug.clone()))
            .collect();
        emerging.sort_by(|a, b| b.growth_rate.total_cmp(&a.growth_rate));
        Some(emerging)
    }

    fn lookup_microgenre(&self, slug: &str) -> Option<Microgenre> {
        self.store.get_microgenre_by_slug(slug).unwrap_or_else(|e| {
            warn!("Failed to look up microgenre {}: {}", slug, e);
            None
        })
    }

    /// Display name of a scene, falling back to its slug.
    fn scene_name(&self, slug: &str) -> String {
        match self.store.get_scene_by_slug(slug) {
            Ok(Some(scene)) => scene.name,
            Ok(None) => slug.to_string(),
            Err(e) => {
                warn!("Failed to look up scene {}: {}", slug, e);
                slug.to_string()
            }
        }
    }
}

fn emerging_item(pulse: ScenePulse) -> RecommendationItem {
    RecommendationItem::new(
        pulse.scene_slug,
        pulse.scene_name,
        pulse.growth_rate,
        RecommendationReason::EmergingGrowth {
            growth_rate: pulse.growth_rate,
        },
        Confidence::Low,
        Category::Experimental,
    )
}

fn propagated_confidence(score: f64) -> Confidence {
    if score > 0.7 {
        Confidence::High
    } else if score >= 0.4 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn summarize(scenes: &[RecommendationItem], microgenre_count: usize) -> String {
    let count = |category: Category| scenes.iter().filter(|s| s.category == category).count();
    format!(
        "{} scenes ({} core, {} adjacent, {} opportunity, {} experimental) and {} microgenres",
        scenes.len(),
        count(Category::Core),
        count(Category::Adjacent),
        count(Category::Opportunity),
        count(Category::Experimental),
        microgenre_count
    )
}
