//! SQLite-backed scene store.

use super::models::{
    CachedRecommendation, EdgeInput, EntityType, Microgenre, RelationType, RelationshipEvidence,
    Scene, SceneMembership, SceneRelationship,
};
use super::schema::SCENES_VERSIONED_SCHEMAS;
use super::trait_def::SceneStore;
use super::validation::{validate_membership, validate_microgenre, validate_scene};
use crate::sqlite_persistence::{VersionedSchema, BASE_DB_VERSION};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Scene store over a single SQLite connection.
#[derive(Clone)]
pub struct SqliteScenesStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScenesStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path).context("Failed to open scenes database")?;

        if is_new_db {
            info!("Creating new scenes database at {:?}", path);
            Self::latest_schema()?.create(&conn)?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;
            if db_version < 1 {
                anyhow::bail!(
                    "Scenes database version {} is invalid (expected >= 1)",
                    db_version
                );
            }

            let schema = SCENES_VERSIONED_SCHEMAS
                .iter()
                .find(|s| s.version == db_version as usize)
                .with_context(|| format!("Unknown scenes database version {}", db_version))?;
            schema.validate(&conn).with_context(|| {
                format!(
                    "Scenes database schema validation failed for version {}",
                    db_version
                )
            })?;

            let current_version = Self::latest_schema()?.version;
            if (db_version as usize) < current_version {
                info!(
                    "Migrating scenes database from version {} to {}",
                    db_version, current_version
                );
                Self::migrate(&mut conn, db_version as usize)?;
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a store backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::latest_schema()?.create(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn latest_schema() -> Result<&'static VersionedSchema> {
        SCENES_VERSIONED_SCHEMAS
            .last()
            .context("No scenes schema defined")
    }

    fn migrate(conn: &mut Connection, from_version: usize) -> Result<()> {
        let tx = conn.transaction()?;
        for schema in SCENES_VERSIONED_SCHEMAS
            .iter()
            .filter(|s| s.version > from_version)
        {
            if let Some(migration) = schema.migration {
                migration(&tx).with_context(|| {
                    format!("Failed to migrate scenes database to version {}", schema.version)
                })?;
            }
            tx.pragma_update(None, "user_version", schema.user_version() as i64)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn row_to_scene(row: &rusqlite::Row) -> rusqlite::Result<Scene> {
        let microgenres_json: String = row.get("microgenres")?;
        Ok(Scene {
            slug: row.get("slug")?,
            name: row.get("name")?,
            region: row.get("region")?,
            microgenres: serde_json::from_str(&microgenres_json).unwrap_or_default(),
        })
    }

    fn row_to_microgenre(row: &rusqlite::Row) -> rusqlite::Result<Microgenre> {
        Ok(Microgenre {
            slug: row.get("slug")?,
            name: row.get("name")?,
            parent_scene_slug: row.get("parent_scene_slug")?,
        })
    }

    fn row_to_relationship(row: &rusqlite::Row) -> rusqlite::Result<SceneRelationship> {
        let relation_type_str: String = row.get("relation_type")?;
        let relation_type = RelationType::from_db_str(&relation_type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown relation type {}", relation_type_str).into(),
            )
        })?;
        let metadata: String = row.get("metadata")?;
        let evidence: RelationshipEvidence = serde_json::from_str(&metadata).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(SceneRelationship {
            source_scene_slug: row.get("source_scene_slug")?,
            target_scene_slug: row.get("target_scene_slug")?,
            relation_type,
            weight: row.get("weight")?,
            evidence,
            updated_at: row.get("updated_at")?,
        })
    }

    fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
    }
}

impl SceneStore for SqliteScenesStore {
    fn list_scenes(&self) -> Result<Vec<Scene>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT slug, name, region, microgenres FROM scenes ORDER BY name ASC")?;
        let scenes = stmt
            .query_map([], Self::row_to_scene)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list scenes")?;
        Ok(scenes)
    }

    fn get_scene_by_slug(&self, slug: &str) -> Result<Option<Scene>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT slug, name, region, microgenres FROM scenes WHERE slug = ?1",
            params![slug],
            Self::row_to_scene,
        )
        .optional()
        .with_context(|| format!("Failed to fetch scene {}", slug))
    }

    fn list_microgenres(&self, parent_scene_slug: Option<&str>) -> Result<Vec<Microgenre>> {
        let conn = self.conn.lock().unwrap();
        let microgenres = match parent_scene_slug {
            Some(parent) => {
                let mut stmt = conn.prepare(
                    "SELECT slug, name, parent_scene_slug FROM microgenres
                     WHERE parent_scene_slug = ?1 ORDER BY name ASC",
                )?;
                let rows = stmt
                    .query_map(params![parent], Self::row_to_microgenre)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT slug, name, parent_scene_slug FROM microgenres ORDER BY name ASC",
                )?;
                let rows = stmt
                    .query_map([], Self::row_to_microgenre)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(microgenres)
    }

    fn get_microgenre_by_slug(&self, slug: &str) -> Result<Option<Microgenre>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT slug, name, parent_scene_slug FROM microgenres WHERE slug = ?1",
            params![slug],
            Self::row_to_microgenre,
        )
        .optional()
        .with_context(|| format!("Failed to fetch microgenre {}", slug))
    }

    fn get_scene_memberships(&self, scene_slug: &str) -> Result<Vec<SceneMembership>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT entity_slug, entity_type, scene_slug, confidence FROM scene_memberships
             WHERE scene_slug = ?1 ORDER BY confidence DESC, entity_slug ASC",
        )?;
        let rows = stmt
            .query_map(params![scene_slug], |row| {
                let entity_type: String = row.get(1)?;
                Ok((
                    row.get::<_, String>(0)?,
                    entity_type,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to fetch memberships of {}", scene_slug))?;

        // rows with an unknown entity type are skipped
        let memberships = rows
            .into_iter()
            .filter_map(|(entity_slug, entity_type, scene_slug, confidence)| {
                EntityType::from_db_str(&entity_type).map(|entity_type| SceneMembership {
                    entity_slug,
                    entity_type,
                    scene_slug,
                    confidence,
                })
            })
            .collect();
        Ok(memberships)
    }

    fn upsert_scene(&self, scene: &Scene) -> Result<()> {
        validate_scene(scene)?;
        let microgenres = serde_json::to_string(&scene.microgenres)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scenes (slug, name, region, microgenres, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(slug) DO UPDATE SET
                name = excluded.name,
                region = excluded.region,
                microgenres = excluded.microgenres,
                updated_at = excluded.updated_at",
            params![
                scene.slug,
                scene.name,
                scene.region,
                microgenres,
                Utc::now().timestamp()
            ],
        )
        .with_context(|| format!("Failed to upsert scene {}", scene.slug))?;
        debug!("Upserted scene: {}", scene.slug);
        Ok(())
    }

    fn upsert_microgenre(&self, microgenre: &Microgenre) -> Result<()> {
        validate_microgenre(microgenre)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO microgenres (slug, name, parent_scene_slug, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(slug) DO UPDATE SET
                name = excluded.name,
                parent_scene_slug = excluded.parent_scene_slug,
                updated_at = excluded.updated_at",
            params![
                microgenre.slug,
                microgenre.name,
                microgenre.parent_scene_slug,
                Utc::now().timestamp()
            ],
        )
        .with_context(|| format!("Failed to upsert microgenre {}", microgenre.slug))?;
        debug!("Upserted microgenre: {}", microgenre.slug);
        Ok(())
    }

    fn set_scene_membership(&self, membership: &SceneMembership) -> Result<()> {
        validate_membership(membership)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scene_memberships (entity_slug, entity_type, scene_slug, confidence)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(entity_slug, entity_type, scene_slug) DO UPDATE SET
                confidence = excluded.confidence",
            params![
                membership.entity_slug,
                membership.entity_type.to_db_str(),
                membership.scene_slug,
                membership.confidence
            ],
        )
        .with_context(|| {
            format!(
                "Failed to set membership {} -> {}",
                membership.entity_slug, membership.scene_slug
            )
        })?;
        Ok(())
    }

    fn get_scene_relationships(&self, scene_slug: &str) -> Result<Vec<SceneRelationship>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT source_scene_slug, target_scene_slug, relation_type, weight, metadata, updated_at
             FROM scene_relationships
             WHERE source_scene_slug = ?1 OR target_scene_slug = ?1
             ORDER BY weight DESC, source_scene_slug ASC, target_scene_slug ASC, relation_type ASC",
        )?;
        let relationships = stmt
            .query_map(params![scene_slug], Self::row_to_relationship)?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to fetch relationships of {}", scene_slug))?;
        Ok(relationships)
    }

    fn batch_set_relationships(&self, edges: &[EdgeInput]) -> Result<Vec<SceneRelationship>> {
        if edges.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let now = Utc::now().timestamp();
        let mut stored = Vec::with_capacity(edges.len());
        {
            let mut upsert = tx.prepare(
                "INSERT INTO scene_relationships
                    (source_scene_slug, target_scene_slug, relation_type, weight, metadata, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(source_scene_slug, target_scene_slug, relation_type) DO UPDATE SET
                    weight = excluded.weight,
                    metadata = excluded.metadata,
                    updated_at = excluded.updated_at",
            )?;
            for edge in edges {
                let metadata = serde_json::to_string(edge.evidence())?;
                upsert.execute(params![
                    edge.source_scene_slug(),
                    edge.target_scene_slug(),
                    edge.relation_type().to_db_str(),
                    edge.weight(),
                    metadata,
                    now
                ])?;
                stored.push(SceneRelationship {
                    source_scene_slug: edge.source_scene_slug().to_string(),
                    target_scene_slug: edge.target_scene_slug().to_string(),
                    relation_type: edge.relation_type(),
                    weight: edge.weight(),
                    evidence: edge.evidence().clone(),
                    updated_at: now,
                });
            }
        }
        tx.commit().context("Failed to commit relationship batch")?;

        info!("Batch set {} relationships", stored.len());
        Ok(stored)
    }

    fn get_cached_recommendation(&self, subject_id: &str) -> Result<Option<CachedRecommendation>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT payload, generated_at, expires_at FROM scene_recommendations_cache
                 WHERE subject_id = ?1 AND expires_at > ?2",
                params![subject_id, Utc::now().timestamp()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()
            .with_context(|| format!("Failed to read cached recommendation for {}", subject_id))?;

        let Some((payload, generated_at, expires_at)) = row else {
            return Ok(None);
        };

        Ok(Some(CachedRecommendation {
            subject_id: subject_id.to_string(),
            payload: serde_json::from_str(&payload)
                .context("Cached recommendation payload is not valid JSON")?,
            generated_at: Self::timestamp_to_datetime(generated_at),
            expires_at: Self::timestamp_to_datetime(expires_at),
        }))
    }

    fn cache_recommendation(
        &self,
        subject_id: &str,
        payload: &JsonValue,
        ttl_hours: u64,
    ) -> Result<()> {
        let now = Utc::now();
        let expires_at = now + ChronoDuration::hours(ttl_hours as i64);
        let payload = serde_json::to_string(payload)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scene_recommendations_cache (subject_id, payload, generated_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(subject_id) DO UPDATE SET
                payload = excluded.payload,
                generated_at = excluded.generated_at,
                expires_at = excluded.expires_at",
            params![subject_id, payload, now.timestamp(), expires_at.timestamp()],
        )
        .with_context(|| format!("Failed to cache recommendation for {}", subject_id))?;

        debug!("Cached recommendations for {}", subject_id);
        Ok(())
    }

    fn purge_expired_recommendations(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute(
                "DELETE FROM scene_recommendations_cache WHERE expires_at <= ?1",
                params![Utc::now().timestamp()],
            )
            .context("Failed to purge expired recommendations")?;
        Ok(deleted)
    }
}
