//! SQLite schema definitions for the scenes database.

use crate::sqlite_persistence::{Column, Index, Table, VersionedSchema, DEFAULT_TIMESTAMP};

// =============================================================================
// Version 1 - Scenes, memberships, relationships
// =============================================================================

const SCENES_TABLE_V1: Table = Table {
    name: "scenes",
    columns: &[
        Column::text("slug").primary_key(),
        Column::text("name").not_null(),
        Column::text("region"),
        // JSON array of microgenre slugs
        Column::text("microgenres").not_null(),
        Column::integer("updated_at")
            .not_null()
            .default_value(DEFAULT_TIMESTAMP),
    ],
    indices: &[Index {
        name: "idx_scenes_region",
        column: "region",
    }],
    unique: &[],
};

const MICROGENRES_TABLE_V1: Table = Table {
    name: "microgenres",
    columns: &[
        Column::text("slug").primary_key(),
        Column::text("name").not_null(),
        Column::text("parent_scene_slug"),
        Column::integer("updated_at")
            .not_null()
            .default_value(DEFAULT_TIMESTAMP),
    ],
    indices: &[Index {
        name: "idx_microgenres_parent",
        column: "parent_scene_slug",
    }],
    unique: &[],
};

const SCENE_MEMBERSHIPS_TABLE_V1: Table = Table {
    name: "scene_memberships",
    columns: &[
        Column::integer("id").primary_key(),
        Column::text("entity_slug").not_null(),
        Column::text("entity_type").not_null(),
        Column::text("scene_slug").not_null(),
        Column::real("confidence").not_null(),
    ],
    indices: &[Index {
        name: "idx_scene_memberships_scene",
        column: "scene_slug",
    }],
    unique: &[&["entity_slug", "entity_type", "scene_slug"]],
};

const SCENE_RELATIONSHIPS_TABLE_V1: Table = Table {
    name: "scene_relationships",
    columns: &[
        Column::integer("id").primary_key(),
        Column::text("source_scene_slug").not_null(),
        Column::text("target_scene_slug").not_null(),
        Column::text("relation_type").not_null(),
        Column::real("weight").not_null(),
        // JSON-serialized RelationshipEvidence
        Column::text("metadata").not_null(),
        Column::integer("updated_at")
            .not_null()
            .default_value(DEFAULT_TIMESTAMP),
    ],
    indices: &[
        Index {
            name: "idx_scene_relationships_source",
            column: "source_scene_slug",
        },
        Index {
            name: "idx_scene_relationships_target",
            column: "target_scene_slug",
        },
    ],
    unique: &[&["source_scene_slug", "target_scene_slug", "relation_type"]],
};

const SCENE_RECOMMENDATIONS_CACHE_TABLE_V1: Table = Table {
    name: "scene_recommendations_cache",
    columns: &[
        Column::text("subject_id").primary_key(),
        Column::text("payload").not_null(),
        Column::integer("generated_at").not_null(),
        Column::integer("expires_at").not_null(),
    ],
    indices: &[Index {
        name: "idx_scene_recommendations_cache_expires",
        column: "expires_at",
    }],
    unique: &[],
};

pub const SCENES_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        SCENES_TABLE_V1,
        MICROGENRES_TABLE_V1,
        SCENE_MEMBERSHIPS_TABLE_V1,
        SCENE_RELATIONSHIPS_TABLE_V1,
        SCENE_RECOMMENDATIONS_CACHE_TABLE_V1,
    ],
    migration: None,
}];
