mod versioned_schema;

pub use versioned_schema::{
    Column, Index, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

/// Offset added to schema versions before writing `PRAGMA user_version`, so a
/// scenes database is never mistaken for an unrelated SQLite file.
pub const BASE_DB_VERSION: usize = 700;
