use super::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::Connection;

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    fn from_sql(declared: &str) -> Option<Self> {
        match declared {
            "TEXT" => Some(SqlType::Text),
            "INTEGER" => Some(SqlType::Integer),
            "REAL" => Some(SqlType::Real),
            _ => None,
        }
    }
}

/// Declared column, built with the const constructors so tables can live in
/// `const` items.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub not_null: bool,
    pub default_value: Option<&'static str>,
}

impl Column {
    const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            not_null: false,
            default_value: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, SqlType::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, SqlType::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, SqlType::Real)
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub const fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    pub const fn default_value(self, value: &'static str) -> Self {
        Self {
            default_value: Some(value),
            ..self
        }
    }

    fn definition(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type.as_sql());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default_value) = self.default_value {
            sql.push_str(" DEFAULT ");
            sql.push_str(default_value);
        }
        sql
    }
}

/// Single-column index.
#[derive(Debug, Clone, Copy)]
pub struct Index {
    pub name: &'static str,
    pub column: &'static str,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [Index],
    /// Column sets that must be unique together.
    pub unique: &'static [&'static [&'static str]],
}

/// A column as reported by `PRAGMA table_info`.
struct ColumnInfo {
    name: String,
    declared_type: String,
    not_null: bool,
    default_value: Option<String>,
    primary_key: bool,
}

impl Table {
    fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(Column::definition).collect();
        parts.extend(
            self.unique
                .iter()
                .map(|columns| format!("UNIQUE ({})", columns.join(", "))),
        );
        format!("CREATE TABLE {} ({})", self.name, parts.join(", "))
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.create_sql(), [])
            .with_context(|| format!("Failed to create table {}", self.name))?;
        for index in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({})",
                    index.name, self.name, index.column
                ),
                [],
            )
            .with_context(|| format!("Failed to create index {}", index.name))?;
        }
        Ok(())
    }

    fn read_columns(&self, conn: &Connection) -> Result<Vec<ColumnInfo>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", self.name))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    not_null: row.get::<_, i32>(3)? == 1,
                    default_value: row.get(4)?,
                    primary_key: row.get::<_, i32>(5)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        let actual = self.read_columns(conn)?;
        if actual.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}",
                self.name,
                actual.len(),
                self.columns.len()
            );
        }

        for (found, expected) in actual.iter().zip(self.columns) {
            if found.name != expected.name {
                bail!(
                    "Table {}: expected column {}, found {}",
                    self.name,
                    expected.name,
                    found.name
                );
            }
            if SqlType::from_sql(&found.declared_type) != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} is {}, expected {}",
                    self.name,
                    expected.name,
                    found.declared_type,
                    expected.sql_type.as_sql()
                );
            }
            if found.not_null != expected.not_null || found.primary_key != expected.primary_key {
                bail!(
                    "Table {} column {} has different constraints",
                    self.name,
                    expected.name
                );
            }
            // sqlite reports expression defaults with their parentheses
            let found_default = found.default_value.as_deref().map(unwrap_parentheses);
            let expected_default = expected.default_value.map(unwrap_parentheses);
            if found_default != expected_default {
                bail!(
                    "Table {} column {} defaults to {:?}, expected {:?}",
                    self.name,
                    expected.name,
                    found.default_value,
                    expected.default_value
                );
            }
        }

        for index in self.indices {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1 AND tbl_name = ?2",
                [index.name, self.name],
                |row| row.get(0),
            )?;
            if count == 0 {
                bail!("Table {} is missing index {}", self.name, index.name);
            }
        }

        Ok(())
    }
}

fn unwrap_parentheses(s: &str) -> &str {
    s.strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(s)
}

/// One version of the database layout. `migration` upgrades a database from
/// the previous version.
pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn user_version(&self) -> usize {
        BASE_DB_VERSION + self.version
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.pragma_update(None, "user_version", self.user_version() as i64)?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table
                .validate(conn)
                .with_context(|| format!("Schema version {} does not match", self.version))?;
        }
        Ok(())
    }
}
