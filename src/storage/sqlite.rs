//! SQLite storage backend using sqlx.
//!
//! Provides `SqliteRepository<T>` backed by a relational table via
//! `sqlx::SqlitePool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag (enabled by default).
//!
//! # Schema
//!
//! Every entity kind shares one `entities` table. The id, the entity type and
//! both timestamps live in dedicated columns; the full serialized entity is
//! kept in the JSON `data` column. Attribute lookups use `json_extract`.
//!
//! `update` runs its read-merge-write inside a transaction.

use crate::core::patch::{Patch, merge_fields};
use crate::core::field::is_attribute_name;
use crate::core::{Entity, FieldValue, HbnbError, Repository, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::marker::PhantomData;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required table and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS entities (
            id TEXT NOT NULL PRIMARY KEY,
            entity_type TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| HbnbError::Storage(format!("Failed to create entities table: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entity_type ON entities (entity_type)")
        .execute(pool)
        .await
        .map_err(|e| HbnbError::Storage(format!("Failed to create entity_type index: {}", e)))?;

    Ok(())
}

/// Connect to `url` and apply the schema.
///
/// In-memory databases (`sqlite::memory:`) are private to a connection, so
/// the pool is limited to a single connection for them.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&with_create_mode(url))
        .await
        .map_err(|e| HbnbError::Storage(format!("Failed to connect to {}: {}", url, e)))?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

fn with_create_mode(url: &str) -> String {
    if url.contains(":memory:") || url.contains("mode=") {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&mode=rwc", url)
    } else {
        format!("{}?mode=rwc", url)
    }
}

// ---------------------------------------------------------------------------
// SqliteRepository<T>
// ---------------------------------------------------------------------------

/// Repository backed by the shared `entities` table.
///
/// # Example
///
/// ```rust,ignore
/// use hbnb::storage::sqlite::{connect, SqliteRepository};
///
/// let pool = connect("sqlite://hbnb.db").await?;
/// let places = SqliteRepository::<Place>::new(pool);
/// let place = places.add(place).await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteRepository<T> {
    pool: SqlitePool,
    _marker: PhantomData<T>,
}

impl<T> SqliteRepository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl<T: Entity> SqliteRepository<T> {
    fn entity_type_name() -> &'static str {
        T::resource_name_singular()
    }

    fn decode_rows(rows: Vec<(String,)>) -> Result<Vec<T>> {
        rows.into_iter()
            .map(|(data,)| {
                serde_json::from_str::<T>(&data).map_err(|e| {
                    HbnbError::Storage(format!("Failed to deserialize entity from row: {}", e))
                })
            })
            .collect()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for SqliteRepository<T> {
    async fn add(&self, entity: T) -> Result<T> {
        let data = serde_json::to_string(&entity)?;

        sqlx::query(
            "INSERT INTO entities (id, entity_type, data, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entity.id().to_string())
        .bind(Self::entity_type_name())
        .bind(&data)
        .bind(entity.created_at())
        .bind(entity.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => HbnbError::DuplicateKey {
                entity_type: Self::entity_type_name(),
                id: entity.id().to_string(),
            },
            _ => HbnbError::Storage(format!("Failed to create entity: {}", e)),
        })?;

        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let row = sqlx::query_as::<_, (String,)>(
            "SELECT data FROM entities WHERE id = ? AND entity_type = ?",
        )
        .bind(id.to_string())
        .bind(Self::entity_type_name())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| HbnbError::Storage(format!("Failed to get entity: {}", e)))?;

        Ok(Self::decode_rows(row.into_iter().collect())?.pop())
    }

    async fn get_all(&self) -> Result<Vec<T>> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT data FROM entities WHERE entity_type = ? ORDER BY created_at",
        )
        .bind(Self::entity_type_name())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HbnbError::Storage(format!("Failed to list entities: {}", e)))?;

        Self::decode_rows(rows)
    }

    async fn get_by_attribute(&self, name: &str, value: &FieldValue) -> Result<Vec<T>> {
        if !is_attribute_name(name) {
            return Err(HbnbError::invalid(name, "not a valid attribute name"));
        }
        // Field name is checked above, safe to interpolate into the JSON path
        let json_path = format!("$.{}", name);

        let rows = match value {
            FieldValue::Null => {
                sqlx::query_as::<_, (String,)>(
                    "SELECT data FROM entities \
                     WHERE entity_type = ? AND json_extract(data, ?) IS NULL",
                )
                .bind(Self::entity_type_name())
                .bind(&json_path)
                .fetch_all(&self.pool)
                .await
            }
            FieldValue::DateTime(_) => {
                // Timestamps serialize with variable precision; compare decoded values
                let all = self.get_all().await?;
                return Ok(all
                    .into_iter()
                    .filter(|entity| value.matches(entity.attribute(name).as_ref()))
                    .collect());
            }
            _ => {
                let query = sqlx::query_as::<_, (String,)>(
                    "SELECT data FROM entities \
                     WHERE entity_type = ? AND json_extract(data, ?) = ?",
                )
                .bind(Self::entity_type_name())
                .bind(&json_path);

                let query = match value {
                    FieldValue::String(s) => query.bind(s.clone()),
                    FieldValue::Uuid(u) => query.bind(u.to_string()),
                    FieldValue::Integer(i) => query.bind(*i),
                    FieldValue::Float(f) => query.bind(*f),
                    // json_extract yields 1/0 for JSON booleans
                    FieldValue::Boolean(b) => query.bind(i64::from(*b)),
                    FieldValue::Null | FieldValue::DateTime(_) => query,
                };
                query.fetch_all(&self.pool).await
            }
        }
        .map_err(|e| HbnbError::Storage(format!("Failed to search entities: {}", e)))?;

        Self::decode_rows(rows)
    }

    async fn update(&self, id: &Uuid, fields: &Patch) -> Result<T> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| HbnbError::Storage(format!("Failed to begin transaction: {}", e)))?;

        let row = sqlx::query_as::<_, (String,)>(
            "SELECT data FROM entities WHERE id = ? AND entity_type = ?",
        )
        .bind(id.to_string())
        .bind(Self::entity_type_name())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| HbnbError::Storage(format!("Failed to get entity: {}", e)))?;

        let current = Self::decode_rows(row.into_iter().collect())?
            .pop()
            .ok_or_else(|| HbnbError::not_found(Self::entity_type_name(), id))?;
        let merged = merge_fields(&current, fields)?;
        let data = serde_json::to_string(&merged)?;

        sqlx::query("UPDATE entities SET data = ?, updated_at = ? WHERE id = ? AND entity_type = ?")
            .bind(&data)
            .bind(merged.updated_at())
            .bind(id.to_string())
            .bind(Self::entity_type_name())
            .execute(&mut *tx)
            .await
            .map_err(|e| HbnbError::Storage(format!("Failed to update entity: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| HbnbError::Storage(format!("Failed to commit update: {}", e)))?;

        Ok(merged)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM entities WHERE id = ? AND entity_type = ?")
            .bind(id.to_string())
            .bind(Self::entity_type_name())
            .execute(&self.pool)
            .await
            .map_err(|e| HbnbError::Storage(format!("Failed to delete entity: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(HbnbError::not_found(Self::entity_type_name(), id));
        }

        Ok(())
    }
}
