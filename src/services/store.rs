//! Document store collaborators
//!
//! The API persists opaque JSON documents grouped into named collections,
//! plus a keyed counter table for the visit count. `PgStore` is the
//! production Postgres implementation; `MemStore` backs the tests and
//! database-less development.
//!
//! Inserted documents are stamped with `id` and `createdAt` fields so
//! listings carry them without a separate projection step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Collection holding portfolio projects.
pub const PROJECTS: &str = "projects";
/// Collection holding journal posts.
pub const POSTS: &str = "blogs";
/// Collection holding contact messages.
pub const MESSAGES: &str = "messages";
/// Collection holding click-analytics events.
pub const EVENTS: &str = "events";

/// Counter key for the visit endpoint.
pub const VISITS_KEY: &str = "visits";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence boundary consumed by the handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, stamping `id` and `createdAt`; returns the new id.
    async fn insert(&self, collection: &str, doc: Value) -> Result<Uuid, StoreError>;

    /// All documents in a collection, newest first.
    async fn list_desc(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Atomically add one to a named counter, creating it on first use;
    /// returns the new value.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Delete every document in a collection; returns how many went away.
    async fn clear(&self, collection: &str) -> Result<u64, StoreError>;

    /// Release held resources; called once at shutdown.
    async fn close(&self) {}
}

fn stamp(mut doc: Value, id: Uuid, created_at: DateTime<Utc>) -> Value {
    if let Value::Object(map) = &mut doc {
        map.insert("id".to_string(), Value::String(id.to_string()));
        map.insert(
            "createdAt".to_string(),
            Value::String(created_at.to_rfc3339()),
        );
    }
    doc
}

/// Postgres-backed document store.
pub struct PgStore {
    pool: PgPool,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id UUID PRIMARY KEY,
    collection TEXT NOT NULL,
    doc JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS documents_collection_created_idx
    ON documents (collection, created_at DESC);
CREATE TABLE IF NOT EXISTS counters (
    key TEXT PRIMARY KEY,
    value BIGINT NOT NULL DEFAULT 0
);
"#;

impl PgStore {
    /// Connect and make sure the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(&self, collection: &str, doc: Value) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let doc = stamp(doc, id, created_at);

        sqlx::query(
            "INSERT INTO documents (id, collection, doc, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(collection)
        .bind(doc)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_desc(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query(
            "SELECT doc FROM documents WHERE collection = $1 ORDER BY created_at DESC",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<Value, _>("doc"))
            .collect())
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let value = sqlx::query_scalar(
            "INSERT INTO counters (key, value) VALUES ($1, 1)
             ON CONFLICT (key) DO UPDATE SET value = counters.value + 1
             RETURNING value",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }

    async fn clear(&self, collection: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// In-memory document store for tests and database-less development.
#[derive(Debug, Default)]
pub struct MemStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    counters: RwLock<HashMap<String, i64>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemStore {
    async fn insert(&self, collection: &str, doc: Value) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let doc = stamp(doc, id, Utc::now());

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc);

        Ok(id)
    }

    async fn list_desc(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        // Inserts are appended in order, so newest-first is a reversal.
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut counters = self.counters.write().await;
        let value = counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn clear(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(self
            .collections
            .write()
            .await
            .remove(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }
}
