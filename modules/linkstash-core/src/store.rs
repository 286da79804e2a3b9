//! Saved-item record store.
//!
//! The store's unique-URL constraint is the sole concurrency guard for the
//! pipeline: duplicate-URL races are resolved here, not by application-level
//! locking.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use linkstash_common::{LinkStashError, NewItem, Platform, SavedItem};

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Exact-match URL presence check.
    async fn exists(&self, url: &str) -> Result<bool, LinkStashError>;

    /// Insert a new item. Returns [`LinkStashError::Duplicate`] when the URL
    /// is already present (including when another task won the race).
    async fn create(&self, item: NewItem) -> Result<SavedItem, LinkStashError>;

    /// All saved items, newest first.
    async fn list(&self) -> Result<Vec<SavedItem>, LinkStashError>;

    /// Delete by id. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, LinkStashError>;
}

// ---------------------------------------------------------------------------
// Postgres implementation
// ---------------------------------------------------------------------------

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Create the schema if it does not exist. Idempotent.
pub async fn migrate(pool: &PgPool) -> Result<(), LinkStashError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_items (
            id UUID PRIMARY KEY,
            url TEXT NOT NULL UNIQUE,
            platform TEXT NOT NULL,
            title TEXT NOT NULL,
            caption TEXT NOT NULL DEFAULT '',
            summary TEXT NOT NULL,
            category TEXT NOT NULL,
            hashtags JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| LinkStashError::Store(e.to_string()))?;

    info!("Store migration complete");
    Ok(())
}

fn row_to_item(row: &PgRow) -> Result<SavedItem, LinkStashError> {
    let platform: String = row
        .try_get("platform")
        .map_err(|e| LinkStashError::Store(e.to_string()))?;
    let hashtags: serde_json::Value = row
        .try_get("hashtags")
        .map_err(|e| LinkStashError::Store(e.to_string()))?;
    let hashtags: Vec<String> = serde_json::from_value(hashtags)
        .map_err(|e| LinkStashError::Store(format!("Invalid hashtags column: {e}")))?;

    Ok(SavedItem {
        id: row
            .try_get("id")
            .map_err(|e| LinkStashError::Store(e.to_string()))?,
        url: row
            .try_get("url")
            .map_err(|e| LinkStashError::Store(e.to_string()))?,
        platform: Platform::from_tag(&platform),
        title: row
            .try_get("title")
            .map_err(|e| LinkStashError::Store(e.to_string()))?,
        caption: row
            .try_get("caption")
            .map_err(|e| LinkStashError::Store(e.to_string()))?,
        summary: row
            .try_get("summary")
            .map_err(|e| LinkStashError::Store(e.to_string()))?,
        category: row
            .try_get("category")
            .map_err(|e| LinkStashError::Store(e.to_string()))?,
        hashtags,
        created_at: row
            .try_get("created_at")
            .map_err(|e| LinkStashError::Store(e.to_string()))?,
    })
}

#[async_trait]
impl ItemStore for PgStore {
    async fn exists(&self, url: &str) -> Result<bool, LinkStashError> {
        let row = sqlx::query("SELECT 1 FROM saved_items WHERE url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LinkStashError::Store(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn create(&self, item: NewItem) -> Result<SavedItem, LinkStashError> {
        let id = Uuid::new_v4();
        let hashtags = serde_json::to_value(&item.hashtags)
            .map_err(|e| LinkStashError::Store(e.to_string()))?;

        // ON CONFLICT DO NOTHING + RETURNING: no returned row means another
        // task (or an earlier message) already owns this URL.
        let row = sqlx::query(
            r#"
            INSERT INTO saved_items (id, url, platform, title, caption, summary, category, hashtags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (url) DO NOTHING
            RETURNING id, url, platform, title, caption, summary, category, hashtags, created_at
            "#,
        )
        .bind(id)
        .bind(&item.url)
        .bind(item.platform.as_str())
        .bind(&item.title)
        .bind(&item.caption)
        .bind(&item.summary)
        .bind(&item.category)
        .bind(hashtags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LinkStashError::Store(e.to_string()))?;

        match row {
            Some(row) => row_to_item(&row),
            None => Err(LinkStashError::Duplicate(item.url)),
        }
    }

    async fn list(&self) -> Result<Vec<SavedItem>, LinkStashError> {
        let rows = sqlx::query(
            r#"
            SELECT id, url, platform, title, caption, summary, category, hashtags, created_at
            FROM saved_items
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LinkStashError::Store(e.to_string()))?;

        rows.iter().map(row_to_item).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, LinkStashError> {
        let result = sqlx::query("DELETE FROM saved_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| LinkStashError::Store(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
