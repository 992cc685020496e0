//! Artwork repository
//!
//! List queries support filtering by moderation state and artist, text
//! search over title/description, and ordering by submission date.

use crate::models::{ApprovalStatus, Artwork, ArtworkFilter, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Artwork repository trait
#[async_trait]
pub trait ArtworkRepository: Send + Sync {
    /// Create a new artwork
    async fn create(&self, artwork: &Artwork) -> Result<Artwork>;

    /// Get artwork by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Artwork>>;

    /// List artworks matching the filter
    async fn list(&self, filter: &ArtworkFilter, params: &ListParams)
        -> Result<PagedResult<Artwork>>;

    /// Update title/description/image/category
    async fn update(&self, artwork: &Artwork) -> Result<Artwork>;

    /// Set the moderation state and feedback
    async fn set_status(
        &self,
        id: i64,
        status: ApprovalStatus,
        feedback: Option<&str>,
    ) -> Result<()>;

    /// Delete an artwork
    async fn delete(&self, id: i64) -> Result<()>;

    /// (category, approval_status, count) rows for analytics
    async fn count_by_category_and_status(&self) -> Result<Vec<(String, String, i64)>>;
}

/// SQLx-based artwork repository implementation
pub struct SqlxArtworkRepository {
    pool: SqlitePool,
}

impl SqlxArtworkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn ArtworkRepository> {
        Arc::new(Self::new(pool))
    }
}

const ARTWORK_COLUMNS: &str = "id, title, description, image, category, artist_id, \
     approval_status, feedback, submitted_at, updated_at";

/// Build WHERE clause and collect bind values for a filter
fn filter_clause(filter: &ArtworkFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(status) = filter.approval_status {
        conditions.push("approval_status = ?".to_string());
        binds.push(status.to_string());
    }
    if let Some(artist_id) = filter.artist_id {
        conditions.push("artist_id = ?".to_string());
        binds.push(artist_id.to_string());
    }
    if let Some(ref search) = filter.search {
        conditions.push("(title LIKE ? OR description LIKE ?)".to_string());
        let pattern = format!("%{}%", search);
        binds.push(pattern.clone());
        binds.push(pattern);
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (clause, binds)
}

#[async_trait]
impl ArtworkRepository for SqlxArtworkRepository {
    async fn create(&self, artwork: &Artwork) -> Result<Artwork> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO artworks (title, description, image, category, artist_id, \
             approval_status, feedback, submitted_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&artwork.title)
        .bind(&artwork.description)
        .bind(&artwork.image)
        .bind(artwork.category.to_string())
        .bind(artwork.artist_id)
        .bind(artwork.approval_status.to_string())
        .bind(&artwork.feedback)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create artwork")?;

        let mut created = artwork.clone();
        created.id = result.last_insert_rowid();
        created.submitted_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Artwork>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM artworks WHERE id = ?",
            ARTWORK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get artwork")?;
        row.map(|r| row_to_artwork(&r)).transpose()
    }

    async fn list(
        &self,
        filter: &ArtworkFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Artwork>> {
        let (clause, binds) = filter_clause(filter);

        let count_sql = format!("SELECT COUNT(*) as count FROM artworks{}", clause);
        let mut count_query = sqlx::query(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count artworks")?
            .get("count");

        let order = if filter.newest_first { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {} FROM artworks{} ORDER BY submitted_at {} LIMIT ? OFFSET ?",
            ARTWORK_COLUMNS, clause, order
        );
        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list artworks")?;

        let items = rows.iter().map(row_to_artwork).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn update(&self, artwork: &Artwork) -> Result<Artwork> {
        sqlx::query(
            "UPDATE artworks SET title = ?, description = ?, image = ?, category = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&artwork.title)
        .bind(&artwork.description)
        .bind(&artwork.image)
        .bind(artwork.category.to_string())
        .bind(Utc::now())
        .bind(artwork.id)
        .execute(&self.pool)
        .await
        .context("Failed to update artwork")?;

        self.get_by_id(artwork.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Artwork not found after update"))
    }

    async fn set_status(
        &self,
        id: i64,
        status: ApprovalStatus,
        feedback: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE artworks SET approval_status = ?, feedback = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(feedback)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to set artwork status")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM artworks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete artwork")?;
        Ok(())
    }

    async fn count_by_category_and_status(&self) -> Result<Vec<(String, String, i64)>> {
        let rows = sqlx::query(
            "SELECT category, approval_status, COUNT(*) as count FROM artworks \
             GROUP BY category, approval_status",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate artworks")?;
        Ok(rows
            .iter()
            .map(|r| (r.get("category"), r.get("approval_status"), r.get("count")))
            .collect())
    }
}

fn row_to_artwork(row: &sqlx::sqlite::SqliteRow) -> Result<Artwork> {
    let category: String = row.get("category");
    let status: String = row.get("approval_status");
    Ok(Artwork {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        image: row.get("image"),
        category: category.parse().unwrap_or_default(),
        artist_id: row.get("artist_id"),
        approval_status: status.parse().unwrap_or_default(),
        feedback: row.get("feedback"),
        submitted_at: row.get("submitted_at"),
        updated_at: row.get("updated_at"),
    })
}
