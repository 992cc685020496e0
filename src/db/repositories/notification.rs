//! Notification repository

use crate::models::{ListParams, Notification, NotificationKind, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Notification repository trait
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Create a notification
    async fn create(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification>;

    /// Get notification by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Notification>>;

    /// List a user's notifications, newest first
    async fn list_for_recipient(
        &self,
        recipient_id: i64,
        unread_only: bool,
        params: &ListParams,
    ) -> Result<PagedResult<Notification>>;

    /// Flip the read flag on a single notification
    async fn mark_read(&self, id: i64) -> Result<()>;

    /// Mark all of a user's notifications read, returning how many changed
    async fn mark_all_read(&self, recipient_id: i64) -> Result<i64>;

    /// Number of unread notifications for a user
    async fn unread_count(&self, recipient_id: i64) -> Result<i64>;
}

/// SQLx-based notification repository implementation
pub struct SqlxNotificationRepository {
    pool: SqlitePool,
}

impl SqlxNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn NotificationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn create(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO notifications (recipient_id, message, kind, read, created_at) \
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(recipient_id)
        .bind(message)
        .bind(kind.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create notification")?;

        Ok(Notification {
            id: result.last_insert_rowid(),
            recipient_id,
            message: message.to_string(),
            kind,
            read: false,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Notification>> {
        let row = sqlx::query(
            "SELECT id, recipient_id, message, kind, read, created_at \
             FROM notifications WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get notification")?;
        row.map(|r| row_to_notification(&r)).transpose()
    }

    async fn list_for_recipient(
        &self,
        recipient_id: i64,
        unread_only: bool,
        params: &ListParams,
    ) -> Result<PagedResult<Notification>> {
        let clause = if unread_only {
            " AND read = 0"
        } else {
            ""
        };

        let total: i64 = sqlx::query(&format!(
            "SELECT COUNT(*) as count FROM notifications WHERE recipient_id = ?{}",
            clause
        ))
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count notifications")?
        .get("count");

        let rows = sqlx::query(&format!(
            "SELECT id, recipient_id, message, kind, read, created_at FROM notifications \
             WHERE recipient_id = ?{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            clause
        ))
        .bind(recipient_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list notifications")?;

        let items = rows
            .iter()
            .map(row_to_notification)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn mark_read(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to mark notification read")?;
        Ok(())
    }

    async fn mark_all_read(&self, recipient_id: i64) -> Result<i64> {
        let result =
            sqlx::query("UPDATE notifications SET read = 1 WHERE recipient_id = ? AND read = 0")
                .bind(recipient_id)
                .execute(&self.pool)
                .await
                .context("Failed to mark notifications read")?;
        Ok(result.rows_affected() as i64)
    }

    async fn unread_count(&self, recipient_id: i64) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM notifications WHERE recipient_id = ? AND read = 0",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count unread notifications")?;
        Ok(row.get("count"))
    }
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Result<Notification> {
    let kind: String = row.get("kind");
    Ok(Notification {
        id: row.get("id"),
        recipient_id: row.get("recipient_id"),
        message: row.get("message"),
        kind: kind.parse()?,
        read: row.get("read"),
        created_at: row.get("created_at"),
    })
}
