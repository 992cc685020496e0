//! Activity log repository (append-only)

use crate::models::{ActivityAction, ActivityLog, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Activity log repository trait. Records are never updated or deleted.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Append an activity record
    async fn append(
        &self,
        user_id: i64,
        action: ActivityAction,
        resource: Option<&str>,
    ) -> Result<ActivityLog>;

    /// List records, newest first, optionally for one user
    async fn list(
        &self,
        user_id: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<ActivityLog>>;
}

/// SQLx-based activity log repository implementation
pub struct SqlxActivityLogRepository {
    pool: SqlitePool,
}

impl SqlxActivityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn ActivityLogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ActivityLogRepository for SqlxActivityLogRepository {
    async fn append(
        &self,
        user_id: i64,
        action: ActivityAction,
        resource: Option<&str>,
    ) -> Result<ActivityLog> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO activity_logs (user_id, action, resource, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(action.to_string())
        .bind(resource)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to append activity log")?;

        Ok(ActivityLog {
            id: result.last_insert_rowid(),
            user_id,
            action,
            resource: resource.map(String::from),
            created_at: now,
        })
    }

    async fn list(
        &self,
        user_id: Option<i64>,
        params: &ListParams,
    ) -> Result<PagedResult<ActivityLog>> {
        let clause = if user_id.is_some() {
            " WHERE user_id = ?"
        } else {
            ""
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM activity_logs{}", clause);
        let mut count_query = sqlx::query(&count_sql);
        if let Some(id) = user_id {
            count_query = count_query.bind(id);
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count activity logs")?
            .get("count");

        let sql = format!(
            "SELECT id, user_id, action, resource, created_at FROM activity_logs{} \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            clause
        );
        let mut query = sqlx::query(&sql);
        if let Some(id) = user_id {
            query = query.bind(id);
        }
        let rows = query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list activity logs")?;

        let items = rows
            .iter()
            .map(|r| {
                let action: String = r.get("action");
                Ok(ActivityLog {
                    id: r.get("id"),
                    user_id: r.get("user_id"),
                    action: action.parse()?,
                    resource: r.get("resource"),
                    created_at: r.get("created_at"),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};

    async fn setup() -> (SqlxActivityLogRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = super::super::SqlxUserRepository::new(pool.clone());
        let user = user_repo
            .create(&User::new(
                "someone@example.com".to_string(),
                "someone".to_string(),
                "hash".to_string(),
                UserRole::Member,
            ))
            .await
            .expect("Failed to create user");

        (SqlxActivityLogRepository::new(pool), user.id)
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let (repo, user_id) = setup().await;
        repo.append(user_id, ActivityAction::Login, None).await.unwrap();
        repo.append(user_id, ActivityAction::Create, Some("artwork 'Dusk'"))
            .await
            .unwrap();

        let page = repo.list(None, &ListParams::default()).await.unwrap();
        assert_eq!(page.total, 2);
        // Newest first
        assert_eq!(page.items[0].action, ActivityAction::Create);
        assert_eq!(page.items[0].resource.as_deref(), Some("artwork 'Dusk'"));
    }

    #[tokio::test]
    async fn test_list_filtered_by_user() {
        let (repo, user_id) = setup().await;
        repo.append(user_id, ActivityAction::Logout, None).await.unwrap();

        let page = repo.list(Some(user_id), &ListParams::default()).await.unwrap();
        assert_eq!(page.total, 1);
        let empty = repo.list(Some(user_id + 1), &ListParams::default()).await.unwrap();
        assert_eq!(empty.total, 0);
    }
}
