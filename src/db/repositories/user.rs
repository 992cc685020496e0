//! User repository

use crate::models::{ListParams, NotificationPreferences, PagedResult, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List users, newest first
    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>>;

    /// Update profile fields and preferences
    async fn update(&self, user: &User) -> Result<User>;

    /// Change a user's role
    async fn update_role(&self, id: i64, role: UserRole) -> Result<()>;

    /// Total number of users
    async fn count(&self) -> Result<i64>;

    /// User counts grouped by role
    async fn count_by_role(&self) -> Result<Vec<(String, i64)>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const USER_COLUMNS: &str = "id, email, username, password_hash, role, avatar, \
     notify_artwork, notify_events, notify_projects, created_at, updated_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, username, password_hash, role, avatar, \
             notify_artwork, notify_events, notify_projects, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.avatar)
        .bind(user.preferences.artwork)
        .bind(user.preferences.events)
        .bind(user.preferences.projects)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        let mut created = user.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by id")?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by email")?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>> {
        let total = self.count().await?;
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?",
            USER_COLUMNS
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        let items = rows.iter().map(row_to_user).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn update(&self, user: &User) -> Result<User> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE users SET email = ?, username = ?, password_hash = ?, avatar = ?, \
             notify_artwork = ?, notify_events = ?, notify_projects = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(user.preferences.artwork)
        .bind(user.preferences.events)
        .bind(user.preferences.projects)
        .bind(now)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?;

        self.get_by_id(user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    async fn update_role(&self, id: i64, role: UserRole) -> Result<()> {
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update user role")?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(row.get("count"))
    }

    async fn count_by_role(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query("SELECT role, COUNT(*) as count FROM users GROUP BY role")
            .fetch_all(&self.pool)
            .await
            .context("Failed to count users by role")?;
        Ok(rows
            .iter()
            .map(|r| (r.get("role"), r.get("count")))
            .collect())
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role: role_str.parse().unwrap_or_default(),
        avatar: row.get("avatar"),
        preferences: NotificationPreferences {
            artwork: row.get("notify_artwork"),
            events: row.get("notify_events"),
            projects: row.get("notify_projects"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(email: &str, role: UserRole) -> User {
        User::new(email.to_string(), "tester".to_string(), "hash".to_string(), role)
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_user("a@example.com", UserRole::Member))
            .await
            .expect("Failed to create user");
        assert!(created.id > 0);

        let found = repo
            .get_by_email("a@example.com")
            .await
            .expect("Failed to get user")
            .expect("User not found");
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, UserRole::Member);
        assert!(found.preferences.events);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let repo = setup_test_repo().await;
        let found = repo.get_by_id(999).await.expect("Query failed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("dup@example.com", UserRole::Member))
            .await
            .expect("First create failed");
        let result = repo.create(&test_user("dup@example.com", UserRole::Member)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_role() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_user("b@example.com", UserRole::Visitor))
            .await
            .expect("Failed to create user");

        repo.update_role(created.id, UserRole::Admin)
            .await
            .expect("Failed to update role");

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_count_by_role() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("a@example.com", UserRole::Admin)).await.unwrap();
        repo.create(&test_user("m1@example.com", UserRole::Member)).await.unwrap();
        repo.create(&test_user("m2@example.com", UserRole::Member)).await.unwrap();

        let counts = repo.count_by_role().await.expect("Failed to count");
        let members = counts.iter().find(|(role, _)| role == "member").unwrap();
        assert_eq!(members.1, 2);
    }
}
