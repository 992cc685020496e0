//! Project repository
//!
//! Projects own a member relation and an append-only sequence of progress
//! updates.

use crate::models::{ListParams, PagedResult, Project, ProjectUpdate};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Aggregated project statistics
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    pub total_projects: i64,
    pub ongoing_projects: i64,
    pub completed_projects: i64,
    /// Projects the requesting user is a member of
    pub user_contributions: i64,
}

/// Project repository trait
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Create a new project with its initial member set
    async fn create(&self, project: &Project, members: &[i64]) -> Result<Project>;

    /// Get project by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Project>>;

    /// List projects, optionally text-searched, newest first
    async fn list(&self, search: Option<&str>, params: &ListParams)
        -> Result<PagedResult<Project>>;

    /// Update project fields
    async fn update(&self, project: &Project) -> Result<Project>;

    /// Replace the member set
    async fn set_members(&self, project_id: i64, members: &[i64]) -> Result<()>;

    /// Current member user IDs
    async fn members(&self, project_id: i64) -> Result<Vec<i64>>;

    /// Append a progress update
    async fn add_update(&self, update: &ProjectUpdate) -> Result<ProjectUpdate>;

    /// Progress updates for a project, oldest first
    async fn list_updates(&self, project_id: i64) -> Result<Vec<ProjectUpdate>>;

    /// Delete a project
    async fn delete(&self, id: i64) -> Result<()>;

    /// Aggregate statistics, computed at request time
    async fn stats(&self, user_id: i64) -> Result<ProjectStats>;
}

/// SQLx-based project repository implementation
pub struct SqlxProjectRepository {
    pool: SqlitePool,
}

impl SqlxProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn ProjectRepository> {
        Arc::new(Self::new(pool))
    }
}

const PROJECT_COLUMNS: &str = "id, title, description, creator_id, start_date, end_date, \
     is_completed, created_at, updated_at";

#[async_trait]
impl ProjectRepository for SqlxProjectRepository {
    async fn create(&self, project: &Project, members: &[i64]) -> Result<Project> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO projects (title, description, creator_id, start_date, end_date, \
             is_completed, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.creator_id)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.is_completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create project")?;

        let id = result.last_insert_rowid();
        self.set_members(id, members).await?;

        let mut created = project.clone();
        created.id = id;
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get project")?;
        row.map(|r| row_to_project(&r)).transpose()
    }

    async fn list(
        &self,
        search: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<Project>> {
        let (clause, pattern) = match search {
            Some(s) => (
                " WHERE (title LIKE ? OR description LIKE ?)",
                Some(format!("%{}%", s)),
            ),
            None => ("", None),
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM projects{}", clause);
        let mut count_query = sqlx::query(&count_sql);
        if let Some(ref p) = pattern {
            count_query = count_query.bind(p).bind(p);
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count projects")?
            .get("count");

        let sql = format!(
            "SELECT {} FROM projects{} ORDER BY start_date DESC LIMIT ? OFFSET ?",
            PROJECT_COLUMNS, clause
        );
        let mut query = sqlx::query(&sql);
        if let Some(ref p) = pattern {
            query = query.bind(p).bind(p);
        }
        let rows = query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list projects")?;

        let items = rows.iter().map(row_to_project).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn update(&self, project: &Project) -> Result<Project> {
        sqlx::query(
            "UPDATE projects SET title = ?, description = ?, end_date = ?, is_completed = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.end_date)
        .bind(project.is_completed)
        .bind(Utc::now())
        .bind(project.id)
        .execute(&self.pool)
        .await
        .context("Failed to update project")?;

        self.get_by_id(project.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project not found after update"))
    }

    async fn set_members(&self, project_id: i64, members: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM project_members WHERE project_id = ?")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .context("Failed to clear members")?;

        for user_id in members {
            sqlx::query(
                "INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?, ?)",
            )
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to add member")?;
        }
        Ok(())
    }

    async fn members(&self, project_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query(
            "SELECT user_id FROM project_members WHERE project_id = ? ORDER BY user_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load members")?;
        Ok(rows.iter().map(|r| r.get("user_id")).collect())
    }

    async fn add_update(&self, update: &ProjectUpdate) -> Result<ProjectUpdate> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO project_updates (project_id, author_id, text, attachment, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(update.project_id)
        .bind(update.author_id)
        .bind(&update.text)
        .bind(&update.attachment)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to add project update")?;

        let mut created = update.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn list_updates(&self, project_id: i64) -> Result<Vec<ProjectUpdate>> {
        let rows = sqlx::query(
            "SELECT id, project_id, author_id, text, attachment, created_at \
             FROM project_updates WHERE project_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list project updates")?;

        Ok(rows
            .iter()
            .map(|r| ProjectUpdate {
                id: r.get("id"),
                project_id: r.get("project_id"),
                author_id: r.get("author_id"),
                text: r.get("text"),
                attachment: r.get("attachment"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete project")?;
        Ok(())
    }

    async fn stats(&self, user_id: i64) -> Result<ProjectStats> {
        let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM projects")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count projects")?
            .get("count");

        let completed: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM projects WHERE is_completed = 1")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count completed projects")?
                .get("count");

        let contributions: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM project_members WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count contributions")?
                .get("count");

        Ok(ProjectStats {
            total_projects: total,
            ongoing_projects: total - completed,
            completed_projects: completed,
            user_contributions: contributions,
        })
    }
}

fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project> {
    Ok(Project {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        creator_id: row.get("creator_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        is_completed: row.get("is_completed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};

    async fn setup() -> (SqlxProjectRepository, Vec<i64>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = super::super::SqlxUserRepository::new(pool.clone());
        let mut user_ids = Vec::new();
        for i in 0..3 {
            let user = user_repo
                .create(&User::new(
                    format!("user{}@example.com", i),
                    format!("user{}", i),
                    "hash".to_string(),
                    UserRole::Member,
                ))
                .await
                .expect("Failed to create user");
            user_ids.push(user.id);
        }

        (SqlxProjectRepository::new(pool), user_ids)
    }

    #[tokio::test]
    async fn test_create_with_members() {
        let (repo, users) = setup().await;
        let project = Project::new("Mural".to_string(), "Wall mural".to_string(), users[0]);
        let created = repo.create(&project, &users[1..]).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(repo.members(created.id).await.unwrap(), vec![users[1], users[2]]);
    }

    #[tokio::test]
    async fn test_progress_updates_are_ordered() {
        let (repo, users) = setup().await;
        let project = repo
            .create(
                &Project::new("Mural".to_string(), "Wall mural".to_string(), users[0]),
                &[],
            )
            .await
            .unwrap();

        for text in ["sketched", "painted", "varnished"] {
            repo.add_update(&ProjectUpdate {
                id: 0,
                project_id: project.id,
                author_id: users[0],
                text: text.to_string(),
                attachment: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        let updates = repo.list_updates(project.id).await.unwrap();
        let texts: Vec<_> = updates.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["sketched", "painted", "varnished"]);
    }

    #[tokio::test]
    async fn test_stats_counts_contributions() {
        let (repo, users) = setup().await;
        let a = repo
            .create(
                &Project::new("A".to_string(), "d".to_string(), users[0]),
                &[users[1]],
            )
            .await
            .unwrap();
        repo.create(
            &Project::new("B".to_string(), "d".to_string(), users[0]),
            &[users[1], users[2]],
        )
        .await
        .unwrap();

        let mut done = repo.get_by_id(a.id).await.unwrap().unwrap();
        done.is_completed = true;
        repo.update(&done).await.unwrap();

        let stats = repo.stats(users[1]).await.unwrap();
        assert_eq!(stats.total_projects, 2);
        assert_eq!(stats.completed_projects, 1);
        assert_eq!(stats.ongoing_projects, 1);
        assert_eq!(stats.user_contributions, 2);
    }

    #[tokio::test]
    async fn test_delete_cascades_members() {
        let (repo, users) = setup().await;
        let project = repo
            .create(
                &Project::new("Gone".to_string(), "d".to_string(), users[0]),
                &[users[1]],
            )
            .await
            .unwrap();

        repo.delete(project.id).await.unwrap();
        assert!(repo.get_by_id(project.id).await.unwrap().is_none());
        assert!(repo.members(project.id).await.unwrap().is_empty());
    }
}
