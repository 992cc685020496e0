//! Event repository
//!
//! Events carry an attendee membership relation which is loaded and
//! replaced explicitly rather than traversed implicitly.

use crate::models::{Event, EventFilter, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Aggregated event statistics
#[derive(Debug, Clone, Serialize)]
pub struct EventStats {
    pub total_events: i64,
    pub completed_events: i64,
    pub upcoming_events: i64,
    /// (YYYY-MM, count) pairs, ascending
    pub events_by_month: Vec<(String, i64)>,
}

/// Event repository trait
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Create a new event with its initial attendee set
    async fn create(&self, event: &Event, attendees: &[i64]) -> Result<Event>;

    /// Get event by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// List events matching the filter, ordered by date
    async fn list(&self, filter: &EventFilter, params: &ListParams) -> Result<PagedResult<Event>>;

    /// List events a user attends
    async fn list_for_attendee(&self, user_id: i64) -> Result<Vec<Event>>;

    /// Update event fields
    async fn update(&self, event: &Event) -> Result<Event>;

    /// Replace the attendee set
    async fn set_attendees(&self, event_id: i64, attendees: &[i64]) -> Result<()>;

    /// Current attendee user IDs
    async fn attendees(&self, event_id: i64) -> Result<Vec<i64>>;

    /// Delete an event
    async fn delete(&self, id: i64) -> Result<()>;

    /// Aggregate statistics, computed at request time
    async fn stats(&self, today: NaiveDate) -> Result<EventStats>;
}

/// SQLx-based event repository implementation
pub struct SqlxEventRepository {
    pool: SqlitePool,
}

impl SqlxEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn EventRepository> {
        Arc::new(Self::new(pool))
    }
}

const EVENT_COLUMNS: &str =
    "id, title, description, date, location, creator_id, is_completed, created_at, updated_at";

#[async_trait]
impl EventRepository for SqlxEventRepository {
    async fn create(&self, event: &Event, attendees: &[i64]) -> Result<Event> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO events (title, description, date, location, creator_id, \
             is_completed, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(event.creator_id)
        .bind(event.is_completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create event")?;

        let id = result.last_insert_rowid();
        self.set_attendees(id, attendees).await?;

        let mut created = event.clone();
        created.id = id;
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get event")?;
        row.map(|r| row_to_event(&r)).transpose()
    }

    async fn list(&self, filter: &EventFilter, params: &ListParams) -> Result<PagedResult<Event>> {
        let mut conditions = Vec::new();
        let mut binds = Vec::new();

        if let Some(date) = filter.date {
            conditions.push("date = ?");
            binds.push(date.to_string());
        }
        if let Some(ref location) = filter.location {
            conditions.push("location = ?");
            binds.push(location.clone());
        }
        if let Some(ref search) = filter.search {
            conditions.push("(title LIKE ? OR description LIKE ?)");
            let pattern = format!("%{}%", search);
            binds.push(pattern.clone());
            binds.push(pattern);
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM events{}", clause);
        let mut count_query = sqlx::query(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count events")?
            .get("count");

        let sql = format!(
            "SELECT {} FROM events{} ORDER BY date ASC LIMIT ? OFFSET ?",
            EVENT_COLUMNS, clause
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
            .context("Failed to list events")?;

        let items = rows.iter().map(row_to_event).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn list_for_attendee(&self, user_id: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            "SELECT e.id, e.title, e.description, e.date, e.location, e.creator_id, \
             e.is_completed, e.created_at, e.updated_at FROM events e \
             JOIN event_attendees ea ON ea.event_id = e.id \
             WHERE ea.user_id = ? ORDER BY e.date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list events for attendee")?;
        rows.iter().map(row_to_event).collect()
    }

    async fn update(&self, event: &Event) -> Result<Event> {
        sqlx::query(
            "UPDATE events SET title = ?, description = ?, date = ?, location = ?, \
             is_completed = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.location)
        .bind(event.is_completed)
        .bind(Utc::now())
        .bind(event.id)
        .execute(&self.pool)
        .await
        .context("Failed to update event")?;

        self.get_by_id(event.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Event not found after update"))
    }

    async fn set_attendees(&self, event_id: i64, attendees: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM event_attendees WHERE event_id = ?")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .context("Failed to clear attendees")?;

        for user_id in attendees {
            sqlx::query(
                "INSERT OR IGNORE INTO event_attendees (event_id, user_id) VALUES (?, ?)",
            )
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to add attendee")?;
        }
        Ok(())
    }

    async fn attendees(&self, event_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query(
            "SELECT user_id FROM event_attendees WHERE event_id = ? ORDER BY user_id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load attendees")?;
        Ok(rows.iter().map(|r| r.get("user_id")).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete event")?;
        Ok(())
    }

    async fn stats(&self, today: NaiveDate) -> Result<EventStats> {
        let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM events")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count events")?
            .get("count");

        let completed: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM events WHERE is_completed = 1")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count completed events")?
                .get("count");

        let upcoming: i64 = sqlx::query(
            "SELECT COUNT(*) as count FROM events WHERE date >= ? AND is_completed = 0",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count upcoming events")?
        .get("count");

        let rows = sqlx::query(
            "SELECT strftime('%Y-%m', date) as month, COUNT(*) as count FROM events \
             GROUP BY month ORDER BY month",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to group events by month")?;
        let events_by_month = rows
            .iter()
            .map(|r| (r.get("month"), r.get("count")))
            .collect();

        Ok(EventStats {
            total_events: total,
            completed_events: completed,
            upcoming_events: upcoming,
            events_by_month,
        })
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<Event> {
    Ok(Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        date: row.get("date"),
        location: row.get("location"),
        creator_id: row.get("creator_id"),
        is_completed: row.get("is_completed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
