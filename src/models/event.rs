//! Event model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Event entity. Attendees live in a separate membership relation and are
/// loaded explicitly where needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: i64,
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
    /// Date the event takes place
    pub date: NaiveDate,
    /// Venue
    pub location: String,
    /// Creating user ID
    pub creator_id: i64,
    /// Whether the event has concluded
    pub is_completed: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        title: String,
        description: String,
        date: NaiveDate,
        location: String,
        creator_id: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            title,
            description,
            date,
            location,
            creator_id,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating an event
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventInput {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    /// Initial attendee user IDs
    #[serde(default)]
    pub attendees: Vec<i64>,
}

/// Input for updating an event (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub is_completed: Option<bool>,
    /// Replaces the attendee set when present
    pub attendees: Option<Vec<i64>>,
}

/// Filter for event list queries
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Filter by exact date
    pub date: Option<NaiveDate>,
    /// Filter by location
    pub location: Option<String>,
    /// Text search over title and description
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_event() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let event = Event::new(
            "Spring Exhibition".to_string(),
            "Opening night".to_string(),
            date,
            "Main Hall".to_string(),
            1,
        );
        assert_eq!(event.date, date);
        assert!(!event.is_completed);
    }
}
