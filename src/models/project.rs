//! Project model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Project entity. Members live in a separate membership relation; progress
/// updates are an append-only sequence owned by the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: i64,
    /// Project title
    pub title: String,
    /// Project description
    pub description: String,
    /// Creating user ID
    pub creator_id: i64,
    /// Start date (assigned at creation)
    pub start_date: NaiveDate,
    /// Optional end date
    pub end_date: Option<NaiveDate>,
    /// Whether the project is complete (settable only by the creator)
    pub is_completed: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(title: String, description: String, creator_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            title,
            description,
            creator_id,
            start_date: now.date_naive(),
            end_date: None,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A progress update attached to a project. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub id: i64,
    pub project_id: i64,
    pub author_id: i64,
    pub text: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectInput {
    pub title: String,
    pub description: String,
    pub end_date: Option<NaiveDate>,
    /// Initial member user IDs
    #[serde(default)]
    pub members: Vec<i64>,
}

/// Input for updating a project (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub end_date: Option<NaiveDate>,
    /// Replaces the member set when present
    pub members: Option<Vec<i64>>,
}

/// Input for appending a progress update
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectUpdateInput {
    pub text: String,
    pub attachment: Option<String>,
}
