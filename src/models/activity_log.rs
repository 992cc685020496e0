//! Activity log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Append-only activity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub action: ActivityAction,
    /// Name of the touched resource, e.g. "artwork 'Dusk'"
    pub resource: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Action tag for an activity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Login,
    Logout,
    Create,
    Update,
    Delete,
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityAction::Login => write!(f, "login"),
            ActivityAction::Logout => write!(f, "logout"),
            ActivityAction::Create => write!(f, "create"),
            ActivityAction::Update => write!(f, "update"),
            ActivityAction::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for ActivityAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "login" => Ok(ActivityAction::Login),
            "logout" => Ok(ActivityAction::Logout),
            "create" => Ok(ActivityAction::Create),
            "update" => Ok(ActivityAction::Update),
            "delete" => Ok(ActivityAction::Delete),
            _ => Err(anyhow::anyhow!("Invalid activity action: {}", s)),
        }
    }
}
