//! Notification model
//!
//! Notifications are created exclusively as side effects of mutations on
//! other entities; the only mutation they ever see is the read flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: i64,
    /// Recipient user ID
    pub recipient_id: i64,
    /// Message text
    pub message: String,
    /// What triggered the notification
    pub kind: NotificationKind,
    /// Whether the recipient has read it
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Notification type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ArtworkApproved,
    ArtworkRejected,
    EventUpdate,
    ProjectInvite,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::ArtworkApproved => write!(f, "artwork_approved"),
            NotificationKind::ArtworkRejected => write!(f, "artwork_rejected"),
            NotificationKind::EventUpdate => write!(f, "event_update"),
            NotificationKind::ProjectInvite => write!(f, "project_invite"),
        }
    }
}

impl FromStr for NotificationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artwork_approved" => Ok(NotificationKind::ArtworkApproved),
            "artwork_rejected" => Ok(NotificationKind::ArtworkRejected),
            "event_update" => Ok(NotificationKind::EventUpdate),
            "project_invite" => Ok(NotificationKind::ProjectInvite),
            _ => Err(anyhow::anyhow!("Invalid notification kind: {}", s)),
        }
    }
}
