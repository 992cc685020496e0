//! Business logic services
//!
//! Services sit between the HTTP handlers and the repositories. Every
//! operation takes the authenticated caller explicitly; there is no ambient
//! "current user" state.

pub mod artwork;
pub mod event;
pub mod notification;
pub mod password;
pub mod permissions;
pub mod project;
pub mod user;

pub use artwork::ArtworkService;
pub use event::EventService;
pub use notification::{FanoutReport, NotificationService};
pub use project::ProjectService;
pub use user::{UserService, UserServiceError};

use crate::db::repositories::ActivityLogRepository;
use crate::models::ActivityAction;

/// Error type shared by the resource services.
///
/// The API layer maps these onto 404 / 403 / 400 responses; `Internal`
/// carries everything that is the server's fault.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Unknown record id
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Valid identity, insufficient role or ownership
    #[error("{0}")]
    Forbidden(String),

    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Database or other unexpected failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Best-effort activity logging. A failed log write must never fail the
/// operation it describes.
pub(crate) async fn record_activity(
    repo: &dyn ActivityLogRepository,
    user_id: i64,
    action: ActivityAction,
    resource: Option<&str>,
) {
    if let Err(e) = repo.append(user_id, action, resource).await {
        tracing::warn!(user_id, action = %action, "Failed to record activity: {:#}", e);
    }
}
