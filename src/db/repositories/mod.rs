//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod activity_log;
pub mod artwork;
pub mod event;
pub mod notification;
pub mod project;
pub mod session;
pub mod user;

pub use activity_log::{ActivityLogRepository, SqlxActivityLogRepository};
pub use artwork::{ArtworkRepository, SqlxArtworkRepository};
pub use event::{EventRepository, EventStats, SqlxEventRepository};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use project::{ProjectRepository, ProjectStats, SqlxProjectRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
