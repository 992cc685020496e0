//! Data models
//!
//! Database entities and the input/filter types that travel between the
//! API layer and the services.

mod activity_log;
mod artwork;
mod event;
mod notification;
mod project;
mod session;
mod user;

pub use activity_log::{ActivityAction, ActivityLog};
pub use artwork::{
    ApprovalStatus, Artwork, ArtworkCategory, ArtworkFilter, CreateArtworkInput, ListParams,
    PagedResult, UpdateArtworkInput,
};
pub use event::{CreateEventInput, Event, EventFilter, UpdateEventInput};
pub use notification::{Notification, NotificationKind};
pub use project::{
    CreateProjectInput, CreateProjectUpdateInput, Project, ProjectUpdate, UpdateProjectInput,
};
pub use session::Session;
pub use user::{NotificationPreferences, UpdateProfileInput, User, UserRole};
