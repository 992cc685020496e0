//! Artwork service
//!
//! Submission and moderation. Every artwork enters the gallery as
//! `pending`; an admin moves it to `approved` or `rejected`, and the
//! artist is notified once per state change. Rejection requires
//! non-blank feedback and the feedback travels inside the notification
//! message.

use crate::db::repositories::{ActivityLogRepository, ArtworkRepository};
use crate::models::{
    ActivityAction, ApprovalStatus, Artwork, ArtworkFilter, CreateArtworkInput, ListParams,
    NotificationKind, PagedResult, UpdateArtworkInput, User,
};
use crate::services::notification::NotificationService;
use crate::services::{permissions, record_activity, ServiceError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One row of the category analytics breakdown
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
    pub total: i64,
}

/// Artwork service
pub struct ArtworkService {
    repo: Arc<dyn ArtworkRepository>,
    notifications: Arc<NotificationService>,
    activity_repo: Arc<dyn ActivityLogRepository>,
}

impl ArtworkService {
    pub fn new(
        repo: Arc<dyn ArtworkRepository>,
        notifications: Arc<NotificationService>,
        activity_repo: Arc<dyn ActivityLogRepository>,
    ) -> Self {
        Self {
            repo,
            notifications,
            activity_repo,
        }
    }

    /// Submit a new artwork. The artist is always the caller, regardless
    /// of anything in the input.
    pub async fn create(
        &self,
        caller: &User,
        input: CreateArtworkInput,
    ) -> Result<Artwork, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::Validation("Title cannot be empty".to_string()));
        }
        if input.description.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Description cannot be empty".to_string(),
            ));
        }
        if input.image.trim().is_empty() {
            return Err(ServiceError::Validation("Image cannot be empty".to_string()));
        }

        let artwork = Artwork::new(
            input.title,
            input.description,
            input.image,
            input.category,
            caller.id,
        );
        let created = self.repo.create(&artwork).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Create,
            Some(&format!("artwork '{}'", created.title)),
        )
        .await;
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Artwork, ServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Artwork"))
    }

    pub async fn list(
        &self,
        filter: &ArtworkFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Artwork>, ServiceError> {
        Ok(self.repo.list(filter, params).await?)
    }

    /// List the caller's own submissions, in any moderation state.
    pub async fn my_artworks(
        &self,
        caller: &User,
        params: &ListParams,
    ) -> Result<PagedResult<Artwork>, ServiceError> {
        let filter = ArtworkFilter {
            artist_id: Some(caller.id),
            newest_first: true,
            ..Default::default()
        };
        Ok(self.repo.list(&filter, params).await?)
    }

    /// Update an artwork's content. Owner or admin.
    pub async fn update(
        &self,
        caller: &User,
        id: i64,
        input: UpdateArtworkInput,
    ) -> Result<Artwork, ServiceError> {
        let mut artwork = self.get(id).await?;
        permissions::ensure(
            permissions::can_modify_owned(caller, artwork.artist_id),
            "You can only edit your own artworks",
        )?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::Validation("Title cannot be empty".to_string()));
            }
            artwork.title = title;
        }
        if let Some(description) = input.description {
            artwork.description = description;
        }
        if let Some(image) = input.image {
            artwork.image = image;
        }
        if let Some(category) = input.category {
            artwork.category = category;
        }

        let updated = self.repo.update(&artwork).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some(&format!("artwork '{}'", updated.title)),
        )
        .await;
        Ok(updated)
    }

    /// Delete an artwork. Owner or admin.
    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), ServiceError> {
        let artwork = self.get(id).await?;
        permissions::ensure(
            permissions::can_modify_owned(caller, artwork.artist_id),
            "You can only delete your own artworks",
        )?;

        self.repo.delete(artwork.id).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Delete,
            Some(&format!("artwork '{}'", artwork.title)),
        )
        .await;
        Ok(())
    }

    /// Approve an artwork. Admin only.
    ///
    /// Approving an already-approved artwork is a no-op and does not
    /// notify the artist again.
    pub async fn approve(&self, caller: &User, id: i64) -> Result<Artwork, ServiceError> {
        permissions::ensure(
            permissions::can_moderate_artworks(caller),
            "Only admins can moderate artworks",
        )?;
        let artwork = self.get(id).await?;
        if artwork.approval_status == ApprovalStatus::Approved {
            return Ok(artwork);
        }

        self.repo
            .set_status(artwork.id, ApprovalStatus::Approved, None)
            .await?;
        let approved = self.get(artwork.id).await?;

        let message = format!("Your artwork '{}' has been approved.", approved.title);
        if let Err(e) = self
            .notifications
            .notify(approved.artist_id, NotificationKind::ArtworkApproved, &message)
            .await
        {
            tracing::warn!(
                artwork_id = approved.id,
                "Failed to notify artist of approval: {:#}",
                e
            );
        }
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some(&format!("approved artwork '{}'", approved.title)),
        )
        .await;
        Ok(approved)
    }

    /// Reject an artwork with feedback. Admin only.
    ///
    /// Feedback must contain something other than whitespace; a blank
    /// rejection is refused before any state changes. Re-rejecting an
    /// already-rejected artwork updates the feedback without a second
    /// notification.
    pub async fn reject(
        &self,
        caller: &User,
        id: i64,
        feedback: &str,
    ) -> Result<Artwork, ServiceError> {
        permissions::ensure(
            permissions::can_moderate_artworks(caller),
            "Only admins can moderate artworks",
        )?;
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(ServiceError::Validation(
                "Rejection feedback cannot be empty".to_string(),
            ));
        }

        let artwork = self.get(id).await?;
        let already_rejected = artwork.approval_status == ApprovalStatus::Rejected;

        self.repo
            .set_status(artwork.id, ApprovalStatus::Rejected, Some(feedback))
            .await?;
        let rejected = self.get(artwork.id).await?;

        if !already_rejected {
            let message = format!(
                "Your artwork '{}' has been rejected: {}",
                rejected.title, feedback
            );
            if let Err(e) = self
                .notifications
                .notify(rejected.artist_id, NotificationKind::ArtworkRejected, &message)
                .await
            {
                tracing::warn!(
                    artwork_id = rejected.id,
                    "Failed to notify artist of rejection: {:#}",
                    e
                );
            }
        }
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some(&format!("rejected artwork '{}'", rejected.title)),
        )
        .await;
        Ok(rejected)
    }

    /// Per-category counts broken down by moderation state.
    pub async fn category_analytics(&self) -> Result<Vec<CategoryCount>, ServiceError> {
        let rows = self.repo.count_by_category_and_status().await?;

        let mut by_category: BTreeMap<String, CategoryCount> = BTreeMap::new();
        for (category, status, count) in rows {
            let entry = by_category
                .entry(category.clone())
                .or_insert_with(|| CategoryCount {
                    category,
                    approved: 0,
                    pending: 0,
                    rejected: 0,
                    total: 0,
                });
            entry.total += count;
            match status.as_str() {
                "approved" => entry.approved += count,
                "pending" => entry.pending += count,
                "rejected" => entry.rejected += count,
                _ => {}
            }
        }
        Ok(by_category.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        NotificationRepository, SqlxActivityLogRepository, SqlxArtworkRepository,
        SqlxNotificationRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{ArtworkCategory, UserRole};

    struct Fixture {
        service: ArtworkService,
        notification_repo: Arc<dyn NotificationRepository>,
        admin: User,
        artist: User,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::new(pool.clone());
        let admin = user_repo
            .create(&User::new(
                "curator@example.com".to_string(),
                "curator".to_string(),
                "hash".to_string(),
                UserRole::Admin,
            ))
            .await
            .unwrap();
        let artist = user_repo
            .create(&User::new(
                "artist@example.com".to_string(),
                "artist".to_string(),
                "hash".to_string(),
                UserRole::Member,
            ))
            .await
            .unwrap();

        let notification_repo = SqlxNotificationRepository::boxed(pool.clone());
        let notifications = Arc::new(NotificationService::new(notification_repo.clone()));
        let service = ArtworkService::new(
            SqlxArtworkRepository::boxed(pool.clone()),
            notifications,
            SqlxActivityLogRepository::boxed(pool),
        );

        Fixture {
            service,
            notification_repo,
            admin,
            artist,
        }
    }

    fn input(title: &str) -> CreateArtworkInput {
        CreateArtworkInput {
            title: title.to_string(),
            description: "A study".to_string(),
            image: "artworks/study.png".to_string(),
            category: ArtworkCategory::Sketch,
        }
    }

    async fn unread(f: &Fixture, user: &User) -> i64 {
        f.notification_repo.unread_count(user.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_artist_and_pending() {
        let f = setup().await;
        let artwork = f.service.create(&f.artist, input("Dusk")).await.unwrap();
        assert_eq!(artwork.artist_id, f.artist.id);
        assert_eq!(artwork.approval_status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let f = setup().await;
        let result = f.service.create(&f.artist, input("   ")).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_approve_notifies_artist_once() {
        let f = setup().await;
        let artwork = f.service.create(&f.artist, input("Dusk")).await.unwrap();

        let approved = f.service.approve(&f.admin, artwork.id).await.unwrap();
        assert_eq!(approved.approval_status, ApprovalStatus::Approved);
        assert_eq!(unread(&f, &f.artist).await, 1);

        // Re-approval changes nothing and stays silent
        f.service.approve(&f.admin, artwork.id).await.unwrap();
        assert_eq!(unread(&f, &f.artist).await, 1);
    }

    #[tokio::test]
    async fn test_reject_requires_feedback() {
        let f = setup().await;
        let artwork = f.service.create(&f.artist, input("Blurry")).await.unwrap();

        let result = f.service.reject(&f.admin, artwork.id, "   ").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        // Nothing changed and nobody was notified
        let unchanged = f.service.get(artwork.id).await.unwrap();
        assert_eq!(unchanged.approval_status, ApprovalStatus::Pending);
        assert_eq!(unread(&f, &f.artist).await, 0);
    }

    #[tokio::test]
    async fn test_reject_delivers_feedback_to_artist() {
        let f = setup().await;
        let artwork = f.service.create(&f.artist, input("Blurry")).await.unwrap();

        let rejected = f
            .service
            .reject(&f.admin, artwork.id, "too blurry")
            .await
            .unwrap();
        assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);
        assert_eq!(rejected.feedback.as_deref(), Some("too blurry"));

        let page = f
            .notification_repo
            .list_for_recipient(f.artist.id, false, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items[0].message.contains("too blurry"));
    }

    #[tokio::test]
    async fn test_moderation_requires_admin() {
        let f = setup().await;
        let artwork = f.service.create(&f.artist, input("Dusk")).await.unwrap();

        let result = f.service.approve(&f.artist, artwork.id).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        let result = f.service.reject(&f.artist, artwork.id, "nope").await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_enforce_ownership() {
        let f = setup().await;
        let artwork = f.service.create(&f.artist, input("Dusk")).await.unwrap();

        let other = User {
            id: f.artist.id + 100,
            ..f.artist.clone()
        };
        let result = f
            .service
            .update(&other, artwork.id, UpdateArtworkInput::default())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        // Admin bypasses ownership
        f.service.delete(&f.admin, artwork.id).await.unwrap();
        let result = f.service.get(artwork.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_category_analytics_breakdown() {
        let f = setup().await;
        let a = f.service.create(&f.artist, input("One")).await.unwrap();
        f.service.create(&f.artist, input("Two")).await.unwrap();
        f.service.approve(&f.admin, a.id).await.unwrap();

        let analytics = f.service.category_analytics().await.unwrap();
        assert_eq!(analytics.len(), 1);
        assert_eq!(analytics[0].category, "sketch");
        assert_eq!(analytics[0].total, 2);
        assert_eq!(analytics[0].approved, 1);
        assert_eq!(analytics[0].pending, 1);
    }
}
