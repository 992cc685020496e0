//! Notification service
//!
//! Fan-out is an explicit second phase after the primary mutation has
//! committed: per-recipient failures are collected and surfaced instead
//! of rolling anything back or being silently dropped.

use crate::db::repositories::NotificationRepository;
use crate::models::{ListParams, Notification, NotificationKind, PagedResult, User};
use crate::services::ServiceError;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a fan-out pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanoutReport {
    /// Notifications successfully created
    pub delivered: usize,
    /// Recipients for whom creation failed
    pub failed: usize,
}

impl FanoutReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Notification service
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    /// Create a single notification.
    pub async fn notify(
        &self,
        recipient_id: i64,
        kind: NotificationKind,
        message: &str,
    ) -> Result<Notification> {
        self.repo.create(recipient_id, kind, message).await
    }

    /// Create one notification per recipient.
    ///
    /// Runs after the triggering mutation has committed; a failure here
    /// never unwinds that mutation. Failures are counted, logged, and
    /// reported to the caller.
    pub async fn fan_out(
        &self,
        recipients: &[i64],
        kind: NotificationKind,
        message: &str,
    ) -> FanoutReport {
        let mut report = FanoutReport::default();
        for &recipient_id in recipients {
            match self.repo.create(recipient_id, kind, message).await {
                Ok(_) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        recipient_id,
                        kind = %kind,
                        "Notification delivery failed: {:#}",
                        e
                    );
                }
            }
        }
        report
    }

    /// List the caller's notifications, newest first.
    pub async fn list_for(
        &self,
        caller: &User,
        unread_only: bool,
        params: &ListParams,
    ) -> Result<PagedResult<Notification>, ServiceError> {
        Ok(self
            .repo
            .list_for_recipient(caller.id, unread_only, params)
            .await?)
    }

    /// Mark one of the caller's notifications read.
    ///
    /// A notification belonging to someone else is indistinguishable from
    /// a missing one.
    pub async fn mark_read(&self, caller: &User, id: i64) -> Result<Notification, ServiceError> {
        let notification = self
            .repo
            .get_by_id(id)
            .await?
            .filter(|n| n.recipient_id == caller.id)
            .ok_or(ServiceError::NotFound("Notification"))?;

        self.repo.mark_read(notification.id).await?;
        Ok(Notification {
            read: true,
            ..notification
        })
    }

    /// Mark all of the caller's notifications read, returning the count.
    pub async fn mark_all_read(&self, caller: &User) -> Result<i64, ServiceError> {
        Ok(self.repo.mark_all_read(caller.id).await?)
    }

    /// Number of unread notifications for the caller.
    pub async fn unread_count(&self, caller: &User) -> Result<i64, ServiceError> {
        Ok(self.repo.unread_count(caller.id).await?)
    }
}
