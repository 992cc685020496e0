//! Event service
//!
//! Events are curated by admins. Any update to an event fans out an
//! `event_update` notification to the attendee set as it stands at the
//! moment of the update: attendees added in the same request are
//! notified, attendees removed in it are not.

use crate::db::repositories::{ActivityLogRepository, EventRepository, EventStats};
use crate::models::{
    ActivityAction, CreateEventInput, Event, EventFilter, ListParams, NotificationKind,
    PagedResult, UpdateEventInput, User,
};
use crate::services::notification::{FanoutReport, NotificationService};
use crate::services::{permissions, record_activity, ServiceError};
use chrono::Utc;
use std::sync::Arc;

/// Event service
pub struct EventService {
    repo: Arc<dyn EventRepository>,
    notifications: Arc<NotificationService>,
    activity_repo: Arc<dyn ActivityLogRepository>,
}

impl EventService {
    pub fn new(
        repo: Arc<dyn EventRepository>,
        notifications: Arc<NotificationService>,
        activity_repo: Arc<dyn ActivityLogRepository>,
    ) -> Self {
        Self {
            repo,
            notifications,
            activity_repo,
        }
    }

    /// Create an event. Admin only.
    pub async fn create(
        &self,
        caller: &User,
        input: CreateEventInput,
    ) -> Result<Event, ServiceError> {
        permissions::ensure(
            permissions::can_manage_events(caller),
            "Only admins can create events",
        )?;
        if input.title.trim().is_empty() {
            return Err(ServiceError::Validation("Title cannot be empty".to_string()));
        }
        if input.description.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Description cannot be empty".to_string(),
            ));
        }
        if input.location.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Location cannot be empty".to_string(),
            ));
        }

        let event = Event::new(
            input.title,
            input.description,
            input.date,
            input.location,
            caller.id,
        );
        let created = self.repo.create(&event, &input.attendees).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Create,
            Some(&format!("event '{}'", created.title)),
        )
        .await;
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Event, ServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Event"))
    }

    pub async fn list(
        &self,
        filter: &EventFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Event>, ServiceError> {
        Ok(self.repo.list(filter, params).await?)
    }

    /// Events the caller attends, soonest first.
    pub async fn my_events(&self, caller: &User) -> Result<Vec<Event>, ServiceError> {
        Ok(self.repo.list_for_attendee(caller.id).await?)
    }

    /// Current attendee user IDs for an event.
    pub async fn attendees(&self, id: i64) -> Result<Vec<i64>, ServiceError> {
        self.get(id).await?;
        Ok(self.repo.attendees(id).await?)
    }

    /// Update an event. Admin only.
    ///
    /// If the input replaces the attendee set, the replacement happens
    /// first; the fan-out then goes to the post-update attendees.
    pub async fn update(
        &self,
        caller: &User,
        id: i64,
        input: UpdateEventInput,
    ) -> Result<(Event, FanoutReport), ServiceError> {
        permissions::ensure(
            permissions::can_manage_events(caller),
            "Only admins can update events",
        )?;
        let mut event = self.get(id).await?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::Validation("Title cannot be empty".to_string()));
            }
            event.title = title;
        }
        if let Some(description) = input.description {
            event.description = description;
        }
        if let Some(date) = input.date {
            event.date = date;
        }
        if let Some(location) = input.location {
            event.location = location;
        }
        if let Some(is_completed) = input.is_completed {
            event.is_completed = is_completed;
        }

        let updated = self.repo.update(&event).await?;
        if let Some(ref attendees) = input.attendees {
            self.repo.set_attendees(updated.id, attendees).await?;
        }

        let recipients = self.repo.attendees(updated.id).await?;
        let message = format!("The event '{}' has been updated.", updated.title);
        let report = self
            .notifications
            .fan_out(&recipients, NotificationKind::EventUpdate, &message)
            .await;

        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some(&format!("event '{}'", updated.title)),
        )
        .await;
        Ok((updated, report))
    }

    /// Delete an event. Admin only.
    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), ServiceError> {
        permissions::ensure(
            permissions::can_manage_events(caller),
            "Only admins can delete events",
        )?;
        let event = self.get(id).await?;

        self.repo.delete(event.id).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Delete,
            Some(&format!("event '{}'", event.title)),
        )
        .await;
        Ok(())
    }

    /// Aggregate event statistics as of today.
    pub async fn stats(&self) -> Result<EventStats, ServiceError> {
        Ok(self.repo.stats(Utc::now().date_naive()).await?)
    }
}
