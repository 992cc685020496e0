//! Project service
//!
//! Collaborative projects. Any authenticated user can start one and
//! becomes its creator; replacing the member set fans out a
//! `project_invite` notification to the members as they stand after the
//! replacement. Marking a project complete is reserved for its creator,
//! admins included.

use crate::db::repositories::{ActivityLogRepository, ProjectRepository, ProjectStats};
use crate::models::{
    ActivityAction, CreateProjectInput, CreateProjectUpdateInput, ListParams, NotificationKind,
    PagedResult, Project, ProjectUpdate, UpdateProjectInput, User,
};
use crate::services::notification::{FanoutReport, NotificationService};
use crate::services::{permissions, record_activity, ServiceError};
use chrono::Utc;
use std::sync::Arc;

/// Project service
pub struct ProjectService {
    repo: Arc<dyn ProjectRepository>,
    notifications: Arc<NotificationService>,
    activity_repo: Arc<dyn ActivityLogRepository>,
}

impl ProjectService {
    pub fn new(
        repo: Arc<dyn ProjectRepository>,
        notifications: Arc<NotificationService>,
        activity_repo: Arc<dyn ActivityLogRepository>,
    ) -> Self {
        Self {
            repo,
            notifications,
            activity_repo,
        }
    }

    /// Start a project. The creator is always the caller.
    pub async fn create(
        &self,
        caller: &User,
        input: CreateProjectInput,
    ) -> Result<Project, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::Validation("Title cannot be empty".to_string()));
        }

        let mut project = Project::new(input.title, input.description, caller.id);
        project.end_date = input.end_date;

        let created = self.repo.create(&project, &input.members).await?;

        if !input.members.is_empty() {
            let message = format!(
                "You have been added to the project '{}'.",
                created.title
            );
            self.notifications
                .fan_out(&input.members, NotificationKind::ProjectInvite, &message)
                .await;
        }
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Create,
            Some(&format!("project '{}'", created.title)),
        )
        .await;
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Project, ServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Project"))
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<Project>, ServiceError> {
        Ok(self.repo.list(search, params).await?)
    }

    /// Current member user IDs for a project.
    pub async fn members(&self, id: i64) -> Result<Vec<i64>, ServiceError> {
        self.get(id).await?;
        Ok(self.repo.members(id).await?)
    }

    /// Update a project. Creator or admin.
    ///
    /// When the input replaces the member set, every user in the new set
    /// receives a `project_invite` notification; an update that leaves
    /// the membership alone notifies nobody.
    pub async fn update(
        &self,
        caller: &User,
        id: i64,
        input: UpdateProjectInput,
    ) -> Result<(Project, Option<FanoutReport>), ServiceError> {
        let mut project = self.get(id).await?;
        permissions::ensure(
            permissions::can_modify_owned(caller, project.creator_id),
            "You can only edit your own projects",
        )?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::Validation("Title cannot be empty".to_string()));
            }
            project.title = title;
        }
        if let Some(description) = input.description {
            project.description = description;
        }
        if input.end_date.is_some() {
            project.end_date = input.end_date;
        }

        let updated = self.repo.update(&project).await?;

        let report = if let Some(ref members) = input.members {
            self.repo.set_members(updated.id, members).await?;
            let message = format!(
                "You have been added to the project '{}'.",
                updated.title
            );
            Some(
                self.notifications
                    .fan_out(members, NotificationKind::ProjectInvite, &message)
                    .await,
            )
        } else {
            None
        };

        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some(&format!("project '{}'", updated.title)),
        )
        .await;
        Ok((updated, report))
    }

    /// Mark a project complete. Creator only; admins do not bypass this.
    pub async fn complete(&self, caller: &User, id: i64) -> Result<Project, ServiceError> {
        let mut project = self.get(id).await?;
        permissions::ensure(
            caller.id == project.creator_id,
            "Only the project creator can mark it complete",
        )?;

        project.is_completed = true;
        if project.end_date.is_none() {
            project.end_date = Some(Utc::now().date_naive());
        }
        let completed = self.repo.update(&project).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some(&format!("completed project '{}'", completed.title)),
        )
        .await;
        Ok(completed)
    }

    /// Delete a project. Creator or admin.
    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), ServiceError> {
        let project = self.get(id).await?;
        permissions::ensure(
            permissions::can_modify_owned(caller, project.creator_id),
            "You can only delete your own projects",
        )?;

        self.repo.delete(project.id).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Delete,
            Some(&format!("project '{}'", project.title)),
        )
        .await;
        Ok(())
    }

    /// Append a progress update. Creator, member, or admin.
    pub async fn add_update(
        &self,
        caller: &User,
        project_id: i64,
        input: CreateProjectUpdateInput,
    ) -> Result<ProjectUpdate, ServiceError> {
        if input.text.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Update text cannot be empty".to_string(),
            ));
        }

        let project = self.get(project_id).await?;
        let is_member = self.repo.members(project.id).await?.contains(&caller.id);
        permissions::ensure(
            caller.is_admin() || caller.id == project.creator_id || is_member,
            "Only project members can post updates",
        )?;

        let update = ProjectUpdate {
            id: 0,
            project_id: project.id,
            author_id: caller.id,
            text: input.text,
            attachment: input.attachment,
            created_at: Utc::now(),
        };
        let created = self.repo.add_update(&update).await?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Create,
            Some(&format!("update on project '{}'", project.title)),
        )
        .await;
        Ok(created)
    }

    /// Progress updates for a project, oldest first.
    pub async fn list_updates(&self, project_id: i64) -> Result<Vec<ProjectUpdate>, ServiceError> {
        self.get(project_id).await?;
        Ok(self.repo.list_updates(project_id).await?)
    }

    /// Aggregate project statistics, with the caller's contribution count.
    pub async fn stats(&self, caller: &User) -> Result<ProjectStats, ServiceError> {
        Ok(self.repo.stats(caller.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        NotificationRepository, SqlxActivityLogRepository, SqlxNotificationRepository,
        SqlxProjectRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::UserRole;

    struct Fixture {
        service: ProjectService,
        notification_repo: Arc<dyn NotificationRepository>,
        admin: User,
        creator: User,
        member: User,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::new(pool.clone());
        let mut users = Vec::new();
        for (name, role) in [
            ("curator", UserRole::Admin),
            ("creator", UserRole::Member),
            ("member", UserRole::Member),
        ] {
            users.push(
                user_repo
                    .create(&User::new(
                        format!("{}@example.com", name),
                        name.to_string(),
                        "hash".to_string(),
                        role,
                    ))
                    .await
                    .unwrap(),
            );
        }
        let member = users.pop().unwrap();
        let creator = users.pop().unwrap();
        let admin = users.pop().unwrap();

        let notification_repo = SqlxNotificationRepository::boxed(pool.clone());
        let notifications = Arc::new(NotificationService::new(notification_repo.clone()));
        let service = ProjectService::new(
            SqlxProjectRepository::boxed(pool.clone()),
            notifications,
            SqlxActivityLogRepository::boxed(pool),
        );

        Fixture {
            service,
            notification_repo,
            admin,
            creator,
            member,
        }
    }

    fn input(title: &str, members: Vec<i64>) -> CreateProjectInput {
        CreateProjectInput {
            title: title.to_string(),
            description: "Community mural".to_string(),
            end_date: None,
            members,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_creator_and_invites_members() {
        let f = setup().await;
        let project = f
            .service
            .create(&f.creator, input("Mural", vec![f.member.id]))
            .await
            .unwrap();
        assert_eq!(project.creator_id, f.creator.id);

        let page = f
            .notification_repo
            .list_for_recipient(f.member.id, true, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(
            page.items[0].message,
            "You have been added to the project 'Mural'."
        );
    }

    #[tokio::test]
    async fn test_update_without_members_notifies_nobody() {
        let f = setup().await;
        let project = f
            .service
            .create(&f.creator, input("Mural", vec![f.member.id]))
            .await
            .unwrap();
        f.notification_repo.mark_all_read(f.member.id).await.unwrap();

        let (_, report) = f
            .service
            .update(
                &f.creator,
                project.id,
                UpdateProjectInput {
                    description: Some("Bigger mural".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(report.is_none());
        assert_eq!(
            f.notification_repo.unread_count(f.member.id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_update_with_members_fans_out_invites() {
        let f = setup().await;
        let project = f
            .service
            .create(&f.creator, input("Mural", vec![]))
            .await
            .unwrap();

        let (_, report) = f
            .service
            .update(
                &f.creator,
                project.id,
                UpdateProjectInput {
                    members: Some(vec![f.member.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(report.unwrap().delivered, 1);
        assert_eq!(
            f.notification_repo.unread_count(f.member.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_enforces_ownership() {
        let f = setup().await;
        let project = f
            .service
            .create(&f.creator, input("Mural", vec![]))
            .await
            .unwrap();

        let result = f
            .service
            .update(&f.member, project.id, UpdateProjectInput::default())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        // Admins may edit any project
        assert!(f
            .service
            .update(&f.admin, project.id, UpdateProjectInput::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_complete_is_creator_only() {
        let f = setup().await;
        let project = f
            .service
            .create(&f.creator, input("Mural", vec![]))
            .await
            .unwrap();

        // Even the admin is refused
        let result = f.service.complete(&f.admin, project.id).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let completed = f.service.complete(&f.creator, project.id).await.unwrap();
        assert!(completed.is_completed);
        assert!(completed.end_date.is_some());
    }

    #[tokio::test]
    async fn test_add_update_requires_membership() {
        let f = setup().await;
        let project = f
            .service
            .create(&f.creator, input("Mural", vec![]))
            .await
            .unwrap();

        let text = CreateProjectUpdateInput {
            text: "sketched the wall".to_string(),
            attachment: None,
        };
        let result = f
            .service
            .add_update(&f.member, project.id, text.clone())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let created = f
            .service
            .add_update(&f.creator, project.id, text)
            .await
            .unwrap();
        assert_eq!(created.author_id, f.creator.id);

        let updates = f.service.list_updates(project.id).await.unwrap();
        assert_eq!(updates.len(), 1);
    }

    #[tokio::test]
    async fn test_add_update_rejects_blank_text() {
        let f = setup().await;
        let project = f
            .service
            .create(&f.creator, input("Mural", vec![]))
            .await
            .unwrap();

        let result = f
            .service
            .add_update(
                &f.creator,
                project.id,
                CreateProjectUpdateInput {
                    text: "   ".to_string(),
                    attachment: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
