//! Permission evaluator
//!
//! Pure predicates mapping (user, action, resource ownership) to
//! allow/deny. Authentication itself happens earlier, in the API
//! middleware; by the time these run there is always a concrete caller.
//!
//! Rules: admins may moderate artworks, manage events, and change roles;
//! everyone may read and create their own artwork/project contributions;
//! update/delete requires ownership, which admins bypass.

use crate::models::User;
use crate::services::ServiceError;

/// May the user update or delete a record owned by `owner_id`?
pub fn can_modify_owned(user: &User, owner_id: i64) -> bool {
    user.is_admin() || user.id == owner_id
}

/// May the user approve or reject artworks?
pub fn can_moderate_artworks(user: &User) -> bool {
    user.is_admin()
}

/// May the user create, update, or delete events?
pub fn can_manage_events(user: &User) -> bool {
    user.is_admin()
}

/// May the user change roles or list all accounts?
pub fn can_manage_users(user: &User) -> bool {
    user.is_admin()
}

/// May the user read the activity log?
pub fn can_view_activity_logs(user: &User) -> bool {
    user.is_admin()
}

/// Turn a predicate result into a service error. Deny is total; there is
/// no partial application of a mutation.
pub fn ensure(allowed: bool, message: &str) -> Result<(), ServiceError> {
    if allowed {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn user(id: i64, role: UserRole) -> User {
        let mut u = User::new(
            format!("u{}@example.com", id),
            format!("u{}", id),
            "hash".to_string(),
            role,
        );
        u.id = id;
        u
    }

    #[test]
    fn test_admin_bypasses_ownership() {
        let admin = user(1, UserRole::Admin);
        assert!(can_modify_owned(&admin, 2));
        assert!(can_modify_owned(&admin, 999));
    }

    #[test]
    fn test_member_modifies_only_own_records() {
        let member = user(2, UserRole::Member);
        assert!(can_modify_owned(&member, 2));
        assert!(!can_modify_owned(&member, 3));
    }

    #[test]
    fn test_only_admin_moderates_and_manages() {
        let admin = user(1, UserRole::Admin);
        let member = user(2, UserRole::Member);
        let visitor = user(3, UserRole::Visitor);

        assert!(can_moderate_artworks(&admin));
        assert!(!can_moderate_artworks(&member));
        assert!(!can_moderate_artworks(&visitor));

        assert!(can_manage_events(&admin));
        assert!(!can_manage_events(&member));

        assert!(can_manage_users(&admin));
        assert!(!can_manage_users(&visitor));
    }

    #[test]
    fn test_ensure_produces_forbidden() {
        assert!(ensure(true, "nope").is_ok());
        let err = ensure(false, "nope").unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
