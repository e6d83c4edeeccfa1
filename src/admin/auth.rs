//! Request principal and permission checks.
//!
//! Authentication happens upstream: a reverse proxy (or SSO gateway) sets a
//! trusted header naming the user. The principal is that user when it exists
//! and is active, anonymous otherwise.

use axum::{extract::FromRequestParts, http::request::Parts};
use backoffice_kit::Permissions;

use super::api::{ApiError, SharedState};
use super::models::User;

#[derive(Debug, Clone, Default)]
pub struct Principal {
    pub user: Option<User>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn user(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user, or `403` for anonymous requests.
    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.user.as_ref().ok_or_else(ApiError::forbidden)
    }
}

impl FromRequestParts<SharedState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(state.auth.user_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let Some(username) = from_header.or_else(|| state.auth.dev_user.clone()) else {
            return Ok(Principal::anonymous());
        };

        let lookup = username.clone();
        let user = state
            .db
            .call(move |db| db.get_user_by_username(&lookup))
            .await
            .map_err(ApiError::internal)?;

        match user {
            Some(user) if user.is_active => Ok(Principal::user(user)),
            _ => {
                tracing::debug!(%username, "unknown or inactive user, treating as anonymous");
                Ok(Principal::anonymous())
            }
        }
    }
}

/// Decides whether a principal holds a permission codename.
///
/// The listing-level helpers read the codenames from a listing's
/// [`Permissions`]; export falls back to the list permission when the
/// listing names none.
pub trait Authorizer: Send + Sync {
    /// `codename` of `None` means the action only requires a signed-in user.
    fn has_perm(&self, principal: &Principal, codename: Option<&str>) -> bool;

    fn can_list(&self, principal: &Principal, perms: &Permissions) -> bool {
        self.has_perm(principal, perms.list.as_deref())
    }

    fn can_create(&self, principal: &Principal, perms: &Permissions) -> bool {
        self.has_perm(principal, perms.create.as_deref())
    }

    fn can_edit(&self, principal: &Principal, perms: &Permissions) -> bool {
        self.has_perm(principal, perms.edit.as_deref())
    }

    fn can_delete(&self, principal: &Principal, perms: &Permissions) -> bool {
        self.has_perm(principal, perms.delete.as_deref())
    }

    fn can_export(&self, principal: &Principal, perms: &Permissions) -> bool {
        self.has_perm(principal, perms.export.as_deref().or(perms.list.as_deref()))
    }
}

/// Superusers pass every check; other users need the codename.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionAuthorizer;

impl Authorizer for PermissionAuthorizer {
    fn has_perm(&self, principal: &Principal, codename: Option<&str>) -> bool {
        let Some(user) = &principal.user else {
            return false;
        };
        match codename {
            Some(codename) => user.has_perm(codename),
            None => user.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::models::perms;
    use chrono::Utc;

    fn principal(is_superuser: bool, permissions: &[&str]) -> Principal {
        Principal::user(User {
            id: 1,
            username: "ana".into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: String::new(),
            is_active: true,
            is_superuser,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            date_joined: Utc::now(),
        })
    }

    fn user_perms() -> Permissions {
        Permissions {
            list: Some(perms::VIEW_USER.into()),
            create: Some(perms::ADD_USER.into()),
            edit: Some(perms::CHANGE_USER.into()),
            delete: Some(perms::DELETE_USER.into()),
            export: None,
        }
    }

    #[test]
    fn test_anonymous_denied_everything() {
        let auth = PermissionAuthorizer;
        let anon = Principal::anonymous();
        assert!(!auth.can_list(&anon, &user_perms()));
        assert!(!auth.has_perm(&anon, None));
    }

    #[test]
    fn test_superuser_allowed_everything() {
        let auth = PermissionAuthorizer;
        let root = principal(true, &[]);
        let p = user_perms();
        assert!(auth.can_list(&root, &p));
        assert!(auth.can_create(&root, &p));
        assert!(auth.can_edit(&root, &p));
        assert!(auth.can_delete(&root, &p));
        assert!(auth.can_export(&root, &p));
    }

    #[test]
    fn test_codename_required() {
        let auth = PermissionAuthorizer;
        let viewer = principal(false, &[perms::VIEW_USER]);
        let p = user_perms();
        assert!(auth.can_list(&viewer, &p));
        assert!(!auth.can_create(&viewer, &p));
        assert!(!auth.can_edit(&viewer, &p));
    }

    #[test]
    fn test_export_falls_back_to_list_permission() {
        let auth = PermissionAuthorizer;
        let viewer = principal(false, &[perms::VIEW_USER]);
        assert!(auth.can_export(&viewer, &user_perms()));

        let nobody = principal(false, &[]);
        assert!(!auth.can_export(&nobody, &user_perms()));
    }

    #[test]
    fn test_no_codename_needs_only_signed_in_user() {
        let auth = PermissionAuthorizer;
        assert!(auth.has_perm(&principal(false, &[]), None));
        assert!(auth.can_list(&principal(false, &[]), &Permissions::default()));
    }
}
