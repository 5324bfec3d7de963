//! Authenticate Use Case
//!
//! Resolves a bearer access token to the user it was issued to, re-checking
//! the credential store on every call so deactivation takes effect before
//! the token expires.

use std::sync::Arc;

use crate::application::token_policy::TokenPolicy;
use crate::application::token_service::TokenService;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenKind;
use crate::domain::value_object::{
    UserId, email::Email, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
    pub role: UserRole,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Authenticate use case
pub struct AuthenticateUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    policy: Arc<dyn TokenPolicy>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>, policy: Arc<dyn TokenPolicy>) -> Self {
        Self {
            repo,
            tokens,
            policy,
        }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<AuthenticatedUser> {
        let claims = self.tokens.validate(access_token, TokenKind::Access)?;
        if self.policy.is_revoked(&claims) {
            return Err(AuthError::TokenInvalid);
        }

        let user = self
            .repo
            .find_by_id(&claims.user_id()?)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        Ok(AuthenticatedUser::from(&user))
    }
}

/// Role membership check for an already authenticated request
pub fn authorize(user: Option<&AuthenticatedUser>, allowed: &[UserRole]) -> AuthResult<()> {
    let user = user.ok_or(AuthError::MissingToken)?;
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.user_id, role = %user.role, "Role not permitted");
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: UserId::new(),
            user_name: UserName::new("carol").unwrap(),
            email: Email::new("carol@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn test_admin_only() {
        let admin_only = [UserRole::Admin];
        assert!(matches!(
            authorize(Some(&user_with(UserRole::User)), &admin_only),
            Err(AuthError::Forbidden)
        ));
        assert!(authorize(Some(&user_with(UserRole::Admin)), &admin_only).is_ok());
    }

    #[test]
    fn test_any_of_several_roles() {
        let staff = [UserRole::Manager, UserRole::Admin];
        assert!(authorize(Some(&user_with(UserRole::Manager)), &staff).is_ok());
        assert!(authorize(Some(&user_with(UserRole::User)), &staff).is_err());
    }

    #[test]
    fn test_missing_user_is_unauthorized() {
        assert!(matches!(
            authorize(None, &[UserRole::User]),
            Err(AuthError::MissingToken)
        ));
    }
}
