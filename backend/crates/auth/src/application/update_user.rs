//! Update User Access Use Case
//!
//! Administrative role and active-flag changes. Deactivation takes effect on
//! the user's next authenticated request.

use std::sync::Arc;

use platform::clock::Clock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Update input; at least one field must be set
pub struct UpdateUserAccessInput {
    pub user_id: UserId,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Update user access use case
pub struct UpdateUserAccessUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UpdateUserAccessUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn execute(&self, input: UpdateUserAccessInput) -> AuthResult<User> {
        if input.role.is_none() && input.is_active.is_none() {
            return Err(AuthError::Validation(
                "Nothing to update: provide role or isActive".to_string(),
            ));
        }

        let mut user = self
            .repo
            .find_by_id(&input.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let now = self.clock.now();
        if let Some(role) = input.role {
            user.set_role(role, now);
        }
        if let Some(is_active) = input.is_active {
            user.set_active(is_active, now);
        }

        self.repo.update(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            role = %user.role,
            is_active = user.is_active,
            "User access updated"
        );

        Ok(user)
    }
}
