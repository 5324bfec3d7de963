//! Sign Up Use Case
//!
//! Creates a new user account with the default role.

use std::sync::Arc;

use platform::clock::Clock;
use platform::password::PasswordHasher;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl<R> SignUpUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: PasswordHasher, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            hasher,
            clock,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        if input.user_name.trim().is_empty()
            || input.email.trim().is_empty()
            || input.password.is_empty()
        {
            return Err(AuthError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }

        let user_name = UserName::new(&input.user_name)?;
        let email = Email::new(input.email)?;
        let raw_password = RawPassword::new(input.password)?;

        if self
            .repo
            .exists_by_user_name_or_email(&user_name, &email)
            .await?
        {
            return Err(AuthError::Conflict);
        }

        let password_hash = UserPassword::from_raw(raw_password, &self.hasher).await?;
        let user = User::new(user_name, email, password_hash, self.clock.now());

        // The store re-checks uniqueness, so a concurrent duplicate still
        // surfaces as a conflict here
        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User signed up"
        );

        Ok(user)
    }
}
