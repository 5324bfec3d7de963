//! Sign In Use Case
//!
//! Verifies credentials and issues an access/refresh token pair.

use std::sync::Arc;

use platform::clock::Clock;
use platform::password::PasswordHasher;

use crate::application::token_service::TokenService;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{user_name::UserName, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub user_name: String,
    pub password: String,
}

/// Sign in output
pub struct SignInOutput {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

impl<R> SignInUseCase<R>
where
    R: UserRepository,
{
    pub fn new(
        repo: Arc<R>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            clock,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        if input.user_name.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let password = RawPassword::for_login(input.password);

        // A name that could never have been registered is just an unknown user
        let user = match UserName::new(&input.user_name) {
            Ok(user_name) => self.repo.find_active_by_user_name(&user_name).await?,
            Err(_) => None,
        };

        let Some(mut user) = user else {
            // Spend the same hashing cost as a real verification
            self.hasher.verify_dummy(password.into_inner()).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !user.password_hash.verify(password, &self.hasher).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        match self.repo.record_login(&user.user_id, now).await {
            Ok(()) => user.record_login(now),
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "Failed to record last login");
            }
        }

        let access_token = self.tokens.issue_access(&user)?;
        let refresh_token = self.tokens.issue_refresh(&user)?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User signed in"
        );

        Ok(SignInOutput {
            user,
            access_token,
            refresh_token,
        })
    }
}
