//! Refresh Use Case
//!
//! Exchanges a refresh token for a new access token.

use std::sync::Arc;

use crate::application::token_policy::TokenPolicy;
use crate::application::token_service::TokenService;
use crate::domain::repository::UserRepository;
use crate::domain::token::TokenKind;
use crate::error::{AuthError, AuthResult};

/// Refresh output
pub struct RefreshOutput {
    pub access_token: String,
    /// Replacement refresh token, only when the policy rotates
    pub refresh_token: Option<String>,
}

/// Refresh use case
pub struct RefreshUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
    policy: Arc<dyn TokenPolicy>,
}

impl<R> RefreshUseCase<R>
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

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<RefreshOutput> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::Validation("Refresh token required".to_string()));
        }

        let claims = self.tokens.validate(refresh_token, TokenKind::Refresh)?;
        let rotates = self.policy.rotates_refresh_tokens();
        // Rotated tokens are single use and are spent before any await
        let accepted = if rotates {
            self.policy.consume(&claims)
        } else {
            !self.policy.is_revoked(&claims)
        };
        if !accepted {
            return Err(AuthError::TokenInvalid);
        }

        let user = self
            .repo
            .find_by_id(&claims.user_id()?)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        let access_token = self.tokens.issue_access(&user)?;

        let refresh_token = if rotates {
            Some(self.tokens.issue_refresh(&user)?)
        } else {
            None
        };

        tracing::debug!(
            user_id = %user.user_id,
            rotated = refresh_token.is_some(),
            "Access token refreshed"
        );

        Ok(RefreshOutput {
            access_token,
            refresh_token,
        })
    }
}
