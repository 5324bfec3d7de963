//! Sign Out Use Case
//!
//! Always succeeds. Presented tokens are handed to the token policy for
//! revocation; with the stateless policy this does nothing and the tokens
//! stay valid until they expire.

use std::sync::Arc;

use crate::application::token_policy::TokenPolicy;
use crate::application::token_service::TokenService;
use crate::domain::token::TokenKind;

/// Sign out input
#[derive(Default)]
pub struct SignOutInput {
    /// Bearer access token, if the client sent one
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Sign out use case
pub struct SignOutUseCase {
    tokens: Arc<TokenService>,
    policy: Arc<dyn TokenPolicy>,
}

impl SignOutUseCase {
    pub fn new(tokens: Arc<TokenService>, policy: Arc<dyn TokenPolicy>) -> Self {
        Self { tokens, policy }
    }

    /// Revoke whatever valid tokens were presented
    ///
    /// Invalid or expired tokens are ignored.
    pub fn execute(&self, input: SignOutInput) {
        let presented = [
            (input.access_token, TokenKind::Access),
            (input.refresh_token, TokenKind::Refresh),
        ];

        for (token, kind) in presented {
            let Some(token) = token else { continue };
            match self.tokens.validate(&token, kind) {
                Ok(claims) => {
                    self.policy.revoke(&claims);
                    tracing::info!(sub = %claims.sub, kind = %kind, "Token signed out");
                }
                Err(e) => {
                    tracing::debug!(kind = %kind, error = %e, "Ignoring unusable token on sign out");
                }
            }
        }
    }
}
