//! Token Service
//!
//! Issues and validates HS256-signed JWTs. Validation reads the current time
//! from the injected clock, so expiry is deterministic under test.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use platform::clock::Clock;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::token::{TokenClaims, TokenKind};
use crate::error::{AuthError, AuthResult};

/// JWT issuer/validator
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_secret),
            decoding_key: DecodingKey::from_secret(&config.jwt_secret),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            clock,
        }
    }

    /// Issue an access token carrying identity and role
    pub fn issue_access(&self, user: &User) -> AuthResult<String> {
        let (iat, exp) = self.lifetime(self.access_ttl);
        let claims = TokenClaims {
            sub: user.user_id.to_string(),
            username: Some(user.user_name.to_string()),
            role: Some(user.role),
            email: Some(user.email.to_string()),
            kind: TokenKind::Access,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    /// Issue a refresh token carrying only the subject
    pub fn issue_refresh(&self, user: &User) -> AuthResult<String> {
        let (iat, exp) = self.lifetime(self.refresh_ttl);
        let claims = TokenClaims {
            sub: user.user_id.to_string(),
            username: None,
            role: None,
            email: None,
            kind: TokenKind::Refresh,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    /// Verify signature, expiry and kind, in that order
    ///
    /// No I/O: callers re-check the subject against the credential store.
    pub fn validate(&self, token: &str, expected: TokenKind) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::TokenInvalid
            })?
            .claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        if claims.kind != expected {
            return Err(AuthError::TokenKindMismatch);
        }

        Ok(claims)
    }

    fn lifetime(&self, ttl: Duration) -> (i64, i64) {
        let iat = self.clock.now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        (iat, iat.saturating_add(ttl_secs))
    }

    fn sign(&self, claims: &TokenClaims) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode {} token: {}", claims.kind, e)))
    }
}
