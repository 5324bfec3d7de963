//! Token Claims
//!
//! Claims carried by signed bearer tokens. Access tokens carry identity
//! and role; refresh tokens carry only the subject.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Token kind, checked against the operation presenting the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[display("access")]
    Access,
    #[display("refresh")]
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub kind: TokenKind,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Token ID, the key for revocation
    pub jti: String,
}

impl TokenClaims {
    /// Parse the subject as a user ID
    ///
    /// A well-signed token with a garbage subject is still an invalid token.
    pub fn user_id(&self) -> AuthResult<UserId> {
        self.sub.parse().map_err(|_| AuthError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refresh_claims(sub: &str) -> TokenClaims {
        TokenClaims {
            sub: sub.to_string(),
            username: None,
            role: None,
            email: None,
            kind: TokenKind::Refresh,
            iat: 0,
            exp: 60,
            jti: "jti".to_string(),
        }
    }

    #[test]
    fn test_refresh_claims_omit_identity() {
        let json = serde_json::to_value(refresh_claims("x")).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("username"));
        assert!(!object.contains_key("role"));
        assert!(!object.contains_key("email"));
        assert_eq!(object["kind"], "refresh");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::Access.to_string(), "access");
        assert_eq!(TokenKind::Refresh.to_string(), "refresh");
    }

    #[test]
    fn test_garbage_subject_is_invalid_token() {
        assert!(matches!(
            refresh_claims("not-a-uuid").user_id(),
            Err(AuthError::TokenInvalid)
        ));
        let id = UserId::new();
        assert_eq!(refresh_claims(&id.to_string()).user_id().unwrap(), id);
    }
}
