//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::authenticate::AuthenticatedUser;
use crate::domain::entity::user::User;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

// ============================================================================
// User Projection
// ============================================================================

/// Sanitized user; never carries the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            username: user.user_name.to_string(),
            email: user.email.to_string(),
            role: user.role,
            is_active: Some(user.is_active),
            last_login: user.last_login_at,
            created_at: Some(user.created_at),
        }
    }
}

impl From<&AuthenticatedUser> for UserResponse {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.user_id.to_string(),
            username: user.user_name.to_string(),
            email: user.email.to_string(),
            role: user.role,
            is_active: None,
            last_login: None,
            created_at: None,
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// Login request
///
/// Missing fields deserialize as empty and are rejected by the use case.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued token pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Password composition rules applied before the core sees the request
    pub fn validate(&self) -> AuthResult<()> {
        let password = &self.password;
        if password.is_empty() {
            // Presence is reported by the use case together with the other fields
            return Ok(());
        }

        let has_upper = password.chars().any(char::is_uppercase);
        let has_lower = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if has_upper && has_lower && has_digit {
            Ok(())
        } else {
            Err(AuthError::Validation(
                "Password must contain an uppercase letter, a lowercase letter and a digit"
                    .to_string(),
            ))
        }
    }
}

/// Register response
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

// ============================================================================
// Refresh / Logout
// ============================================================================

/// Refresh request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Logout request body (optional)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Generic success message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Current User / Admin
// ============================================================================

/// Current or updated user
#[derive(Debug, Clone, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

/// Admin role/status change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str) -> RegisterRequest {
        RegisterRequest {
            username: "dave".to_string(),
            email: "dave@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_password_composition() {
        assert!(register("Password1").validate().is_ok());
        assert!(register("password1").validate().is_err());
        assert!(register("PASSWORD1").validate().is_err());
        assert!(register("Passwordx").validate().is_err());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{"username":"dave"}"#).unwrap();
        assert_eq!(req.username, "dave");
        assert!(req.password.is_empty());
    }

    #[test]
    fn test_refresh_request_is_camel_case() {
        let req: RefreshRequest = serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(req.refresh_token, "abc");
    }

    #[test]
    fn test_update_request_role_codes() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"role":"manager","isActive":false}"#).unwrap();
        assert_eq!(req.role, Some(UserRole::Manager));
        assert_eq!(req.is_active, Some(false));

        assert!(serde_json::from_str::<UpdateUserRequest>(r#"{"role":"root"}"#).is_err());
    }
}
