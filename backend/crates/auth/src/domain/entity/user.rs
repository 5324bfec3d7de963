//! User Entity
//!
//! Identity record owned by the credential store.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    UserId, email::Email, user_name::UserName, user_password::UserPassword, user_role::UserRole,
};

/// User entity
///
/// Carries the password hash; never serialize it directly into a response.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Login handle (unique)
    pub user_name: UserName,
    /// Email address (unique)
    pub email: Email,
    pub password_hash: UserPassword,
    pub role: UserRole,
    /// Inactive users can neither log in nor use previously issued tokens
    pub is_active: bool,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with the default role
    pub fn new(
        user_name: UserName,
        email: Email,
        password_hash: UserPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password_hash,
            role: UserRole::default(),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
        self.updated_at = at;
    }

    /// Update user role
    pub fn set_role(&mut self, role: UserRole, at: DateTime<Utc>) {
        self.role = role;
        self.updated_at = at;
    }

    /// Activate or deactivate the account
    pub fn set_active(&mut self, is_active: bool, at: DateTime<Utc>) {
        self.is_active = is_active;
        self.updated_at = at;
    }
}
