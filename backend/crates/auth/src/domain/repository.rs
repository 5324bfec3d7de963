//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::user::User;
use crate::domain::value_object::{UserId, email::Email, user_name::UserName};
use crate::error::AuthResult;

/// Credential store contract
///
/// Implementations must enforce username and email uniqueness at insert
/// time and report a violation as `AuthError::Conflict`.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID, active or not
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find an active user by exact user name
    async fn find_active_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Check whether the user name or the email is already registered
    async fn exists_by_user_name_or_email(
        &self,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<bool>;

    /// Set the last-login timestamp
    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AuthResult<()>;

    /// Persist role and active flag changes
    async fn update(&self, user: &User) -> AuthResult<()>;
}
