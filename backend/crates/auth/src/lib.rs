//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, token claims, repository traits
//! - `application/` - Use cases, token service, rate limiter, configuration
//! - `infra/` - PostgreSQL and in-memory credential stores
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Registration and username + password login
//! - Short-lived access tokens and long-lived refresh tokens (HS256 JWT)
//! - Bearer authentication that re-checks the user on every request
//! - Role gates (User, Manager, Admin)
//! - Sliding-window throttling with separate `login` and `general` buckets
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, work factor from configuration
//! - Unknown users and wrong passwords are indistinguishable to clients
//! - Deactivated users lose access on their next request
//! - Refresh tokens are not rotated and logout does not revoke unless a
//!   revoking [`TokenPolicy`](application::TokenPolicy) is installed

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, ConfigError};
pub use application::{AuthenticatedUser, Bucket, RateLimiter, TokenService};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryUserRepository, PgUserRepository};
pub use presentation::{AuthAppState, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
