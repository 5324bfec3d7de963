//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::{AuthAppState, AuthAppStateBuilder};
pub use middleware::{
    authenticate, bearer_token, general_rate_limit, login_rate_limit, require_admin, require_role,
};
pub use router::auth_router;
