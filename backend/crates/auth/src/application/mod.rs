//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod refresh;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod throttle;
pub mod token_policy;
pub mod token_service;
pub mod update_user;

// Re-exports
pub use authenticate::{AuthenticateUseCase, AuthenticatedUser, authorize};
pub use config::AuthConfig;
pub use refresh::{RefreshOutput, RefreshUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::{SignOutInput, SignOutUseCase};
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use throttle::{Bucket, RateLimiter};
pub use token_policy::{DenylistTokenPolicy, StatelessTokenPolicy, TokenPolicy};
pub use token_service::TokenService;
pub use update_user::{UpdateUserAccessInput, UpdateUserAccessUseCase};
