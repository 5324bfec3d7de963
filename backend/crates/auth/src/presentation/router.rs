//! Auth Router

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};

use crate::domain::repository::UserRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{authenticate, login_rate_limit, require_admin};

/// Create the Auth router for any repository implementation
///
/// The `general` throttle is not applied here; wrap the whole API with
/// [`general_rate_limit`](crate::presentation::middleware::general_rate_limit).
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let login = Router::new()
        .route("/login", post(handlers::login::<R>))
        .route_layer(from_fn_with_state(state.limiter.clone(), login_rate_limit));

    let admin = Router::new()
        .route("/users/{user_id}", patch(handlers::update_user::<R>))
        .route_layer(from_fn(require_admin));

    let protected = Router::new()
        .route("/me", get(handlers::me))
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), authenticate::<R>));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .merge(login)
        .merge(protected)
        .with_state(state)
}
