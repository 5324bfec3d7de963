//! Auth Middleware
//!
//! Bearer authentication, role gates and per-client throttling for
//! protected routes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::authenticate::{AuthenticateUseCase, AuthenticatedUser, authorize};
use crate::application::throttle::{Bucket, RateLimiter};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};
use crate::presentation::handlers::AuthAppState;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// ============================================================================
// Authentication
// ============================================================================

/// Middleware that requires a valid access token
///
/// On success the resolved [`AuthenticatedUser`] is attached to the request
/// extensions for downstream handlers.
pub async fn authenticate<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> AuthResult<Response>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let token = bearer_token(req.headers())
        .ok_or(AuthError::MissingToken)?
        .to_owned();

    let use_case =
        AuthenticateUseCase::new(state.repo.clone(), state.tokens.clone(), state.policy.clone());
    let user = use_case.execute(&token).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

// ============================================================================
// Authorization
// ============================================================================

/// Reject the request unless the authenticated user holds one of `allowed`
///
/// Must run after [`authenticate`].
pub async fn require_role(
    allowed: &'static [UserRole],
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    authorize(req.extensions().get::<AuthenticatedUser>(), allowed)?;
    Ok(next.run(req).await)
}

/// Admin-only gate
pub async fn require_admin(req: Request, next: Next) -> AuthResult<Response> {
    require_role(&[UserRole::Admin], req, next).await
}

// ============================================================================
// Rate Limiting
// ============================================================================

/// Throttle credential attempts (`login` bucket)
pub async fn login_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    throttle(&limiter, Bucket::Login, req, next).await
}

/// Throttle all traffic (`general` bucket)
pub async fn general_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    throttle(&limiter, Bucket::General, req, next).await
}

async fn throttle(
    limiter: &RateLimiter,
    bucket: Bucket,
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let identity = limiter.identify(req.headers(), peer);

    let result = limiter.check(bucket, &identity)?;

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        RATE_LIMIT_LIMIT,
        HeaderValue::from(limiter.config(bucket).max_requests),
    );
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(result.remaining));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
    }

    #[test]
    fn test_malformed_authorization() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&headers_with("Bearer   ")), None);
    }
}
