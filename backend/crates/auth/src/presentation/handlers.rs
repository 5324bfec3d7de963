//! HTTP Handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;

use platform::client::{ClientIdentityResolver, ForwardedForResolver};
use platform::clock::{Clock, SystemClock};
use platform::password::PasswordHasher;
use platform::rate_limit::{InMemoryRateLimitStore, RateLimitStore};

use crate::application::config::AuthConfig;
use crate::application::{
    AuthenticatedUser, RateLimiter, RefreshUseCase, SignInInput, SignInUseCase, SignOutInput,
    SignOutUseCase, SignUpInput, SignUpUseCase, StatelessTokenPolicy, TokenPolicy, TokenService,
    UpdateUserAccessInput, UpdateUserAccessUseCase,
};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, LogoutRequest, MessageResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, RegisterResponse, TokenPair, UpdateUserRequest, UserEnvelope, UserResponse,
};
use crate::presentation::middleware::bearer_token;

// ============================================================================
// State
// ============================================================================

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub hasher: PasswordHasher,
    pub tokens: Arc<TokenService>,
    pub policy: Arc<dyn TokenPolicy>,
    pub limiter: Arc<RateLimiter>,
    pub clock: Arc<dyn Clock>,
}

impl<R> AuthAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    /// State with the wall clock, stateless tokens and in-memory throttling
    pub fn new(repo: R, config: AuthConfig) -> AuthResult<Self> {
        Self::builder(repo, config).build()
    }

    pub fn builder(repo: R, config: AuthConfig) -> AuthAppStateBuilder<R> {
        AuthAppStateBuilder {
            repo,
            config,
            clock: Arc::new(SystemClock),
            policy: Arc::new(StatelessTokenPolicy),
            rate_limit_store: Arc::new(InMemoryRateLimitStore::new()),
            resolver: Arc::new(ForwardedForResolver),
        }
    }
}

/// Overrides for the pluggable parts of [`AuthAppState`]
pub struct AuthAppStateBuilder<R> {
    repo: R,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
    policy: Arc<dyn TokenPolicy>,
    rate_limit_store: Arc<dyn RateLimitStore>,
    resolver: Arc<dyn ClientIdentityResolver>,
}

impl<R> AuthAppStateBuilder<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn token_policy(mut self, policy: Arc<dyn TokenPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn rate_limit_store(mut self, store: Arc<dyn RateLimitStore>) -> Self {
        self.rate_limit_store = store;
        self
    }

    pub fn client_resolver(mut self, resolver: Arc<dyn ClientIdentityResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn build(self) -> AuthResult<AuthAppState<R>> {
        let hasher = PasswordHasher::new(&self.config.password)?;
        let tokens = Arc::new(TokenService::new(&self.config, self.clock.clone()));
        let limiter = Arc::new(RateLimiter::new(
            &self.config,
            self.rate_limit_store,
            self.resolver,
            self.clock.clone(),
        ));

        Ok(AuthAppState {
            repo: Arc::new(self.repo),
            config: Arc::new(self.config),
            hasher,
            tokens,
            policy: self.policy,
            limiter,
            clock: self.clock,
        })
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<LoginResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            user_name: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        user: UserResponse::from(&output.user),
        tokens: TokenPair {
            access: output.access_token,
            refresh: output.refresh_token,
        },
    }))
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<RegisterResponse>)>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload?;
    req.validate()?;

    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.clock.clone(),
    );

    let user = use_case
        .execute(SignUpInput {
            user_name: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User created".to_string(),
            user: UserResponse::from(&user),
        }),
    ))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AuthResult<Json<RefreshResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload?;

    let use_case =
        RefreshUseCase::new(state.repo.clone(), state.tokens.clone(), state.policy.clone());
    let output = use_case.execute(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        success: true,
        access_token: output.access_token,
        refresh_token: output.refresh_token,
    }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Always 200. The body is optional and read leniently.
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<MessageResponse>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let req: LogoutRequest = serde_json::from_slice(&body).unwrap_or_default();

    let use_case = SignOutUseCase::new(state.tokens.clone(), state.policy.clone());
    use_case.execute(SignOutInput {
        access_token: bearer_token(&headers).map(str::to_owned),
        refresh_token: req.refresh_token,
    });

    Json(MessageResponse {
        success: true,
        message: "Logged out successfully".to_string(),
    })
}

// ============================================================================
// Current User (requires authentication)
// ============================================================================

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<UserEnvelope> {
    Json(UserEnvelope {
        user: UserResponse::from(&user),
    })
}

// ============================================================================
// User Access (requires admin)
// ============================================================================

/// PATCH /api/auth/users/{user_id}
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AuthResult<Json<UserEnvelope>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let user_id = user_id
        .parse()
        .map_err(|_| AuthError::Validation("Invalid user id".to_string()))?;
    let Json(req) = payload?;

    let use_case = UpdateUserAccessUseCase::new(state.repo.clone(), state.clock.clone());
    let user = use_case
        .execute(UpdateUserAccessInput {
            user_id,
            role: req.role,
            is_active: req.is_active,
        })
        .await?;

    Ok(Json(UserEnvelope {
        user: UserResponse::from(&user),
    }))
}
