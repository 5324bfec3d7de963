//! Rate Limiter
//!
//! Two named buckets over one sliding-window store: `login` for credential
//! attempts and `general` for every request.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use platform::client::{ClientIdentityResolver, ForwardedForResolver};
use platform::clock::Clock;
use platform::rate_limit::{
    InMemoryRateLimitStore, RateLimitConfig, RateLimitResult, RateLimitStore, RateLimitSweeper,
};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Rate limit bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Login,
    General,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Login => "login",
            Bucket::General => "general",
        }
    }
}

/// Per-client request throttle
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    resolver: Arc<dyn ClientIdentityResolver>,
    login: RateLimitConfig,
    general: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn RateLimitStore>,
        resolver: Arc<dyn ClientIdentityResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            resolver,
            login: config.login_rate_limit(),
            general: config.general_rate_limit(),
        }
    }

    /// In-memory store keyed by forwarded-for address
    pub fn in_memory(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryRateLimitStore::new()),
            Arc::new(ForwardedForResolver),
            clock,
        )
    }

    /// Client identity for a request
    pub fn identify(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> String {
        self.resolver.resolve(headers, peer)
    }

    pub fn config(&self, bucket: Bucket) -> &RateLimitConfig {
        match bucket {
            Bucket::Login => &self.login,
            Bucket::General => &self.general,
        }
    }

    /// Count one request against `bucket` for `identity`
    ///
    /// Returns `RateLimitExceeded` once the bucket ceiling is reached inside
    /// the window. Rejected requests do not extend the lockout.
    pub fn check(&self, bucket: Bucket, identity: &str) -> AuthResult<RateLimitResult> {
        let key = format!("{}:{}", bucket.as_str(), identity);
        let now_ms = self.clock.now_ms();
        let result = self
            .store
            .check_and_record(&key, self.config(bucket), now_ms);

        if result.allowed {
            Ok(result)
        } else {
            tracing::warn!(bucket = bucket.as_str(), client = %identity, "Rate limit exceeded");
            Err(AuthError::RateLimitExceeded {
                retry_after_secs: result.retry_after_secs(now_ms),
            })
        }
    }

    /// Start evicting idle keys every `interval`
    pub fn start_sweeper(&self, interval: Duration) -> RateLimitSweeper {
        let window = self.login.window.max(self.general.window);
        RateLimitSweeper::start(self.store.clone(), self.clock.clone(), window, interval)
    }
}
