//! Application Configuration
//!
//! Configuration for the Auth application layer, read from environment
//! variables with defaults for everything except the signing secret in
//! release builds.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use platform::password::{DEFAULT_MEMORY_KIB, DEFAULT_WORK_FACTOR, PasswordConfig};
use platform::rate_limit::RateLimitConfig;
use thiserror::Error;

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Configuration errors (startup only)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakSecret,
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 token signing secret
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Password hashing cost and pepper
    pub password: PasswordConfig,
    /// Window shared by both rate limit buckets
    pub rate_limit_window: Duration,
    /// Ceiling for the `general` bucket
    pub general_max_requests: u32,
    /// Ceiling for the `login` bucket
    pub login_max_attempts: u32,
    /// Idle-key sweep interval; `None` disables the sweeper
    pub sweep_interval: Option<Duration>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(24 * 3600), // 24 hours
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            password: PasswordConfig::default(),
            rate_limit_window: Duration::from_secs(15 * 60),
            general_max_requests: 100,
            login_max_attempts: 5,
            sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password", &self.password)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("general_max_requests", &self.general_max_requests)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

impl AuthConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.len() >= MIN_SECRET_LENGTH => secret.into_bytes(),
            Some(_) => return Err(ConfigError::WeakSecret),
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using a random secret for this process");
                random_secret()
            }
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let sweep_secs: u64 = parse_or(&lookup, "RATE_LIMIT_SWEEP_SECS", 60)?;

        Ok(Self {
            jwt_secret,
            access_token_ttl: Duration::from_secs(parse_or(
                &lookup,
                "ACCESS_TOKEN_TTL_SECS",
                defaults.access_token_ttl.as_secs(),
            )?),
            refresh_token_ttl: Duration::from_secs(parse_or(
                &lookup,
                "REFRESH_TOKEN_TTL_SECS",
                defaults.refresh_token_ttl.as_secs(),
            )?),
            password: PasswordConfig {
                work_factor: parse_or(&lookup, "PASSWORD_WORK_FACTOR", DEFAULT_WORK_FACTOR)?,
                memory_kib: parse_or(&lookup, "PASSWORD_MEMORY_KIB", DEFAULT_MEMORY_KIB)?,
                pepper: lookup("PASSWORD_PEPPER")
                    .filter(|p| !p.is_empty())
                    .map(String::into_bytes),
            },
            rate_limit_window: Duration::from_secs(parse_or(
                &lookup,
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window.as_secs(),
            )?),
            general_max_requests: parse_or(
                &lookup,
                "RATE_LIMIT_GENERAL_MAX",
                defaults.general_max_requests,
            )?,
            login_max_attempts: parse_or(
                &lookup,
                "RATE_LIMIT_LOGIN_MAX",
                defaults.login_max_attempts,
            )?,
            sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
        })
    }

    /// `login` bucket limits
    pub fn login_rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.login_max_attempts,
            window: self.rate_limit_window,
        }
    }

    /// `general` bucket limits
    pub fn general_rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.general_max_requests,
            window: self.rate_limit_window,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn random_secret() -> Vec<u8> {
    use rand::RngCore;
    let mut secret = vec![0u8; MIN_SECRET_LENGTH];
    rand::rng().fill_bytes(&mut secret);
    secret
}
