//! Password Hashing and Verification
//!
//! Argon2id hashing with a configurable work factor:
//! - Salted, memory-hard one-way function
//! - Constant-time comparison (inside `argon2`)
//! - Zeroization of clear text on drop
//! - Optional application-wide pepper
//!
//! Hashing is CPU-bound, so the async entry points move the work onto
//! tokio's blocking pool instead of stalling the request executor.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::{PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Default Argon2id time cost
pub const DEFAULT_WORK_FACTOR: u32 = 12;

/// Default Argon2id memory cost in KiB (19 MiB, OWASP baseline)
pub const DEFAULT_MEMORY_KIB: u32 = 19_456;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains control characters
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
///
/// None of these are caused by a wrong password; a mismatch is `Ok(false)`.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored hash is not a parseable PHC string
    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Password hashing task failed: {0}")]
    TaskFailed(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`, and `Debug` output is redacted.
///
/// ## Examples
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("my_secure_password".to_string()).unwrap();
/// assert_eq!(format!("{password:?}"), "ClearTextPassword(\"[REDACTED]\")");
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password, enforcing the length policy
    ///
    /// - At least [`MIN_PASSWORD_LENGTH`] code points
    /// - At most [`MAX_PASSWORD_LENGTH`] code points
    /// - No control characters other than space, tab and newline
    ///
    /// Unicode is normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Code points, not bytes
        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// Wrap a password presented for verification
    ///
    /// No policy is applied: a stored hash may predate the current policy,
    /// and rejecting at this point would reveal the policy to a guesser.
    /// The input is normalized the same way [`ClearTextPassword::new`] does.
    pub fn for_verification(raw: String) -> Self {
        Self(raw.nfkc().collect())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string carries algorithm, version, parameters and salt, so a
/// hash stays verifiable after the configured work factor changes.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Password hashing configuration
#[derive(Clone)]
pub struct PasswordConfig {
    /// Argon2id time cost (iterations); higher is slower and stronger
    pub work_factor: u32,
    /// Argon2id memory cost in KiB
    pub memory_kib: u32,
    /// Appended to every password before hashing
    pub pepper: Option<Vec<u8>>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            memory_kib: DEFAULT_MEMORY_KIB,
            pepper: None,
        }
    }
}

impl fmt::Debug for PasswordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordConfig")
            .field("work_factor", &self.work_factor)
            .field("memory_kib", &self.memory_kib)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Argon2id hasher bound to a [`PasswordConfig`]
///
/// Cheap to clone. Holds a precomputed dummy hash so callers can spend one
/// full verification even when there is no stored hash to check against.
#[derive(Clone)]
pub struct PasswordHasher {
    inner: Arc<HasherInner>,
}

struct HasherInner {
    argon2: Argon2<'static>,
    pepper: Option<Vec<u8>>,
    dummy: HashedPassword,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordHashError> {
        let params = Params::new(config.memory_kib, config.work_factor, 1, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut inner = HasherInner {
            argon2,
            pepper: config.pepper.clone(),
            dummy: HashedPassword {
                hash: String::new(),
            },
        };
        let dummy_input = ClearTextPassword(SaltString::generate(&mut OsRng).to_string());
        inner.dummy = inner.hash_blocking(&dummy_input)?;

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(
        &self,
        password: ClearTextPassword,
    ) -> Result<HashedPassword, PasswordHashError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.hash_blocking(&password))
            .await
            .map_err(|e| PasswordHashError::TaskFailed(e.to_string()))?
    }

    /// Verify a password against a stored hash
    ///
    /// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed
    /// or the computation itself failed.
    pub async fn verify(
        &self,
        password: ClearTextPassword,
        hashed: &HashedPassword,
    ) -> Result<bool, PasswordHashError> {
        let inner = Arc::clone(&self.inner);
        let hashed = hashed.clone();
        tokio::task::spawn_blocking(move || inner.verify_blocking(&password, &hashed))
            .await
            .map_err(|e| PasswordHashError::TaskFailed(e.to_string()))?
    }

    /// Spend one verification against the dummy hash and discard the outcome
    pub async fn verify_dummy(&self, password: ClearTextPassword) {
        let dummy = self.inner.dummy.clone();
        if let Err(e) = self.verify(password, &dummy).await {
            tracing::warn!(error = %e, "Dummy password verification failed");
        }
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.inner.argon2.params())
            .finish_non_exhaustive()
    }
}

impl HasherInner {
    fn peppered(&self, password: &ClearTextPassword) -> Vec<u8> {
        let mut bytes = password.as_bytes().to_vec();
        if let Some(pepper) = &self.pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }

    fn hash_blocking(
        &self,
        password: &ClearTextPassword,
    ) -> Result<HashedPassword, PasswordHashError> {
        let mut bytes = self.peppered(password);
        let salt = SaltString::generate(&mut OsRng);

        let result = self
            .argon2
            .hash_password(&bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        bytes.zeroize();
        result
    }

    fn verify_blocking(
        &self,
        password: &ClearTextPassword,
        hashed: &HashedPassword,
    ) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(&hashed.hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        let mut bytes = self.peppered(password);

        // Parameters come from the PHC string, not from `self.argon2`
        let result = match self.argon2.verify_password(&bytes, &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordHashError::HashingFailed(e.to_string())),
        };

        bytes.zeroize();
        result
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> PasswordConfig {
        PasswordConfig {
            work_factor: 1,
            memory_kib: 1024,
            pepper: None,
        }
    }

    fn clear(s: &str) -> ClearTextPassword {
        ClearTextPassword::for_verification(s.to_string())
    }

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        let result = ClearTextPassword::new(long_password);
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("abc\u{0007}defgh".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_eight_characters_is_enough() {
        assert!(ClearTextPassword::new("abcdefgh".to_string()).is_ok());
    }

    #[test]
    fn test_unicode_password() {
        let result = ClearTextPassword::new("パスワード安全です!".to_string());
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let config = PasswordConfig {
            work_factor: 0,
            ..fast_config()
        };
        assert!(matches!(
            PasswordHasher::new(&config),
            Err(PasswordHashError::InvalidParams(_))
        ));
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let hashed = hasher.hash(clear("TestPassword123!")).await.unwrap();

        assert!(hasher.verify(clear("TestPassword123!"), &hashed).await.unwrap());
        assert!(!hasher.verify(clear("WrongPassword123!"), &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let a = hasher.hash(clear("TestPassword123!")).await.unwrap();
        let b = hasher.hash(clear("TestPassword123!")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_work_factor_is_encoded_in_hash() {
        let config = PasswordConfig {
            work_factor: 3,
            ..fast_config()
        };
        let hasher = PasswordHasher::new(&config).unwrap();
        let hashed = hasher.hash(clear("TestPassword123!")).await.unwrap();

        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
        assert!(hashed.as_phc_string().contains("t=3"));
    }

    #[tokio::test]
    async fn test_hash_with_pepper() {
        let peppered = PasswordHasher::new(&PasswordConfig {
            pepper: Some(b"my_secret_pepper".to_vec()),
            ..fast_config()
        })
        .unwrap();
        let plain = PasswordHasher::new(&fast_config()).unwrap();

        let hashed = peppered.hash(clear("TestPassword123!")).await.unwrap();

        assert!(peppered.verify(clear("TestPassword123!"), &hashed).await.unwrap());
        assert!(!plain.verify(clear("TestPassword123!"), &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_an_error() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let corrupt = HashedPassword {
            hash: "not_a_valid_hash".to_string(),
        };

        let result = hasher.verify(clear("whatever123"), &corrupt).await;
        assert!(matches!(result, Err(PasswordHashError::InvalidHashFormat)));
    }

    #[tokio::test]
    async fn test_phc_string_roundtrip() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        let hashed = hasher.hash(clear("TestPassword123!")).await.unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(hasher.verify(clear("TestPassword123!"), &restored).await.unwrap());
    }

    #[test]
    fn test_invalid_phc_string() {
        let result = HashedPassword::from_phc_string("not_a_valid_hash");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_verify_dummy_completes() {
        let hasher = PasswordHasher::new(&fast_config()).unwrap();
        hasher.verify_dummy(clear("anything")).await;
    }

    #[test]
    fn test_debug_redaction() {
        let password = clear("secret");
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }
}
