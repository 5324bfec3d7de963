//! User Password Value Object
//!
//! Domain wrapper over `platform::password`. Hashing and verification go
//! through a shared [`PasswordHasher`] so the work factor comes from
//! configuration.

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHasher, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is automatically zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password, enforcing the length policy
    ///
    /// Used on registration. Composition rules (mixed case, digits) are
    /// checked at the request boundary, not here.
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => AuthError::Validation(format!(
                "Password must be at least {} characters",
                min
            )),
            PasswordPolicyError::TooLong { max, .. } => AuthError::Validation(format!(
                "Password must be at most {} characters",
                max
            )),
            PasswordPolicyError::EmptyOrWhitespace => {
                AuthError::Validation("Password cannot be empty".to_string())
            }
            PasswordPolicyError::InvalidCharacter => {
                AuthError::Validation("Password contains invalid characters".to_string())
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a password presented at login, without policy checks
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn into_inner(self) -> ClearTextPassword {
        self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password in Argon2id PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password
    pub async fn from_raw(raw: RawPassword, hasher: &PasswordHasher) -> AuthResult<Self> {
        let hashed = hasher.hash(raw.into_inner()).await?;
        Ok(Self(hashed))
    }

    /// Create from PHC string (from database)
    ///
    /// A malformed stored hash is a data-integrity problem, not a client error.
    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".to_string()))?;

        Ok(Self(hashed))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash
    pub async fn verify(&self, raw: RawPassword, hasher: &PasswordHasher) -> AuthResult<bool> {
        Ok(hasher.verify(raw.into_inner(), &self.0).await?)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::PasswordConfig;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            work_factor: 1,
            memory_kib: 1024,
            pepper: None,
        })
        .unwrap()
    }

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("ValidPass123!".to_string()).is_ok());

        use platform::password::MIN_PASSWORD_LENGTH;
        let short_pass = "a".repeat(MIN_PASSWORD_LENGTH - 1);
        assert!(matches!(
            RawPassword::new(short_pass),
            Err(AuthError::Validation(_))
        ));

        assert!(RawPassword::new("".to_string()).is_err());
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = hasher();
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(raw, &hasher).await.unwrap();

        let good = RawPassword::for_login("TestPassword123!".to_string());
        assert!(hashed.verify(good, &hasher).await.unwrap());

        let bad = RawPassword::for_login("WrongPassword123!".to_string());
        assert!(!hashed.verify(bad, &hasher).await.unwrap());
    }

    #[tokio::test]
    async fn test_phc_string_roundtrip() {
        let hasher = hasher();
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(raw, &hasher).await.unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        let again = RawPassword::for_login("TestPassword123!".to_string());
        assert!(restored.verify(again, &hasher).await.unwrap());
    }

    #[test]
    fn test_corrupt_stored_hash_is_internal() {
        assert!(matches!(
            UserPassword::from_phc_string("garbage"),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));
    }
}
