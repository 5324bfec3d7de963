//! Token Revocation Policy
//!
//! Tokens are self-contained, so logout is advisory unless a policy that
//! remembers revoked token IDs is installed.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use platform::clock::Clock;

use crate::domain::token::TokenClaims;

/// Revocation and rotation behavior for issued tokens
pub trait TokenPolicy: Send + Sync {
    /// Whether refresh replaces the presented refresh token with a new one
    fn rotates_refresh_tokens(&self) -> bool;

    /// Stop accepting the token before its natural expiry
    fn revoke(&self, claims: &TokenClaims);

    fn is_revoked(&self, claims: &TokenClaims) -> bool;

    /// Revoke the token and report whether this call was the one that did it
    ///
    /// A single-use token is accepted only when this returns `true`.
    fn consume(&self, claims: &TokenClaims) -> bool;
}

/// Nothing is ever revoked; tokens live until they expire
#[derive(Debug, Clone, Copy, Default)]
pub struct StatelessTokenPolicy;

impl TokenPolicy for StatelessTokenPolicy {
    fn rotates_refresh_tokens(&self) -> bool {
        false
    }

    fn revoke(&self, _claims: &TokenClaims) {}

    fn is_revoked(&self, _claims: &TokenClaims) -> bool {
        false
    }

    fn consume(&self, _claims: &TokenClaims) -> bool {
        true
    }
}

/// In-process denylist keyed by token ID
///
/// Entries are held until the token would have expired anyway. Refresh
/// tokens are rotated on every use.
pub struct DenylistTokenPolicy {
    revoked: DashMap<String, i64>,
    clock: Arc<dyn Clock>,
}

impl DenylistTokenPolicy {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            revoked: DashMap::new(),
            clock,
        }
    }

    /// Number of token IDs currently denied
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }

    fn purge_expired(&self, now: i64) {
        self.revoked.retain(|_, exp| *exp > now);
    }
}

impl TokenPolicy for DenylistTokenPolicy {
    fn rotates_refresh_tokens(&self) -> bool {
        true
    }

    fn revoke(&self, claims: &TokenClaims) {
        let now = self.clock.now().timestamp();
        self.purge_expired(now);
        if claims.exp > now {
            self.revoked.insert(claims.jti.clone(), claims.exp);
            tracing::debug!(kind = %claims.kind, "Token revoked");
        }
    }

    fn is_revoked(&self, claims: &TokenClaims) -> bool {
        self.revoked.contains_key(&claims.jti)
    }

    fn consume(&self, claims: &TokenClaims) -> bool {
        let now = self.clock.now().timestamp();
        self.purge_expired(now);
        if claims.exp <= now {
            return false;
        }
        match self.revoked.entry(claims.jti.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(claims.exp);
                tracing::debug!(kind = %claims.kind, "Token consumed");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::TokenKind;
    use chrono::{DateTime, Duration};
    use platform::clock::ManualClock;

    fn claims(jti: &str, exp: i64) -> TokenClaims {
        TokenClaims {
            sub: "sub".to_string(),
            username: None,
            role: None,
            email: None,
            kind: TokenKind::Refresh,
            iat: 0,
            exp,
            jti: jti.to_string(),
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(DateTime::from_timestamp(1_000, 0).unwrap()))
    }

    #[test]
    fn test_stateless_never_revokes() {
        let policy = StatelessTokenPolicy;
        let token = claims("a", 2_000);
        policy.revoke(&token);
        assert!(!policy.is_revoked(&token));
        assert!(!policy.rotates_refresh_tokens());
    }

    #[test]
    fn test_denylist_revokes_by_id() {
        let policy = DenylistTokenPolicy::new(clock());
        let revoked = claims("a", 2_000);
        let other = claims("b", 2_000);

        policy.revoke(&revoked);

        assert!(policy.is_revoked(&revoked));
        assert!(!policy.is_revoked(&other));
        assert!(policy.rotates_refresh_tokens());
    }

    #[test]
    fn test_denylist_forgets_expired_tokens() {
        let clock = clock();
        let policy = DenylistTokenPolicy::new(clock.clone());

        policy.revoke(&claims("short", 1_010));
        policy.revoke(&claims("long", 5_000));
        assert_eq!(policy.len(), 2);

        clock.advance(Duration::seconds(10));
        policy.revoke(&claims("another", 5_000));

        assert_eq!(policy.len(), 2);
        assert!(!policy.is_revoked(&claims("short", 1_010)));
        assert!(policy.is_revoked(&claims("long", 5_000)));
    }

    #[test]
    fn test_consume_succeeds_once() {
        let policy = DenylistTokenPolicy::new(clock());
        let token = claims("once", 2_000);

        assert!(policy.consume(&token));
        assert!(!policy.consume(&token));
        assert!(policy.is_revoked(&token));
    }

    #[test]
    fn test_consume_rejects_revoked_and_expired_tokens() {
        let policy = DenylistTokenPolicy::new(clock());
        let revoked = claims("revoked", 2_000);
        policy.revoke(&revoked);

        assert!(!policy.consume(&revoked));
        assert!(!policy.consume(&claims("stale", 1_000)));
        assert!(StatelessTokenPolicy.consume(&revoked));
    }

    #[test]
    fn test_already_expired_token_is_not_stored() {
        let policy = DenylistTokenPolicy::new(clock());
        policy.revoke(&claims("old", 500));
        assert!(policy.is_empty());
    }
}
