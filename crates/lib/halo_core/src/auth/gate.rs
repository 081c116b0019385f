//! Per-request auth gate and role guard.
//!
//! [`Authenticator::authenticate`] resolves an `Authorization` header to an
//! [`Identity`]:
//!
//! ```text
//! no token ─────────────────────────────────────────────► MissingToken
//! token ─► cache hit ───────────────────────────────────► Identity
//!       └► cache miss ─► verify ─► invalid ─────────────► Expired | BadSignature | Malformed
//!                               └► valid ─► cache put ──► Identity
//! ```
//!
//! A cache hit never re-checks the signature. Entries are only inserted with
//! a TTL of `exp − now − margin`, so a hit cannot outlive the token.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use super::cache::TokenCache;
use super::jwt::TokenIssuer;
use super::{AuthError, AuthFailure, Forbidden};
use crate::models::user::{Identity, Role};

/// Default safety margin subtracted from a token's remaining lifetime before
/// it is trusted in the cache.
pub const DEFAULT_SAFETY_MARGIN_SECS: i64 = 60;

/// Token issuer, verifier, and cache, wired together.
#[derive(Clone)]
pub struct Authenticator {
    issuer: TokenIssuer,
    cache: Arc<TokenCache>,
    margin: Duration,
}

impl Authenticator {
    /// A negative `margin` is treated as zero: cached entries must expire no
    /// later than the token itself.
    pub fn new(issuer: TokenIssuer, cache: Arc<TokenCache>, margin: Duration) -> Self {
        Self {
            issuer,
            cache,
            margin: margin.max(Duration::zero()),
        }
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Issue a token for a freshly authenticated identity and cache it.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let issued = self.issuer.issue(identity)?;
        self.remember(&issued.token, identity.clone(), issued.claims.exp);
        Ok(issued.token)
    }

    /// Resolve the identity behind an `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, AuthFailure> {
        let token = bearer_token(authorization)?;

        if let Some(identity) = self.cache.get(token) {
            debug!(user_id = %identity.id, "token cache hit");
            return Ok(identity);
        }

        let claims = self.issuer.verify(token)?;
        let identity = Identity::from(claims.user);
        self.remember(token, identity.clone(), claims.exp);
        debug!(user_id = %identity.id, "token verified");
        Ok(identity)
    }

    fn remember(&self, token: &str, identity: Identity, exp: i64) {
        let ttl = Duration::seconds(exp - Utc::now().timestamp()) - self.margin;
        self.cache.put(token, identity, ttl);
    }
}

/// Extract the token from a `Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthFailure> {
    let header = authorization
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(AuthFailure::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::Malformed)?
        .trim();

    if token.is_empty() {
        return Err(AuthFailure::MissingToken);
    }
    Ok(token)
}

/// Role guard: succeeds iff the identity holds `required`.
pub fn authorize(identity: &Identity, required: Role) -> Result<(), Forbidden> {
    if identity.role == required {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn identity(nip: &str, role: Role) -> Identity {
        Identity {
            id: Uuid::now_v7(),
            nip: nip.into(),
            name: "Staff Member".into(),
            role,
        }
    }

    fn authenticator(secret: &str, cache: Arc<TokenCache>) -> Authenticator {
        Authenticator::new(
            TokenIssuer::new(secret.as_bytes(), Duration::hours(1)),
            cache,
            Duration::seconds(DEFAULT_SAFETY_MARGIN_SECS),
        )
    }

    fn header(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn missing_header_is_missing_token() {
        let auth = authenticator("s", Arc::new(TokenCache::new()));
        assert_eq!(auth.authenticate(None), Err(AuthFailure::MissingToken));
        assert_eq!(auth.authenticate(Some("  ")), Err(AuthFailure::MissingToken));
        assert_eq!(
            auth.authenticate(Some("Bearer ")),
            Err(AuthFailure::MissingToken)
        );
    }

    #[test]
    fn non_bearer_scheme_is_malformed() {
        let auth = authenticator("s", Arc::new(TokenCache::new()));
        assert_eq!(
            auth.authenticate(Some("Basic abc")),
            Err(AuthFailure::Malformed)
        );
    }

    #[test]
    fn verified_token_is_cached_and_repeat_skips_verification() {
        let cache = Arc::new(TokenCache::new());
        let signer = authenticator("right-secret", Arc::clone(&cache));
        let issued = signer
            .issuer()
            .issue(&identity("3031200101234", Role::Nurse))
            .unwrap();

        let first = signer.authenticate(Some(&header(&issued.token))).unwrap();
        assert_eq!(first.role, Role::Nurse);
        assert_eq!(cache.len(), 1);

        // Same cache, wrong key: only a cache hit can succeed here.
        let wrong_key = authenticator("wrong-secret", Arc::clone(&cache));
        let second = wrong_key
            .authenticate(Some(&header(&issued.token)))
            .unwrap();
        assert_eq!(first, second);

        // Without the cache the wrong key fails verification.
        let cold = authenticator("wrong-secret", Arc::new(TokenCache::new()));
        assert_eq!(
            cold.authenticate(Some(&header(&issued.token))),
            Err(AuthFailure::BadSignature)
        );
    }

    #[test]
    fn login_path_issues_and_caches() {
        let cache = Arc::new(TokenCache::new());
        let auth = authenticator("secret", Arc::clone(&cache));
        let nurse = identity("3031200101234", Role::Nurse);

        let token = auth.issue(&nurse).unwrap();
        let claims = auth.issuer().verify(&token).unwrap();
        assert_eq!(claims.user.role, Role::Nurse);
        assert_eq!(cache.get(&token), Some(nurse.clone()));

        // Presented again straight away: served from cache, same identity.
        let other_key = authenticator("unrelated", Arc::clone(&cache));
        assert_eq!(other_key.authenticate(Some(&header(&token))), Ok(nurse));
    }

    #[test]
    fn expired_token_fails_regardless_of_cache() {
        let cache = Arc::new(TokenCache::new());
        let auth = authenticator("secret", Arc::clone(&cache));
        let it = identity("6151200101234", Role::It);

        // A live token for the same identity sits in the cache.
        auth.issue(&it).unwrap();

        let stale = auth
            .issuer()
            .issue_at(&it, Utc::now() - Duration::hours(3))
            .unwrap();
        assert_eq!(
            auth.authenticate(Some(&header(&stale.token))),
            Err(AuthFailure::Expired)
        );
        assert!(cache.get(&stale.token).is_none());
    }

    #[test]
    fn token_inside_safety_margin_is_valid_but_not_cached() {
        let cache = Arc::new(TokenCache::new());
        let auth = authenticator("secret", Arc::clone(&cache));
        // Expires in ~30s, below the 60s margin.
        let issued = auth
            .issuer()
            .issue_at(
                &identity("6151200101234", Role::It),
                Utc::now() - Duration::hours(1) + Duration::seconds(30),
            )
            .unwrap();

        assert!(auth.authenticate(Some(&header(&issued.token))).is_ok());
        assert!(cache.is_empty());
    }

    #[test]
    fn negative_margin_cannot_extend_cached_identity_past_expiry() {
        let cache = Arc::new(TokenCache::new());
        let auth = Authenticator::new(
            TokenIssuer::new(b"secret", Duration::seconds(2)),
            Arc::clone(&cache),
            Duration::seconds(-3600),
        );

        let token = auth.issue(&identity("6151200101234", Role::It)).unwrap();
        std::thread::sleep(std::time::Duration::from_secs(3));

        assert!(auth.issuer().verify(&token).is_err());
        assert_eq!(
            auth.authenticate(Some(&header(&token))),
            Err(AuthFailure::Expired)
        );
        assert!(cache.get(&token).is_none());
    }

    #[test]
    fn authorize_matches_role_exactly() {
        let nurse = identity("3031200101234", Role::Nurse);
        let it = identity("6151200101234", Role::It);
        assert_eq!(authorize(&nurse, Role::It), Err(Forbidden));
        assert_eq!(authorize(&nurse, Role::Nurse), Ok(()));
        assert_eq!(authorize(&it, Role::It), Ok(()));
        assert_eq!(authorize(&it, Role::Nurse), Err(Forbidden));
    }
}
