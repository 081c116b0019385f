//! Access token issuing and verification (HS256, shared secret).

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info, warn};

use super::{AuthError, AuthFailure};
use crate::models::auth::{AccessTokenClaims, ClaimsUser};
use crate::models::user::Identity;

/// Default access token lifetime: 8 hours.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 8 * 60 * 60;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: AccessTokenClaims,
}

/// Signs and verifies access tokens with a single shared secret loaded at
/// process start.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    has_key: bool,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
            has_key: !secret.is_empty(),
        }
    }

    /// Configured token lifetime.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign a token for `identity`, valid from now for the configured lifetime.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        if !self.has_key {
            return Err(AuthError::TokenError("signing key unavailable".into()));
        }

        let claims = AccessTokenClaims {
            user: ClaimsUser::from(identity),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and the `nbf`..`exp` window, returning the claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthFailure> {
        if !self.has_key {
            warn!("token verification attempted without a signing key");
            return Err(AuthFailure::BadSignature);
        }

        decode::<AccessTokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let failure = classify(e.kind());
                debug!(reason = %failure, "access token rejected");
                failure
            })
    }
}

fn classify(kind: &ErrorKind) -> AuthFailure {
    match kind {
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => AuthFailure::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthFailure::BadSignature,
        _ => AuthFailure::Malformed,
    }
}

/// Resolve the JWT secret: explicit value → persisted file → newly generated.
pub fn resolve_jwt_secret(explicit: Option<&str>) -> String {
    if let Some(secret) = explicit
        && !secret.is_empty()
    {
        return secret.to_string();
    }
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("halo")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use uuid::Uuid;

    fn nurse() -> Identity {
        Identity {
            id: Uuid::now_v7(),
            nip: "3031200101234".into(),
            name: "Nurse Joy".into(),
            role: Role::Nurse,
        }
    }

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(secret.as_bytes(), Duration::hours(1))
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let issuer = issuer("test-secret");
        let issued = issuer.issue(&nurse()).unwrap();
        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.user.role, Role::Nurse);
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn other_secret_is_bad_signature() {
        let issued = issuer("secret-a").issue(&nurse()).unwrap();
        assert_eq!(
            issuer("secret-b").verify(&issued.token),
            Err(AuthFailure::BadSignature)
        );
    }

    #[test]
    fn past_expiry_is_expired() {
        let issuer = issuer("test-secret");
        let issued = issuer
            .issue_at(&nurse(), Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(issuer.verify(&issued.token), Err(AuthFailure::Expired));
    }

    #[test]
    fn future_not_before_is_rejected_as_outside_window() {
        let issuer = issuer("test-secret");
        let issued = issuer
            .issue_at(&nurse(), Utc::now() + Duration::minutes(5))
            .unwrap();
        assert_eq!(issuer.verify(&issued.token), Err(AuthFailure::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            issuer("test-secret").verify("not.a.jwt"),
            Err(AuthFailure::Malformed)
        );
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let issuer = TokenIssuer::new(b"", Duration::hours(1));
        assert!(matches!(
            issuer.issue(&nurse()),
            Err(AuthError::TokenError(_))
        ));
    }

    #[test]
    fn explicit_secret_wins() {
        assert_eq!(resolve_jwt_secret(Some("from-config")), "from-config");
    }
}
