//! Access token claims.
//!
//! The claims carry a snapshot of the identity taken at issuance. Renaming a
//! nurse or changing their NIP does not touch tokens that were already issued;
//! the new values only show up once the holder logs in again.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Identity, Role};

/// Identity snapshot embedded under the `user` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsUser {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub nip: String,
    pub name: String,
    pub role: Role,
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub user: ClaimsUser,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Not before (unix timestamp).
    pub nbf: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl From<&Identity> for ClaimsUser {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.id,
            nip: identity.nip.clone(),
            name: identity.name.clone(),
            role: identity.role,
        }
    }
}

impl From<ClaimsUser> for Identity {
    fn from(user: ClaimsUser) -> Self {
        Self {
            id: user.user_id,
            nip: user.nip,
            name: user.name,
            role: user.role,
        }
    }
}
