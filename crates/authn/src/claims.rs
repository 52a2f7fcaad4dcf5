//! Token claims.
//!
//! [`Claims`] is the payload carried by every Lantern token: the standard
//! registered claims the verifier enforces (`exp`, `aud`, optionally `iss`)
//! plus any application-specific claims, which ride along untyped in the
//! flattened `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims embedded in a signed token.
///
/// Call sites construct this with [`Claims::new`] and optionally attach
/// application claims; [`KeyStore::sign`](crate::KeyStore::sign) stamps
/// `iss`, `aud`, `iat`, and `exp` from the configured
/// [`TokenSettings`](crate::config::TokenSettings) before encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the authenticated principal (e.g. a user id).
    pub sub: String,
    /// Issuer. Present only when the deployment configures one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience — the application name tokens are scoped to.
    pub aud: String,
    /// Expiration time (seconds since epoch).
    pub exp: u64,
    /// Issued at (seconds since epoch).
    pub iat: u64,
    /// Application-specific claims, preserved verbatim through sign/verify.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Creates claims for the given subject.
    ///
    /// Registered claims (`aud`, `exp`, `iat`) are left empty/zero; the
    /// signing path fills them in. Verified tokens always carry them.
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            iss: None,
            aud: String::new(),
            exp: 0,
            iat: 0,
            extra: Map::new(),
        }
    }

    /// Attaches one application-specific claim.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}
