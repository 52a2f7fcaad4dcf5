//! The process-wide set of configured signing keys.
//!
//! A [`KeyStore`] holds one or more [`SigningKey`] entries in configuration
//! order plus the [`TokenSettings`] claim constraints, and is the object
//! application code calls for signing and verification. It is built once at
//! startup (see [`resolve`](crate::config::resolve)) and immutable after,
//! so concurrent calls need no coordination.
//!
//! Construction enforces the store invariants: at least one entry, and —
//! for multi-key stores — a non-empty unique id on every entry, since
//! verification selects keys by the token header's `kid`.

use std::collections::HashSet;

use jsonwebtoken::decode_header;

use crate::{
    claims::Claims,
    config::TokenSettings,
    error::{ConfigError, TokenError},
    signing_key::SigningKey,
};

/// An immutable, ordered collection of signing keys.
///
/// `Debug` output lists key ids and algorithms only; key material never
/// renders.
#[derive(Clone, Debug)]
pub struct KeyStore {
    entries: Vec<SigningKey>,
    settings: TokenSettings,
}

impl KeyStore {
    /// Builds a store, validating the multi-key id invariants.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyKeyArray`] when `entries` is empty.
    /// - [`ConfigError::MissingId`] when a multi-key store has an entry
    ///   without a non-empty id.
    /// - [`ConfigError::DuplicateKeyId`] when two entries share an id.
    pub fn new(entries: Vec<SigningKey>, settings: TokenSettings) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyKeyArray);
        }
        if entries.len() > 1 {
            let mut seen = HashSet::new();
            for (index, key) in entries.iter().enumerate() {
                let kid = key
                    .kid()
                    .filter(|kid| !kid.is_empty())
                    .ok_or_else(|| ConfigError::missing_id(index))?;
                if !seen.insert(kid.to_owned()) {
                    return Err(ConfigError::duplicate_key_id(kid));
                }
            }
        }
        Ok(Self { entries, settings })
    }

    /// Number of configured keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; construction rejects empty stores.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The claim constraints applied by [`sign`](Self::sign) and
    /// [`verify`](Self::verify).
    #[must_use]
    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// The key used to mint new tokens: the first sign-capable entry in
    /// configuration order.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSignableKey`] when every entry is verify-only.
    pub fn signing_key(&self) -> Result<&SigningKey, ConfigError> {
        self.entries.iter().find(|key| key.can_sign()).ok_or(ConfigError::NoSignableKey)
    }

    /// Selects the verification key for a token header's `kid`.
    ///
    /// A single-key store resolves an absent `kid` to its only entry, and a
    /// sole *anonymous* entry also serves any supplied `kid` — ids exist to
    /// disambiguate multi-key stores, so a single-secret deployment
    /// verifies tokens regardless of what id their headers carry. A
    /// multi-key store fails closed on an absent `kid` rather than guessing
    /// an entry.
    ///
    /// # Errors
    ///
    /// [`TokenError::UnknownKeyId`] when no entry matches the supplied
    /// `kid` (and the sole-anonymous-entry fallback does not apply), or
    /// when the `kid` is absent and the store holds more than one key.
    pub fn resolve(&self, kid: Option<&str>) -> Result<&SigningKey, TokenError> {
        match kid {
            Some(kid) => {
                if let Some(key) = self.entries.iter().find(|key| key.kid() == Some(kid)) {
                    return Ok(key);
                }
                if let [only] = self.entries.as_slice()
                    && only.kid().is_none()
                {
                    return Ok(only);
                }
                Err(TokenError::unknown_key_id(Some(kid)))
            },
            None if self.entries.len() == 1 => Ok(&self.entries[0]),
            None => Err(TokenError::unknown_key_id(None::<&str>)),
        }
    }

    /// Signs `claims` with the store's signing key under the configured
    /// settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSignableKey`], or any signing failure from
    /// [`SigningKey::sign`].
    pub fn sign(&self, claims: Claims) -> Result<String, ConfigError> {
        self.signing_key()?.sign(claims, &self.settings)
    }

    /// Verifies `token`, selecting the key by the token header's `kid`.
    ///
    /// # Errors
    ///
    /// [`TokenError::Malformed`] when the header does not decode,
    /// [`TokenError::UnknownKeyId`] when no configured key matches, or any
    /// verification failure from [`SigningKey::verify`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token)?;
        let key = self.resolve(header.kid.as_deref())?;
        tracing::debug!(
            kid = key.kid().unwrap_or("<unnamed>"),
            "selected verification key"
        );
        key.verify(token, &self.settings)
    }
}
