//! Startup configuration and key-store resolution.
//!
//! [`resolve`] is the single entry point: it runs exactly once at process
//! start, turns static configuration values into a [`KeyStore`], and fails
//! with a [`ConfigError`] when the process cannot safely sign or verify its
//! own tokens. There is no reconfiguration path; key changes mean building
//! a new store and swapping the process-wide reference.
//!
//! Resolution precedence:
//!
//! 1. `secrets` — a JSON array of key specs, one [`SigningKey`](crate::SigningKey) each.
//! 2. `secret` — a single key: the raw string as an HMAC secret for
//!    symmetric algorithms, or a JSON `{public, private?}` object for
//!    asymmetric ones.
//! 3. Neither — the test environment fabricates one fixed well-known HS256
//!    key so suites run deterministically; every other environment fails
//!    [`ConfigError::MissingSigningKey`].

use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::Deserialize;

use crate::{
    algorithm,
    error::ConfigError,
    key_spec::{KeySpec, RawKeySpec},
    key_store::KeyStore,
    signing_key::SigningKey,
};

/// Audience stamped into and required of tokens when none is configured.
pub const DEFAULT_AUDIENCE: &str = "lantern";

/// Token lifetime when none is configured.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Fixed secret backing the test-environment fallback key. Well-known by
/// design; must never be reachable outside [`Environment::Test`].
const TEST_FALLBACK_SECRET: &str = "lantern-test-signing-secret";

/// Deployment environment, controlling the no-key fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live deployment. No fallback key; missing configuration is fatal.
    #[default]
    Production,
    /// Local development. Same fail-closed rules as production.
    Development,
    /// Automated test runs. Fabricates a deterministic HS256 key when no
    /// key is configured.
    Test,
}

/// Claim constraints consumed by `sign`/`verify`, owned by the resolved
/// [`KeyStore`] so call sites pass a single process-wide object.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// Issuer stamped into tokens and required at verification when set.
    pub issuer: Option<String>,
    /// Audience stamped into tokens and required at verification.
    pub audience: String,
    /// Lifetime applied to freshly signed tokens.
    pub expiry: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self { issuer: None, audience: DEFAULT_AUDIENCE.to_owned(), expiry: DEFAULT_EXPIRY }
    }
}

impl TokenSettings {
    /// Sets the issuer constraint.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the audience constraint.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Sets the token lifetime.
    #[must_use]
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }
}

/// Raw authentication configuration, read once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Single signing secret: a raw HMAC secret for symmetric algorithms,
    /// or a JSON `{public, private?}` object for asymmetric ones.
    pub secret: Option<String>,
    /// Multi-key configuration: a JSON array of key spec objects. Takes
    /// precedence over `secret`.
    pub secrets: Option<String>,
    /// Signing algorithm name (for example `"HS256"` or `"RS256"`), applied
    /// to every configured key. Defaults to HS256.
    pub algorithm: Option<String>,
    /// Issuer claim constraint.
    pub issuer: Option<String>,
    /// Audience claim constraint. Defaults to [`DEFAULT_AUDIENCE`].
    pub audience: Option<String>,
    /// Token lifetime in seconds. Defaults to one day.
    pub expiry_secs: Option<u64>,
    /// Deployment environment.
    pub environment: Environment,
}

/// Resolves configuration into an immutable [`KeyStore`].
///
/// Run once at startup, before serving requests. A `ConfigError` here is
/// fatal: the process must not start without a usable signing key.
///
/// # Errors
///
/// Any [`ConfigError`]: malformed key JSON, an empty key array, key specs
/// violating the id/material rules, unparseable key material, duplicate
/// ids, or no key configured outside the test environment.
pub fn resolve(config: &AuthConfig) -> Result<KeyStore, ConfigError> {
    let algorithm = algorithm::parse_algorithm(config.algorithm.as_deref())?;
    let settings = TokenSettings {
        issuer: config.issuer.clone(),
        audience: config.audience.clone().unwrap_or_else(|| DEFAULT_AUDIENCE.to_owned()),
        expiry: config.expiry_secs.map_or(DEFAULT_EXPIRY, Duration::from_secs),
    };

    let keys = if let Some(raw) = &config.secrets {
        parse_key_array(raw, algorithm)?
    } else if let Some(secret) = &config.secret {
        vec![parse_single_secret(secret, algorithm)?]
    } else if config.environment == Environment::Test {
        tracing::warn!("no signing key configured; fabricating fixed test-environment key");
        vec![test_fallback_key()]
    } else {
        return Err(ConfigError::MissingSigningKey);
    };

    let store = KeyStore::new(keys, settings)?;
    tracing::info!(
        key_count = store.len(),
        algorithm = %algorithm::name(algorithm),
        "resolved signing key store"
    );
    Ok(store)
}

/// Parses the JSON multi-key array into one [`SigningKey`] per entry.
fn parse_key_array(raw: &str, algorithm: Algorithm) -> Result<Vec<SigningKey>, ConfigError> {
    let raw_specs: Vec<RawKeySpec> = serde_json::from_str(raw)
        .map_err(|e| ConfigError::malformed_key_config(format!("key array is not valid JSON: {e}")))?;
    if raw_specs.is_empty() {
        return Err(ConfigError::EmptyKeyArray);
    }

    let multi = raw_specs.len() > 1;
    raw_specs
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let spec = KeySpec::parse(raw, algorithm, index, multi)?;
            SigningKey::from_spec(spec)
        })
        .collect()
}

/// Builds the single key from the `secret` value.
fn parse_single_secret(secret: &str, algorithm: Algorithm) -> Result<SigningKey, ConfigError> {
    let raw = if algorithm::is_symmetric(algorithm) {
        RawKeySpec { id: None, secret: Some(secret.to_owned()), public: None, private: None }
    } else {
        serde_json::from_str(secret).map_err(|e| {
            ConfigError::malformed_key_config(format!(
                "single asymmetric secret is not a valid JSON key object: {e}"
            ))
        })?
    };
    let spec = KeySpec::parse(raw, algorithm, 0, false)?;
    SigningKey::from_spec(spec)
}

/// The deterministic HS256 key fabricated for the test environment.
fn test_fallback_key() -> SigningKey {
    SigningKey::SharedSecret {
        kid: None,
        algorithm: Algorithm::HS256,
        encoding: jsonwebtoken::EncodingKey::from_secret(TEST_FALLBACK_SECRET.as_bytes()),
        decoding: jsonwebtoken::DecodingKey::from_secret(TEST_FALLBACK_SECRET.as_bytes()),
    }
}
