//! Error types for signing-key resolution and token verification.
//!
//! Two taxonomies with different lifecycles:
//!
//! - [`ConfigError`]: startup-time and fatal. Raised while resolving
//!   operator-supplied key configuration into a [`KeyStore`](crate::KeyStore).
//!   The process must not start serving requests after one of these.
//! - [`TokenError`]: request-time and recoverable. Raised while verifying an
//!   individual token; the caller rejects the request and moves on. None of
//!   these are retried — re-running a failed cryptographic verification
//!   cannot change its outcome.

use thiserror::Error;

/// Fatal configuration errors raised while building the process-wide key store.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A key in a multi-key array has no `id`.
    #[error("key at index {index} is missing an 'id' (required when multiple keys are configured)")]
    MissingId {
        /// Zero-based position of the offending key in the configured array.
        index: usize,
    },

    /// A key is missing the material field its algorithm family requires.
    #[error("key '{kid}' is missing required material field '{field}'")]
    MissingMaterial {
        /// Key id, or a positional placeholder when the key has no id.
        kid: String,
        /// The absent field: `secret` for symmetric keys, `public` for asymmetric.
        field: &'static str,
    },

    /// The configured key array parsed successfully but contains no entries.
    #[error("signing key array is empty")]
    EmptyKeyArray,

    /// Two configured keys carry the same `id`.
    #[error("duplicate signing key id: {kid}")]
    DuplicateKeyId {
        /// The id that appears more than once.
        kid: String,
    },

    /// No configured key holds secret or private material, so nothing can sign.
    #[error("no configured key is capable of signing (all keys are verify-only)")]
    NoSignableKey,

    /// A verify-only asymmetric key was asked to sign.
    #[error("signing key '{kid}' has no private key and cannot sign")]
    NoPrivateKey {
        /// Key id, or a placeholder when the key has no id.
        kid: String,
    },

    /// No signing key is configured and the environment has no fallback.
    #[error("no JWT signing key configured; the process cannot issue or verify tokens")]
    MissingSigningKey,

    /// The key configuration value is not valid JSON of the expected shape.
    #[error("malformed signing key configuration: {message}")]
    MalformedKeyConfig {
        /// What failed to parse.
        message: String,
    },

    /// The configured algorithm name is not a recognized JWT algorithm.
    #[error("unsupported JWT algorithm: {name}")]
    UnsupportedAlgorithm {
        /// The algorithm name as configured.
        name: String,
    },

    /// Key material failed cryptographic validation (e.g. a bad PEM body).
    #[error("invalid key material: {message}")]
    InvalidKeyMaterial {
        /// Why the material was rejected.
        message: String,
    },
}

impl ConfigError {
    /// A key in a multi-key array has no `id`.
    pub fn missing_id(index: usize) -> Self {
        Self::MissingId { index }
    }

    /// A key is missing its family's required material field.
    pub fn missing_material(kid: impl Into<String>, field: &'static str) -> Self {
        Self::MissingMaterial { kid: kid.into(), field }
    }

    /// Two configured keys carry the same id.
    pub fn duplicate_key_id(kid: impl Into<String>) -> Self {
        Self::DuplicateKeyId { kid: kid.into() }
    }

    /// A verify-only key was asked to sign.
    pub fn no_private_key(kid: impl Into<String>) -> Self {
        Self::NoPrivateKey { kid: kid.into() }
    }

    /// The key configuration value failed to parse.
    pub fn malformed_key_config(message: impl Into<String>) -> Self {
        Self::MalformedKeyConfig { message: message.into() }
    }

    /// The configured algorithm name is not recognized.
    pub fn unsupported_algorithm(name: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm { name: name.into() }
    }

    /// Key material failed cryptographic validation.
    pub fn invalid_key_material(message: impl Into<String>) -> Self {
        Self::InvalidKeyMaterial { message: message.into() }
    }
}

/// Recoverable per-token verification errors.
///
/// Each of these must surface as an authentication failure to the requester,
/// never as an unhandled fault.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The token cannot be decoded as a three-part JWT.
    #[error("malformed token: {message}")]
    Malformed {
        /// What failed to decode.
        message: String,
    },

    /// The token's key id matches no configured key.
    #[error("no signing key matches token key id '{}'", kid.as_deref().unwrap_or("<absent>"))]
    UnknownKeyId {
        /// The `kid` from the token header; `None` when the header carries
        /// no key id but the store requires one.
        kid: Option<String>,
    },

    /// The token's declared algorithm does not match the verifying key's.
    #[error("token algorithm {token_alg} does not match key algorithm {key_alg}")]
    AlgorithmMismatch {
        /// Algorithm declared in the token header.
        token_alg: String,
        /// Algorithm the verifying key was configured with.
        key_alg: String,
    },

    /// Signature verification failed.
    #[error("invalid token signature")]
    SignatureInvalid,

    /// The token's `exp` claim is in the past.
    #[error("token expired")]
    Expired,

    /// The token's `nbf` claim is in the future.
    #[error("token not yet valid")]
    NotYetValid,

    /// The token's `aud` claim does not match the configured audience.
    #[error("token audience mismatch")]
    AudienceMismatch,

    /// The token's `iss` claim does not match the configured issuer.
    #[error("token issuer mismatch")]
    IssuerMismatch,
}

impl TokenError {
    /// The token cannot be decoded as a JWT.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed { message: message.into() }
    }

    /// The token's key id matches no configured key.
    pub fn unknown_key_id(kid: Option<impl Into<String>>) -> Self {
        Self::UnknownKeyId { kid: kid.map(Into::into) }
    }

    /// The token's declared algorithm does not match the verifying key's.
    pub fn algorithm_mismatch(token_alg: impl Into<String>, key_alg: impl Into<String>) -> Self {
        Self::AlgorithmMismatch { token_alg: token_alg.into(), key_alg: key_alg.into() }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidAudience => TokenError::AudienceMismatch,
            ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
            // The SigningKey verify path compares header and key algorithms
            // before decoding, so this arm only fires for tokens that slip
            // past it (e.g. direct decode calls in downstream code).
            ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch {
                token_alg: "<token>".into(),
                key_alg: "<key>".into(),
            },
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::malformed("invalid JWT structure"),
            ErrorKind::MissingRequiredClaim(claim) => {
                TokenError::malformed(format!("missing required claim '{claim}'"))
            },
            _ => TokenError::malformed(format!("JWT error: {err}")),
        }
    }
}

/// Result type alias for key-resolution and verification operations.
pub type Result<T, E = TokenError> = std::result::Result<T, E>;
