//! A single signing/verification key.
//!
//! [`SigningKey`] is the closed two-variant polymorphism over key shapes:
//! a shared secret (HMAC family, signs and verifies with the same bytes) or
//! an asymmetric pair (signs with the private key when present, verifies
//! with the public key). The algorithm and material binding is fixed at
//! construction — PEM bodies are parsed once, so bad key material fails at
//! startup rather than on the first request.
//!
//! # Algorithm-confusion defense
//!
//! [`verify`](SigningKey::verify) compares the token header's declared
//! algorithm against this key's configured algorithm before any
//! cryptographic work and rejects mismatches with
//! [`TokenError::AlgorithmMismatch`]. A token minted under HS256 can never
//! be checked against an RSA key's public material used as an HMAC secret.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header};

use crate::{
    algorithm,
    claims::Claims,
    config::TokenSettings,
    error::{ConfigError, TokenError},
    key_spec::{KeyMaterial, KeySpec},
};

/// One configured key, able to verify tokens and (when it holds secret or
/// private material) to sign them.
///
/// Immutable after construction; safe to share across threads behind the
/// owning [`KeyStore`](crate::KeyStore).
#[derive(Clone)]
pub enum SigningKey {
    /// HMAC shared secret: the same bytes sign and verify.
    SharedSecret {
        /// Key identifier embedded in token headers, when configured.
        kid: Option<String>,
        /// The HMAC algorithm (HS256/HS384/HS512).
        algorithm: Algorithm,
        /// Pre-built signing key.
        encoding: EncodingKey,
        /// Pre-built verification key.
        decoding: DecodingKey,
    },
    /// Asymmetric pair: public key verifies, private key (if present) signs.
    Asymmetric {
        /// Key identifier embedded in token headers, when configured.
        kid: Option<String>,
        /// The asymmetric algorithm (RS*/PS*/ES*/EdDSA).
        algorithm: Algorithm,
        /// Pre-built signing key; `None` makes this key verify-only.
        encoding: Option<EncodingKey>,
        /// Pre-built verification key.
        decoding: DecodingKey,
    },
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedSecret { kid, algorithm, .. } => f
                .debug_struct("SharedSecret")
                .field("kid", kid)
                .field("algorithm", algorithm)
                .field("secret", &"<redacted>")
                .finish(),
            Self::Asymmetric { kid, algorithm, encoding, .. } => f
                .debug_struct("Asymmetric")
                .field("kid", kid)
                .field("algorithm", algorithm)
                .field("can_sign", &encoding.is_some())
                .finish(),
        }
    }
}

impl SigningKey {
    /// Builds a key from a validated [`KeySpec`], parsing PEM material.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKeyMaterial`] when a PEM body cannot be
    /// parsed for the key's algorithm.
    pub fn from_spec(spec: KeySpec) -> Result<Self, ConfigError> {
        match spec.material {
            KeyMaterial::Secret(secret) => Ok(Self::SharedSecret {
                kid: spec.id,
                algorithm: spec.algorithm,
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            KeyMaterial::KeyPair { public, private } => {
                let decoding = decoding_key_from_pem(spec.algorithm, public.as_bytes())?;
                let encoding = private
                    .map(|pem| encoding_key_from_pem(spec.algorithm, pem.as_bytes()))
                    .transpose()?;
                Ok(Self::Asymmetric { kid: spec.id, algorithm: spec.algorithm, encoding, decoding })
            },
        }
    }

    /// The key identifier, when configured.
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        match self {
            Self::SharedSecret { kid, .. } | Self::Asymmetric { kid, .. } => kid.as_deref(),
        }
    }

    /// The algorithm this key is bound to.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::SharedSecret { algorithm, .. } | Self::Asymmetric { algorithm, .. } => *algorithm,
        }
    }

    /// Whether this key holds material capable of signing.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        match self {
            Self::SharedSecret { .. } => true,
            Self::Asymmetric { encoding, .. } => encoding.is_some(),
        }
    }

    /// Produces a signed token for `claims`.
    ///
    /// Stamps `iss` (when configured), `aud`, `iat`, and `exp` from
    /// `settings`, and embeds this key's `kid` in the header when present so
    /// verifiers can select the matching key.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoPrivateKey`] for asymmetric verify-only keys.
    /// - [`ConfigError::InvalidKeyMaterial`] if encoding fails (key material
    ///   incompatible with the bound algorithm).
    pub fn sign(&self, claims: Claims, settings: &TokenSettings) -> Result<String, ConfigError> {
        let encoding = match self {
            Self::SharedSecret { encoding, .. } => encoding,
            Self::Asymmetric { encoding: Some(encoding), .. } => encoding,
            Self::Asymmetric { encoding: None, .. } => {
                return Err(ConfigError::no_private_key(self.kid().unwrap_or("<unnamed>")));
            },
        };

        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            iss: settings.issuer.clone(),
            aud: settings.audience.clone(),
            iat: now,
            exp: now.saturating_add(settings.expiry.as_secs()),
            ..claims
        };

        let mut header = Header::new(self.algorithm());
        header.kid = self.kid().map(str::to_owned);

        tracing::debug!(
            kid = self.kid().unwrap_or("<unnamed>"),
            algorithm = %algorithm::name(self.algorithm()),
            "signing token"
        );

        jsonwebtoken::encode(&header, &claims, encoding)
            .map_err(|e| ConfigError::invalid_key_material(e.to_string()))
    }

    /// Verifies `token` against this key and the configured claim constraints.
    ///
    /// Checks, in order: header decodes, declared algorithm matches this
    /// key's algorithm, signature is valid, `exp` has not elapsed, `aud`
    /// matches, and `iss` matches when an issuer is configured. Returns the
    /// decoded claims on success.
    ///
    /// # Errors
    ///
    /// [`TokenError::AlgorithmMismatch`], [`TokenError::SignatureInvalid`],
    /// [`TokenError::Expired`], [`TokenError::AudienceMismatch`],
    /// [`TokenError::IssuerMismatch`], or [`TokenError::Malformed`].
    pub fn verify(&self, token: &str, settings: &TokenSettings) -> Result<Claims, TokenError> {
        let header = decode_header(token)?;

        if header.alg != self.algorithm() {
            return Err(TokenError::algorithm_mismatch(
                algorithm::name(header.alg),
                algorithm::name(self.algorithm()),
            ));
        }

        let mut validation = Validation::new(self.algorithm());
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud"]);
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        let data = decode::<Claims>(token, self.decoding_key(), &validation)?;
        Ok(data.claims)
    }

    /// The verification key.
    fn decoding_key(&self) -> &DecodingKey {
        match self {
            Self::SharedSecret { decoding, .. } | Self::Asymmetric { decoding, .. } => decoding,
        }
    }
}

/// Parses a PEM-encoded public key for the given asymmetric algorithm.
fn decoding_key_from_pem(algorithm: Algorithm, pem: &[u8]) -> Result<DecodingKey, ConfigError> {
    let result = match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem),
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            // KeySpec::parse only produces KeyPair material for asymmetric
            // algorithms; reaching here means a caller bypassed it.
            return Err(ConfigError::invalid_key_material(
                "PEM key pair supplied for a symmetric algorithm",
            ));
        },
    };
    result.map_err(|e| ConfigError::invalid_key_material(format!("public key: {e}")))
}

/// Parses a PEM-encoded private key for the given asymmetric algorithm.
fn encoding_key_from_pem(algorithm: Algorithm, pem: &[u8]) -> Result<EncodingKey, ConfigError> {
    let result = match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => EncodingKey::from_rsa_pem(pem),
        Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(pem),
        Algorithm::EdDSA => EncodingKey::from_ed_pem(pem),
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            return Err(ConfigError::invalid_key_material(
                "PEM key pair supplied for a symmetric algorithm",
            ));
        },
    };
    result.map_err(|e| ConfigError::invalid_key_material(format!("private key: {e}")))
}
