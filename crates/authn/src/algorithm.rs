//! JWT algorithm parsing and family classification.
//!
//! The configuration layer names one global algorithm that governs every
//! configured key. This module parses that name and classifies it into the
//! symmetric (HMAC shared secret) or asymmetric (RSA/EC/EdDSA key pair)
//! family, which in turn decides what key material a [`KeySpec`] must carry.
//!
//! # Security
//!
//! The `none` algorithm is never parseable — `jsonwebtoken` has no variant
//! for it, so unsigned tokens are structurally unrepresentable here.
//!
//! [`KeySpec`]: crate::key_spec::KeySpec

use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::error::ConfigError;

/// Algorithm used when the configuration names none (spec default: HMAC family).
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;

/// The two key-shape families an algorithm can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    /// HMAC algorithms: one shared secret signs and verifies.
    Symmetric,
    /// RSA, ECDSA, and EdDSA: private key signs, public key verifies.
    Asymmetric,
}

/// Parse a configured algorithm name into an [`Algorithm`].
///
/// Accepts the standard JWT algorithm names (`HS256`, `RS256`, `ES384`, ...).
/// A `None` input yields [`DEFAULT_ALGORITHM`].
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedAlgorithm`] for names `jsonwebtoken`
/// does not recognize, including `none`.
///
/// # Examples
///
/// ```
/// use jsonwebtoken::Algorithm;
/// use lantern_authn::algorithm::parse_algorithm;
///
/// assert_eq!(parse_algorithm(Some("RS256")).unwrap(), Algorithm::RS256);
/// assert_eq!(parse_algorithm(None).unwrap(), Algorithm::HS256);
/// assert!(parse_algorithm(Some("none")).is_err());
/// ```
pub fn parse_algorithm(name: Option<&str>) -> Result<Algorithm, ConfigError> {
    match name {
        None => Ok(DEFAULT_ALGORITHM),
        Some(name) => {
            Algorithm::from_str(name).map_err(|_| ConfigError::unsupported_algorithm(name))
        },
    }
}

/// Classify an algorithm into its key-shape family.
#[must_use]
pub fn family(algorithm: Algorithm) -> AlgorithmFamily {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => AlgorithmFamily::Symmetric,
        _ => AlgorithmFamily::Asymmetric,
    }
}

/// Whether the algorithm uses a shared secret for both signing and verifying.
#[must_use]
pub fn is_symmetric(algorithm: Algorithm) -> bool {
    family(algorithm) == AlgorithmFamily::Symmetric
}

/// Render an algorithm the way it appears in a JWT header (`"HS256"`, `"EdDSA"`, ...).
#[must_use]
pub fn name(algorithm: Algorithm) -> String {
    // jsonwebtoken's Debug output matches the RFC 7518 names.
    format!("{algorithm:?}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_parse_algorithm_default_is_hs256() {
        assert_eq!(parse_algorithm(None).unwrap(), Algorithm::HS256);
    }

    #[rstest]
    #[case::hs256("HS256", Algorithm::HS256)]
    #[case::hs512("HS512", Algorithm::HS512)]
    #[case::rs256("RS256", Algorithm::RS256)]
    #[case::es256("ES256", Algorithm::ES256)]
    #[case::eddsa("EdDSA", Algorithm::EdDSA)]
    fn test_parse_algorithm_known_names(#[case] input: &str, #[case] expected: Algorithm) {
        assert_eq!(parse_algorithm(Some(input)).unwrap(), expected);
    }

    #[rstest]
    #[case::none_alg("none")]
    #[case::lowercase("hs256")]
    #[case::garbage("HS999")]
    fn test_parse_algorithm_rejected(#[case] input: &str) {
        let result = parse_algorithm(Some(input));
        assert!(
            matches!(&result, Err(ConfigError::UnsupportedAlgorithm { name, .. }) if name == input),
            "expected UnsupportedAlgorithm for '{input}', got: {result:?}"
        );
    }

    #[test]
    fn test_family_classification() {
        assert_eq!(family(Algorithm::HS256), AlgorithmFamily::Symmetric);
        assert_eq!(family(Algorithm::HS384), AlgorithmFamily::Symmetric);
        assert_eq!(family(Algorithm::HS512), AlgorithmFamily::Symmetric);
        assert_eq!(family(Algorithm::RS256), AlgorithmFamily::Asymmetric);
        assert_eq!(family(Algorithm::PS384), AlgorithmFamily::Asymmetric);
        assert_eq!(family(Algorithm::ES256), AlgorithmFamily::Asymmetric);
        assert_eq!(family(Algorithm::EdDSA), AlgorithmFamily::Asymmetric);
    }

    #[test]
    fn test_is_symmetric() {
        assert!(is_symmetric(Algorithm::HS256));
        assert!(!is_symmetric(Algorithm::RS256));
    }

    #[test]
    fn test_name_matches_header_names() {
        assert_eq!(name(Algorithm::HS256), "HS256");
        assert_eq!(name(Algorithm::EdDSA), "EdDSA");
    }
}
