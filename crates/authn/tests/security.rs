//! Security-focused tests for the signing-key store.
//!
//! These tests verify the token pipeline's resistance to common JWT attack
//! vectors: algorithm substitution, algorithm confusion across families,
//! signature tampering, key-id substitution, expired tokens, and malformed
//! token structures, plus the fail-fast configuration scenarios.
#![allow(clippy::expect_used, clippy::panic)]

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use lantern_authn::{
    AuthConfig, Claims, ConfigError, Environment, TokenError, assert_token_error, resolve,
    testutil::{
        OTHER_RSA_PRIVATE_PEM, OTHER_RSA_PUBLIC_PEM, TEST_RSA_PRIVATE_PEM, TEST_RSA_PUBLIC_PEM,
        craft_raw_jwt,
    },
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolves a single-HMAC-secret store (scenario: one `s3cr3t`, HS256).
fn hmac_store(secret: &str) -> lantern_authn::KeyStore {
    let config = AuthConfig { secret: Some(secret.to_owned()), ..AuthConfig::default() };
    resolve(&config).expect("hmac store")
}

/// Resolves a two-key HS256 store with ids `k1` and `k2`.
fn multi_store() -> lantern_authn::KeyStore {
    let config = AuthConfig {
        secrets: Some(r#"[{"id":"k1","secret":"a"},{"id":"k2","secret":"b"}]"#.to_owned()),
        ..AuthConfig::default()
    };
    resolve(&config).expect("multi store")
}

/// Resolves a single-RSA-key store; `private` controls sign capability.
fn rsa_store(public: &str, private: Option<&str>) -> lantern_authn::KeyStore {
    let secret = json!({ "public": public, "private": private }).to_string();
    let config = AuthConfig {
        secret: Some(secret),
        algorithm: Some("RS256".to_owned()),
        ..AuthConfig::default()
    };
    resolve(&config).expect("rsa store")
}

/// Returns `token` with one character of its signature segment replaced.
fn tamper_signature(token: &str, offset: usize) -> String {
    let last_dot = token.rfind('.').expect("three-segment token");
    let position = last_dot + 1 + offset;
    let mut bytes = token.as_bytes().to_vec();
    bytes[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
    String::from_utf8(bytes).expect("ascii token")
}

/// Signs arbitrary claims JSON with an HMAC secret, bypassing the store's
/// claim stamping.
fn raw_hmac_token(header: Header, claims: &serde_json::Value, secret: &str) -> String {
    jsonwebtoken::encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("encode raw token")
}

// ---------------------------------------------------------------------------
// Round-trip law
// ---------------------------------------------------------------------------

#[test]
fn test_round_trip_preserves_claims() {
    let store = hmac_store("s3cr3t");
    let claims = Claims::new("u1").with_claim("role", "admin");

    let token = store.sign(claims).expect("sign");
    let verified = store.verify(&token).expect("verify");

    assert_eq!(verified.sub, "u1");
    assert_eq!(verified.extra.get("role"), Some(&json!("admin")));
    assert!(verified.exp > verified.iat);
}

#[test]
fn test_round_trip_rsa() {
    let store = rsa_store(TEST_RSA_PUBLIC_PEM, Some(TEST_RSA_PRIVATE_PEM));
    let token = store.sign(Claims::new("u1")).expect("sign");
    assert_eq!(store.verify(&token).expect("verify").sub, "u1");
}

// ---------------------------------------------------------------------------
// Algorithm substitution ("none") and confusion
// ---------------------------------------------------------------------------

#[test]
fn test_algorithm_none_rejected() {
    let store = hmac_store("s3cr3t");
    let now = Utc::now().timestamp();
    let token = craft_raw_jwt(
        &json!({"alg": "none", "typ": "JWT"}),
        &json!({"sub": "u1", "aud": "lantern", "exp": now + 3600, "iat": now}),
        b"",
    );
    // "none" is not a parseable algorithm, so the header itself is rejected.
    assert_token_error!(store.verify(&token), Malformed);
}

#[test]
fn test_algorithm_confusion_hmac_token_against_rsa_key() {
    // A token minted under HS256 with the RSA *public* key as the HMAC
    // secret must fail on the algorithm check, never reach HMAC
    // verification against the public key bytes.
    let store = rsa_store(TEST_RSA_PUBLIC_PEM, None);
    let now = Utc::now().timestamp();
    let token = raw_hmac_token(
        Header::new(Algorithm::HS256),
        &json!({"sub": "u1", "aud": "lantern", "exp": now + 3600, "iat": now}),
        TEST_RSA_PUBLIC_PEM,
    );

    let result = store.verify(&token);
    assert!(
        matches!(
            result,
            Err(TokenError::AlgorithmMismatch { ref token_alg, ref key_alg, .. })
                if token_alg == "HS256" && key_alg == "RS256"
        ),
        "expected AlgorithmMismatch, got: {result:?}"
    );
}

#[test]
fn test_algorithm_mismatch_within_hmac_family() {
    let hs256 = hmac_store("s3cr3t");
    let hs384 = resolve(&AuthConfig {
        secret: Some("s3cr3t".to_owned()),
        algorithm: Some("HS384".to_owned()),
        ..AuthConfig::default()
    })
    .expect("hs384 store");

    let token = hs256.sign(Claims::new("u1")).expect("sign");
    assert_token_error!(hs384.verify(&token), AlgorithmMismatch);
}

// ---------------------------------------------------------------------------
// Signature integrity
// ---------------------------------------------------------------------------

#[test]
fn test_tampered_signature_rejected_at_every_probed_offset() {
    let store = hmac_store("s3cr3t");
    let token = store.sign(Claims::new("u1")).expect("sign");
    let signature_len = token.len() - token.rfind('.').expect("dot") - 1;

    for offset in [0, 1, signature_len / 2, signature_len - 2] {
        let tampered = tamper_signature(&token, offset);
        assert_token_error!(store.verify(&tampered), SignatureInvalid);
    }

    // The final character carries unused trailing bits, so its flip may
    // surface as a base64 canonicality error instead of a signature
    // failure. Either way it must be a rejection.
    let tampered = tamper_signature(&token, signature_len - 1);
    let result = store.verify(&tampered);
    assert!(
        matches!(result, Err(TokenError::SignatureInvalid | TokenError::Malformed { .. })),
        "tampered final signature byte must be rejected, got: {result:?}"
    );
}

#[test]
fn test_tampered_claims_rejected() {
    let store = hmac_store("s3cr3t");
    let token = store.sign(Claims::new("u1")).expect("sign");

    // Splice in a forged claims segment, keeping header and signature.
    let mut segments: Vec<&str> = token.split('.').collect();
    let now = Utc::now().timestamp();
    let forged = craft_raw_jwt(
        &json!({"alg": "HS256"}),
        &json!({"sub": "admin", "aud": "lantern", "exp": now + 3600, "iat": now}),
        b"",
    );
    let forged_claims = forged.split('.').nth(1).expect("claims segment").to_owned();
    segments[1] = &forged_claims;
    let tampered = segments.join(".");

    assert_token_error!(store.verify(&tampered), SignatureInvalid);
}

#[test]
fn test_token_from_unrelated_rsa_key_rejected() {
    let signer = rsa_store(OTHER_RSA_PUBLIC_PEM, Some(OTHER_RSA_PRIVATE_PEM));
    let verifier = rsa_store(TEST_RSA_PUBLIC_PEM, None);

    let token = signer.sign(Claims::new("u1")).expect("sign");
    assert_eq!(signer.verify(&token).expect("self verify").sub, "u1");
    assert_token_error!(verifier.verify(&token), SignatureInvalid);
}

// ---------------------------------------------------------------------------
// Key-id selection
// ---------------------------------------------------------------------------

#[test]
fn test_multi_key_token_verifies_via_its_own_key() {
    let store = multi_store();
    let token = store.sign(Claims::new("u1")).expect("sign");

    // sign() uses k1; the header kid routes verification back to k1.
    let header = jsonwebtoken::decode_header(&token).expect("header");
    assert_eq!(header.kid.as_deref(), Some("k1"));
    assert_eq!(store.verify(&token).expect("verify").sub, "u1");
}

#[test]
fn test_kid_substitution_to_other_configured_key_rejected() {
    let store = multi_store();
    let now = Utc::now().timestamp();

    // Signed with k1's secret but claiming to be k2: resolution honors the
    // header, and k2's secret then fails the signature check.
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some("k2".to_owned());
    let token = raw_hmac_token(
        header,
        &json!({"sub": "u1", "aud": "lantern", "exp": now + 3600, "iat": now}),
        "a",
    );

    assert_token_error!(store.verify(&token), SignatureInvalid);
}

#[test]
fn test_unknown_kid_rejected() {
    let store = multi_store();
    let now = Utc::now().timestamp();

    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some("k9".to_owned());
    let token = raw_hmac_token(
        header,
        &json!({"sub": "u1", "aud": "lantern", "exp": now + 3600, "iat": now}),
        "a",
    );

    let result = store.verify(&token);
    assert!(
        matches!(result, Err(TokenError::UnknownKeyId { kid: Some(ref kid), .. }) if kid == "k9"),
        "expected UnknownKeyId, got: {result:?}"
    );
}

#[test]
fn test_missing_kid_on_multi_key_store_fails_closed() {
    let store = multi_store();
    let now = Utc::now().timestamp();
    let token = raw_hmac_token(
        Header::new(Algorithm::HS256),
        &json!({"sub": "u1", "aud": "lantern", "exp": now + 3600, "iat": now}),
        "a",
    );

    let result = store.verify(&token);
    assert!(
        matches!(result, Err(TokenError::UnknownKeyId { kid: None, .. })),
        "expected UnknownKeyId without kid, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[test]
fn test_expired_token_rejected() {
    let store = hmac_store("s3cr3t");
    let now = Utc::now().timestamp();
    // Past the 60s default leeway.
    let token = raw_hmac_token(
        Header::new(Algorithm::HS256),
        &json!({"sub": "u1", "aud": "lantern", "exp": now - 600, "iat": now - 1200}),
        "s3cr3t",
    );
    assert_token_error!(store.verify(&token), Expired);
}

#[test]
fn test_missing_exp_rejected() {
    let store = hmac_store("s3cr3t");
    let now = Utc::now().timestamp();
    let token = raw_hmac_token(
        Header::new(Algorithm::HS256),
        &json!({"sub": "u1", "aud": "lantern", "iat": now}),
        "s3cr3t",
    );
    assert_token_error!(store.verify(&token), Malformed);
}

// ---------------------------------------------------------------------------
// Configuration scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_no_key_in_production_aborts_startup() {
    let config = AuthConfig::default();
    let result = resolve(&config);
    assert!(
        matches!(result, Err(ConfigError::MissingSigningKey)),
        "expected MissingSigningKey, got: {result:?}"
    );
}

#[test]
fn test_test_environment_fallback_is_deterministic() {
    let config = AuthConfig { environment: Environment::Test, ..AuthConfig::default() };
    let first = resolve(&config).expect("first store");
    let second = resolve(&config).expect("second store");

    let token = first.sign(Claims::new("u1")).expect("sign");
    assert_eq!(second.verify(&token).expect("cross verify").sub, "u1");
}

#[test]
fn test_duplicate_key_id_aborts_startup() {
    let config = AuthConfig {
        secrets: Some(r#"[{"id":"k1","secret":"a"},{"id":"k1","secret":"b"}]"#.to_owned()),
        ..AuthConfig::default()
    };
    let result = resolve(&config);
    assert!(
        matches!(result, Err(ConfigError::DuplicateKeyId { ref kid, .. }) if kid == "k1"),
        "expected DuplicateKeyId, got: {result:?}"
    );
}

#[test]
fn test_verify_only_rsa_store_rejects_signing() {
    let store = rsa_store(TEST_RSA_PUBLIC_PEM, None);
    let result = store.sign(Claims::new("u1"));
    assert!(
        matches!(result, Err(ConfigError::NoSignableKey)),
        "expected NoSignableKey, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Malformed tokens never panic
// ---------------------------------------------------------------------------

#[test]
fn test_malformed_tokens_rejected_without_panicking() {
    let store = hmac_store("s3cr3t");
    let cases = [
        "",
        ".",
        "..",
        "...",
        "a",
        "a.b",
        "a.b.c",
        "a.b.c.d",
        "!!!.###.$$$",
        "eyJhbGciOiJIUzI1NiJ9",
        "eyJhbGciOiJIUzI1NiJ9..",
        "\u{0}\u{0}\u{0}",
        "💣.💣.💣",
    ];
    for token in cases {
        let result = store.verify(token);
        assert!(result.is_err(), "accepted malformed token {token:?}");
    }
}

#[test]
fn test_header_not_json_rejected() {
    let store = hmac_store("s3cr3t");
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    let token = format!("{}.{}.{}", URL_SAFE_NO_PAD.encode("not json"), "e30", "c2ln");
    assert_token_error!(store.verify(&token), Malformed);
}

#[test]
fn test_claims_not_json_rejected() {
    let store = hmac_store("s3cr3t");
    let token = craft_raw_jwt(&json!({"alg": "HS256"}), &json!("just a string"), b"sig");
    assert!(store.verify(&token).is_err());
}
