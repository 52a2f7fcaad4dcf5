//! # Lantern Authentication
//!
//! JWT signing-key resolution and token verification for Lantern services.
//!
//! This crate provides:
//! - **Key resolution**: one startup pass from static configuration to an
//!   immutable [`KeyStore`]
//! - **Token signing**: claim stamping (`iss`/`aud`/`iat`/`exp`) and `kid`
//!   header embedding
//! - **Token verification**: `kid`-driven key selection with an exact
//!   algorithm match required before any signature check
//!
//! ## Key rules
//!
//! - One global algorithm per store; HMAC families use a shared secret,
//!   asymmetric families use PEM key pairs (verify-only without a private
//!   key)
//! - Multi-key stores require a unique non-empty `id` per key and fail
//!   closed on tokens without a `kid`
//! - Missing key configuration aborts startup outside the test environment
//!
//! ## Example
//!
//! ```
//! use lantern_authn::{AuthConfig, Claims, resolve};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig { secret: Some("s3cr3t".to_owned()), ..AuthConfig::default() };
//! let store = resolve(&config)?;
//!
//! let token = store.sign(Claims::new("user-1"))?;
//! let claims = store.verify(&token)?;
//! assert_eq!(claims.sub, "user-1");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Algorithm parsing and family classification.
pub mod algorithm;
/// Token claims payload.
pub mod claims;
/// Startup configuration and key-store resolution.
pub mod config;
/// Configuration and token error types.
pub mod error;
/// Configured-key descriptions and validation.
pub mod key_spec;
/// The process-wide key collection.
pub mod key_store;
/// Individual signing/verification keys.
pub mod signing_key;
/// Test fixtures and raw-token crafting helpers.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

// Re-export key types for convenience
pub use algorithm::{AlgorithmFamily, DEFAULT_ALGORITHM};
pub use claims::Claims;
pub use config::{
    AuthConfig, DEFAULT_AUDIENCE, DEFAULT_EXPIRY, Environment, TokenSettings, resolve,
};
pub use error::{ConfigError, Result, TokenError};
pub use jsonwebtoken::Algorithm;
pub use key_spec::{KeyMaterial, KeySpec, RawKeySpec};
pub use key_store::KeyStore;
pub use signing_key::SigningKey;
