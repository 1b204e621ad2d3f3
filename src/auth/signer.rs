//! Deterministic HMAC-SHA256 request signing.
//!
//! The signature covers the canonical `key=value&...` rendering of the fully
//! enriched parameter set, so a server holding the same secret can re-render
//! and compare. Verification uses the MAC's constant-time comparison even
//! though the client only verifies inbound webhook payloads; the discipline is
//! applied uniformly.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{_prelude::*, config::SigningSecret, error::ValidationError, params::Params};

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 signature of `params` under `secret`.
///
/// Identical parameter sets yield identical signatures irrespective of
/// insertion order; the canonical rendering is key-sorted by construction.
pub fn sign(params: &Params, secret: &SigningSecret) -> Result<String, ValidationError> {
	params.validate()?;

	let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
		.expect("HMAC can take key of any size");

	mac.update(params.canonical_string().as_bytes());

	Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies `signature` against `params` in constant time.
pub fn verify(
	params: &Params,
	secret: &SigningSecret,
	signature: &str,
) -> Result<(), ValidationError> {
	params.validate()?;

	let digest = hex::decode(signature).map_err(|_| ValidationError::SignatureMismatch)?;
	let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
		.expect("HMAC can take key of any size");

	mac.update(params.canonical_string().as_bytes());
	mac.verify_slice(&digest).map_err(|_| ValidationError::SignatureMismatch)
}
