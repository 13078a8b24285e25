//! HMAC-SHA256 request signatures in the `sha256=<hex>` format used by GitHub
//! webhook deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Prefix carried by every signature value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Reasons a claimed signature could not even be compared.
///
/// A well-formed signature that simply does not match is not an error; see
/// [`verify_signature`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature is missing the '{SIGNATURE_PREFIX}' prefix")]
    MissingPrefix,

    #[error("signature digest is not valid hex")]
    InvalidHex,
}

fn keyed_mac(secret: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length; `new_from_slice` only fails for
    // fixed-size-key MACs.
    match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any size"),
    }
}

/// Compute the signature of `payload` under `secret`.
///
/// Returns the value in the `sha256=<lowercase hex>` form.
pub fn compute_signature(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = keyed_mac(secret);
    mac.update(payload);
    format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Verify a claimed `sha256=<hex>` signature against the exact bytes that
/// were signed.
///
/// `payload` must be the untouched raw request body. Only the lowercase hex
/// form produced by [`compute_signature`] can match; the digest comparison
/// runs in constant time.
pub fn verify_signature(
    secret: &[u8],
    payload: &[u8],
    claimed: &str,
) -> Result<bool, SignatureError> {
    let digest_hex = claimed
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::MissingPrefix)?;

    let expected = hex::decode(digest_hex).map_err(|_| SignatureError::InvalidHex)?;
    if digest_hex.bytes().any(|b| b.is_ascii_uppercase()) {
        return Ok(false);
    }

    let mut mac = keyed_mac(secret);
    mac.update(payload);
    Ok(mac.verify_slice(&expected).is_ok())
}
