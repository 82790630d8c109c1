//! `X-Hub-Signature-256` verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const PREFIX: &str = "sha256=";

/// Check `header` (`sha256=<hex>`) against the HMAC-SHA256 of `body`.
///
/// The comparison is constant time.
pub fn verify(secret: &[u8], header: Option<&str>, body: &[u8]) -> Result<(), GatewayError> {
    let hex_digest = header
        .and_then(|value| value.strip_prefix(PREFIX))
        .ok_or(GatewayError::Unauthorized)?;
    let expected = hex::decode(hex_digest).map_err(|_| GatewayError::Unauthorized)?;

    digest(secret, body)
        .ok_or(GatewayError::Unauthorized)?
        .verify_slice(&expected)
        .map_err(|_| GatewayError::Unauthorized)
}

/// Compute the header value GitHub would send for `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> Option<String> {
    let mac = digest(secret, body)?;
    Some(format!("{}{}", PREFIX, hex::encode(mac.finalize().into_bytes())))
}

fn digest(secret: &[u8], body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(mac)
}
