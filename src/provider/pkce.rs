//! PKCE (RFC 7636) verifier and challenge generation
//!
//! The verifier is held by the provider client between flow initiation and
//! token exchange; the S256 challenge travels in the authorization URL so
//! the provider can verify both legs came from the same party.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a cryptographically random PKCE code verifier.
///
/// 64 random bytes encoded as URL-safe base64 without padding; RFC 7636
/// requires 43-128 characters and this yields 86.
#[must_use]
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; 64];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute the S256 code challenge: `BASE64URL(SHA256(verifier))`
#[must_use]
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
