//! Opaque session token generation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::TryRngCore;
use rand::rngs::OsRng;

use super::AuthError;

/// Raw random bytes per session token.
pub const TOKEN_BYTES: usize = 20;

/// Generate a session token: 20 bytes from the OS CSPRNG, base64 encoded.
///
/// Fails with [`AuthError::Entropy`] when the OS random source is unavailable.
pub fn generate_session_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Entropy(format!("os rng: {e}")))?;
    Ok(STANDARD.encode(bytes))
}
