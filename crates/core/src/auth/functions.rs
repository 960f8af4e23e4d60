use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, TryRngCore};

use super::{AuthError, Result, SessionId, SessionRecord, Token};

/// Number of random bytes behind a state token (128 bits).
const STATE_BYTES: usize = 16;

/// Number of random bytes behind a session id.
const SESSION_ID_BYTES: usize = 32;

/// Tokens this close to expiry are treated as expired.
const EXPIRY_LEEWAY_SECS: i64 = 10;

fn random_url_safe<const N: usize>() -> Result<String> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::EntropySourceFailed(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a random state parameter for CSRF protection.
///
/// 16 bytes from the OS random source, base64url encoded without padding.
pub fn generate_state() -> Result<String> {
    random_url_safe::<STATE_BYTES>()
}

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> Result<SessionId> {
    random_url_safe::<SESSION_ID_BYTES>().map(SessionId::new)
}

/// Check if a token must be refreshed before use.
///
/// Tokens without an expiry never expire.
pub fn is_token_expired(token: &Token, now: DateTime<Utc>) -> bool {
    match token.expiry {
        Some(expiry) => expiry - Duration::seconds(EXPIRY_LEEWAY_SECS) <= now,
        None => false,
    }
}

/// Check if a stored session is past its expiry.
pub fn is_session_expired(record: &SessionRecord, now: DateTime<Utc>) -> bool {
    record.expires_at <= now
}

/// Split the provider's space separated scope string.
pub fn parse_scopes(scopes: &str) -> Vec<String> {
    scopes.split_whitespace().map(String::from).collect()
}
