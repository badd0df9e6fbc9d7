//! Anti-forgery token generation and verification.
//!
//! Edit submissions must carry a nonce minted for the same session. Tokens
//! are single-use and time-limited; a failed check is a silent no-op for the
//! caller, so verification only reports a boolean.

use anyhow::{Result, anyhow};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tower_sessions::Session;

/// Session key for stored nonces.
const NONCE_SESSION_KEY: &str = "curation_nonces";

/// Maximum number of outstanding nonces per session.
const MAX_NONCES: usize = 10;

/// Nonce validity period in seconds (1 hour).
const NONCE_VALIDITY_SECS: i64 = 3600;

/// Stored nonce: token plus issue timestamp.
type StoredNonce = (String, i64);

/// Generate a nonce and store it in the session.
pub async fn generate_nonce(session: &Session) -> Result<String> {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let issued_at = chrono::Utc::now().timestamp();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(issued_at.to_le_bytes());
    let token = hex::encode(hasher.finalize());

    let mut nonces: Vec<StoredNonce> = session
        .get(NONCE_SESSION_KEY)
        .await
        .unwrap_or(None)
        .unwrap_or_default();

    nonces.push((token.clone(), issued_at));

    // Keep only the most recent nonces.
    if nonces.len() > MAX_NONCES {
        let skip = nonces.len() - MAX_NONCES;
        nonces.drain(..skip);
    }

    session
        .insert(NONCE_SESSION_KEY, nonces)
        .await
        .map_err(|e| anyhow!("failed to store nonce: {e}"))?;

    Ok(token)
}

/// Verify a submitted nonce against the session.
///
/// A matching, unexpired nonce is consumed; expired nonces are pruned as a
/// side effect.
pub async fn verify_nonce(session: &Session, submitted: &str) -> Result<bool> {
    if submitted.is_empty() {
        return Ok(false);
    }

    let mut nonces: Vec<StoredNonce> = session
        .get(NONCE_SESSION_KEY)
        .await
        .unwrap_or(None)
        .unwrap_or_default();

    if nonces.is_empty() {
        return Ok(false);
    }

    let now = chrono::Utc::now().timestamp();

    let found = nonces
        .iter()
        .position(|(token, issued_at)| token == submitted && now - issued_at <= NONCE_VALIDITY_SECS);

    let Some(index) = found else {
        return Ok(false);
    };

    // Single-use: consume the match and drop anything expired.
    nonces.remove(index);
    nonces.retain(|(_, issued_at)| now - issued_at <= NONCE_VALIDITY_SECS);

    session
        .insert(NONCE_SESSION_KEY, nonces)
        .await
        .map_err(|e| anyhow!("failed to update nonces: {e}"))?;

    Ok(true)
}
