//! Deterministic event identifiers.

use sha2::{Digest, Sha256};

/// Builds a UID from a logical occurrence key.
///
/// The same `(key, domain)` always yields the same identifier:
/// the first 16 hex digits of SHA-256(key) followed by `@calendar-engine-{domain}`.
pub fn stable_uid(key: &str, domain: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("{hex}@calendar-engine-{domain}")
}
