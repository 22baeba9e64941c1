//! Digest utilities - SHA-256 fingerprints and synthetic ledger identifiers

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest
pub const SHA256_HEX_LEN: usize = 64;

/// Calculate SHA256 hex digest of raw file bytes.
///
/// Only the content is hashed, so file name and MIME type never affect the result.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Salted SHA256 over a password (credential storage for the demo auth flow)
pub fn salted_sha256(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Random lowercase hex string of `byte_len` bytes
pub fn random_hex(byte_len: usize) -> String {
    let mut buf = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Synthetic blockchain transaction identifier (`0x` + 64 hex chars).
///
/// No ledger is involved; the value only stands in for a transaction hash.
pub fn synthetic_tx_hash() -> String {
    format!("0x{}", random_hex(32))
}

/// Kiểm tra chuỗi có phải SHA-256 hex digest hợp lệ không
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == SHA256_HEX_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}
