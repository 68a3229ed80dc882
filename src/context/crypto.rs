//! Encryption of stored credentials.
//!
//! Values are sealed with ChaCha20-Poly1305 under a key derived from a
//! passphrase (SHA-256), base64 encoded, and tagged with a trailing marker
//! so that already-encrypted values can be recognized and left alone.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Marker appended to every encrypted value.
pub const ENCRYPTED_POSTFIX: &str = "*~~*";

/// Passphrase used when no machine key is mixed in.
pub(crate) const BASE_KEY: &str = "a4dx23513TY69dE+533#1Ae@rTo*dO&-002";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Whether a value carries the encrypted marker.
pub fn is_encrypted(value: &str) -> bool {
    value.ends_with(ENCRYPTED_POSTFIX)
}

fn cipher_for(passphrase: &str) -> ChaCha20Poly1305 {
    let digest = Sha256::digest(passphrase.as_bytes());
    ChaCha20Poly1305::new(Key::from_slice(digest.as_slice()))
}

/// Encrypt `value` with `passphrase`.
///
/// Empty input yields an empty string and marked input is returned as-is,
/// so applying this twice is the same as applying it once.
pub fn encrypt_string(value: &str, passphrase: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    if is_encrypted(value) {
        return Ok(value.to_string());
    }

    let cipher = cipher_for(passphrase);
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let sealed = cipher
        .encrypt(&nonce, value.as_bytes())
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let mut payload = Vec::with_capacity(NONCE_LEN + sealed.len());
    payload.extend_from_slice(nonce.as_slice());
    payload.extend_from_slice(&sealed);

    Ok(format!("{}{}", STANDARD.encode(payload), ENCRYPTED_POSTFIX))
}

/// Decrypt a value produced by [`encrypt_string`].
///
/// Empty input yields an empty string; input without the marker is treated
/// as plain text and returned unchanged.
pub fn decrypt_string(value: &str, passphrase: &str) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    let Some(encoded) = value.strip_suffix(ENCRYPTED_POSTFIX) else {
        return Ok(value.to_string());
    };

    let payload = STANDARD
        .decode(encoded)
        .map_err(|e| Error::Decryption(format!("invalid encoding: {}", e)))?;
    if payload.len() < NONCE_LEN + TAG_LEN {
        return Err(Error::Decryption("value is too short".to_string()));
    }

    let (nonce, sealed) = payload.split_at(NONCE_LEN);
    let plain = cipher_for(passphrase)
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| Error::Decryption("wrong key or corrupted value".to_string()))?;

    String::from_utf8(plain).map_err(|e| Error::Decryption(e.to_string()))
}
