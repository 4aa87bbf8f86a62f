//! Field-level encryption
//!
//! Encrypts JSON payloads with AES-256-GCM under a process-wide key and
//! encodes the result as a transport-safe `<ciphertext>.<nonce>` envelope.

mod envelope;
mod keys;

pub use envelope::{EncryptedEnvelope, ENVELOPE_DELIMITER};
pub use keys::{generate_secret, FieldCipher};

use crate::error::{Error, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

/// AES-256-GCM encryption key size
pub const KEY_SIZE: usize = 32;

/// Nonce size for AES-GCM (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Generate a fresh random nonce
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Build the cipher for a raw key
pub(crate) fn cipher_for(key: &[u8; KEY_SIZE]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::Crypto(format!("Failed to create cipher: {}", e)))
}

/// Encrypt data under `nonce`. The output carries the GCM tag.
pub(crate) fn seal(
    cipher: &Aes256Gcm,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))
}

/// Decrypt and authenticate data sealed under `nonce`
pub(crate) fn open(
    cipher: &Aes256Gcm,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| Error::Crypto(format!("Decryption failed: {}", e)))
}
