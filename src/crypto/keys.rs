//! Key management for field encryption
//!
//! The key is injected once at construction and never varies per call.
//! Secret copies live in zeroizing buffers and are wiped on drop.

use super::{cipher_for, generate_nonce, open, seal, EncryptedEnvelope, KEY_SIZE};
use crate::error::{Error, Result};
use aes_gcm::Aes256Gcm;
use rand::{distributions::Alphanumeric, Rng};
use serde_json::Value;
use zeroize::Zeroizing;

/// AES-256-GCM cipher bound to the process-wide field-encryption key
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Create from raw key bytes
    pub fn new(key: &[u8; KEY_SIZE]) -> Result<Self> {
        Ok(Self {
            cipher: cipher_for(key)?,
        })
    }

    /// Create from a configured secret.
    ///
    /// The secret's UTF-8 bytes are the raw key, so it must be exactly
    /// 32 bytes long.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let bytes = Zeroizing::new(secret.as_bytes().to_vec());
        if bytes.len() != KEY_SIZE {
            return Err(Error::Config(format!(
                "Encryption key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        key.copy_from_slice(&bytes);
        Self::new(&key)
    }

    /// Create from the secret held in environment variable `var`
    pub fn from_env(var: &str) -> Result<Self> {
        let secret = Zeroizing::new(std::env::var(var).map_err(|_| {
            Error::Config(format!("Encryption key variable {} is not set", var))
        })?);
        Self::from_secret(&secret)
    }

    /// Encrypt raw bytes under a fresh nonce
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<EncryptedEnvelope> {
        let nonce = generate_nonce();
        let ciphertext = seal(&self.cipher, &nonce, plaintext)?;
        Ok(EncryptedEnvelope { ciphertext, nonce })
    }

    /// Decrypt an envelope back to raw bytes
    pub fn decrypt_bytes(&self, envelope: &EncryptedEnvelope) -> Result<Vec<u8>> {
        open(&self.cipher, &envelope.nonce, &envelope.ciphertext)
    }

    /// Serialize a JSON value and encrypt its text form
    pub fn encrypt_json(&self, value: &Value) -> Result<EncryptedEnvelope> {
        let plaintext = Zeroizing::new(serde_json::to_vec(value)?);
        self.encrypt_bytes(&plaintext)
    }

    /// Decrypt an envelope and parse the JSON it carries
    pub fn decrypt_json(&self, envelope: &EncryptedEnvelope) -> Result<Value> {
        let plaintext = Zeroizing::new(self.decrypt_bytes(envelope)?);
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("algorithm", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}

/// Generate a random secret usable as the encryption key
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_SIZE)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn cipher() -> FieldCipher {
        FieldCipher::from_secret(SECRET).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_json() {
        let cipher = cipher();
        let data = json!({"name": "Ada", "skills": ["rust", "math"], "level": 3});

        let envelope = cipher.encrypt_json(&data).unwrap();
        assert_eq!(cipher.decrypt_json(&envelope).unwrap(), data);
    }

    #[test]
    fn test_encode_parse_decrypt() {
        let cipher = cipher();
        let encoded = cipher.encrypt_json(&json!("hello")).unwrap().encode();

        let envelope = EncryptedEnvelope::parse(&encoded).unwrap();
        assert_eq!(cipher.decrypt_json(&envelope).unwrap(), json!("hello"));
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let cipher = cipher();
        let data = json!({"x": 1});

        let a = cipher.encrypt_json(&data).unwrap();
        let b = cipher.encrypt_json(&data).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn test_plaintext_is_serialized_json() {
        let cipher = cipher();
        let envelope = cipher.encrypt_json(&json!({"b": 1, "a": [true, null]})).unwrap();
        let plaintext = cipher.decrypt_bytes(&envelope).unwrap();
        assert_eq!(plaintext, br#"{"b":1,"a":[true,null]}"#);
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let other = FieldCipher::from_secret("ffffffffffffffffffffffffffffffff").unwrap();
        let envelope = cipher().encrypt_json(&json!({"secret": true})).unwrap();
        assert!(matches!(other.decrypt_json(&envelope), Err(Error::Crypto(_))));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let cipher = cipher();
        let mut envelope = cipher.encrypt_json(&json!("data")).unwrap();
        envelope.ciphertext[0] ^= 0x01;
        assert!(cipher.decrypt_bytes(&envelope).is_err());
    }

    #[test]
    fn test_secret_length_enforced() {
        assert!(matches!(FieldCipher::from_secret(""), Err(Error::Config(_))));
        assert!(matches!(FieldCipher::from_secret("short"), Err(Error::Config(_))));
        assert!(FieldCipher::from_secret(&"k".repeat(33)).is_err());
    }

    #[test]
    fn test_from_env_missing() {
        let result = FieldCipher::from_env("PRIVACY_SHIELD_TEST_KEY_THAT_IS_NOT_SET");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", cipher());
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("AES-256-GCM"));
    }

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), KEY_SIZE);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(FieldCipher::from_secret(&secret).is_ok());
        assert_ne!(secret, generate_secret());
    }
}
