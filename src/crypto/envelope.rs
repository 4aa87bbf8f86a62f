//! Transport encoding for encrypted payloads

use super::NONCE_SIZE;
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::str::FromStr;

/// Separator between the ciphertext and nonce halves
pub const ENVELOPE_DELIMITER: char = '.';

/// Ciphertext (with GCM tag) and the nonce it was sealed under.
///
/// Encoded as `<base64 ciphertext>.<base64 nonce>`. Standard base64 never
/// produces `.`, so the delimiter is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
}

impl EncryptedEnvelope {
    /// Encode as `<ciphertext_b64>.<nonce_b64>`
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            STANDARD.encode(&self.ciphertext),
            ENVELOPE_DELIMITER,
            STANDARD.encode(self.nonce)
        )
    }

    /// Parse an encoded envelope
    pub fn parse(encoded: &str) -> Result<Self> {
        let (ciphertext_b64, nonce_b64) = encoded
            .split_once(ENVELOPE_DELIMITER)
            .ok_or_else(|| Error::Crypto("Envelope is missing the delimiter".to_string()))?;

        if nonce_b64.contains(ENVELOPE_DELIMITER) {
            return Err(Error::Crypto("Envelope has more than one delimiter".to_string()));
        }

        let ciphertext = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| Error::Crypto(format!("Invalid ciphertext encoding: {}", e)))?;
        if ciphertext.is_empty() {
            return Err(Error::Crypto("Envelope ciphertext is empty".to_string()));
        }

        let nonce: [u8; NONCE_SIZE] = STANDARD
            .decode(nonce_b64)
            .map_err(|e| Error::Crypto(format!("Invalid nonce encoding: {}", e)))?
            .try_into()
            .map_err(|_| Error::Crypto(format!("Nonce must be {} bytes", NONCE_SIZE)))?;

        Ok(Self { ciphertext, nonce })
    }
}

impl fmt::Display for EncryptedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for EncryptedEnvelope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
