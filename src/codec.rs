//! Storage codecs
//!
//! The manager encodes the serialized draft collection through a codec
//! chain before writing it, and reverses the chain on read. The bundled
//! codecs are reversible placeholder transforms: `Base64Codec` stands in
//! for real compression and `XorCodec` for real encryption. Neither reduces
//! size nor protects data; a deflate or AEAD implementation can be
//! substituted without changing the manager's contract.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Error while decoding stored data
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Decode error: {0}")]
    DecodeError(String),
}

/// Reversible byte transform applied to persisted data.
pub trait Codec: Send + Sync {
    fn encode(&self, data: &[u8]) -> Vec<u8>;
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Pass-through codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn encode(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }
}

/// Placeholder "compression" codec: base64 text encoding.
///
/// Grows the payload rather than shrinking it. Exists so the compressed
/// storage path is exercised end to end with a trivially reversible
/// transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl Codec for Base64Codec {
    fn encode(&self, data: &[u8]) -> Vec<u8> {
        BASE64.encode(data).into_bytes()
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| CodecError::DecodeError(format!("Invalid UTF-8: {}", e)))?;
        BASE64
            .decode(text.trim())
            .map_err(|e| CodecError::DecodeError(format!("Invalid base64: {}", e)))
    }
}

/// Placeholder "encryption" codec: fixed-key XOR.
///
/// A reversible obfuscation only. The `encrypted` flag on stored drafts
/// must not be read as a security guarantee while this codec is in use.
#[derive(Debug, Clone, Copy)]
pub struct XorCodec {
    key: u8,
}

impl XorCodec {
    pub fn new(key: u8) -> Self {
        Self { key }
    }
}

impl Default for XorCodec {
    fn default() -> Self {
        Self::new(0x5a)
    }
}

impl Codec for XorCodec {
    fn encode(&self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|b| b ^ self.key).collect()
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.iter().map(|b| b ^ self.key).collect())
    }
}
