//! Authenticated encryption using ChaCha20-Poly1305
//!
//! The output format is `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//! A fresh random nonce is drawn for every `forward` call, so encrypting the
//! same input twice yields different bytes; `reverse` still recovers the
//! original and refuses anything that fails authentication.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};

use crate::component::{Component, Params};
use crate::registry::{check_arity, ResolveError};

use super::{TransformError, Transformer};

/// Size of ChaCha20-Poly1305 key in bytes (256 bits)
pub const CHACHA_KEY_SIZE: usize = 32;
/// Size of ChaCha20-Poly1305 nonce in bytes
pub const CHACHA_NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaChaTransformer {
    key: [u8; CHACHA_KEY_SIZE],
}

impl ChaChaTransformer {
    pub const NAME: &'static str = "chacha20";

    pub fn new(key: &[u8]) -> Result<Self, ResolveError> {
        let key: [u8; CHACHA_KEY_SIZE] = key.try_into().map_err(|_| {
            ResolveError::invalid_params(
                Self::NAME,
                format!("key of {} bytes, got {}", CHACHA_KEY_SIZE, key.len()),
            )
        })?;
        Ok(Self { key })
    }

    /// Generate a transformer with a new random key
    pub fn generate() -> Result<Self, TransformError> {
        let mut key = [0u8; CHACHA_KEY_SIZE];
        getrandom::getrandom(&mut key)
            .map_err(|e| TransformError::Cipher(format!("failed to generate key: {}", e)))?;
        Ok(Self { key })
    }

    pub fn from_params(params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        check_arity(Self::NAME, params, 1, "1 parameter: key")?;
        Self::new(&params[0])
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }
}

impl Component for ChaChaTransformer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        vec![self.key.to_vec()]
    }
}

impl Transformer for ChaChaTransformer {
    fn forward(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut nonce_bytes = [0u8; CHACHA_NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| TransformError::Cipher(format!("failed to generate nonce: {}", e)))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(nonce, data)
            .map_err(|_| TransformError::Cipher("encrypt error".to_string()))?;

        let mut out = Vec::with_capacity(CHACHA_NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn reverse(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        if data.len() < CHACHA_NONCE_SIZE + TAG_SIZE {
            return Err(TransformError::InvalidInput(
                "data too short for nonce and tag".to_string(),
            ));
        }
        let nonce = Nonce::from_slice(&data[..CHACHA_NONCE_SIZE]);
        self.cipher()
            .decrypt(nonce, &data[CHACHA_NONCE_SIZE..])
            .map_err(|_| TransformError::Cipher("decrypt error".to_string()))
    }
}
