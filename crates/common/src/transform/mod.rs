//! Reversible byte-to-byte transforms.
//!
//! Every transformer must satisfy `reverse(forward(x)) == x` for any `x`
//! that `forward` accepts. `reverse` on malformed input (wrong length, bad
//! padding, failed authentication) is an error, never a panic.

mod aes;
mod base64;
mod chacha;
mod rot;

pub use self::aes::{AesTransformer, AES_IV_SIZE, AES_KEY_SIZE};
pub use self::base64::Base64Transformer;
pub use self::chacha::{ChaChaTransformer, CHACHA_KEY_SIZE, CHACHA_NONCE_SIZE};
pub use self::rot::RotTransformer;

use crate::component::Component;

/// A bidirectional, reversible pipeline step.
pub trait Transformer: Component + Send + Sync {
    /// Apply the transform (upload direction).
    fn forward(&self, data: &[u8]) -> Result<Vec<u8>, TransformError>;

    /// Undo the transform (download direction).
    fn reverse(&self, data: &[u8]) -> Result<Vec<u8>, TransformError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("base64 decode error: {0}")]
    Base64(#[from] ::base64::DecodeError),
    #[error("cipher error: {0}")]
    Cipher(String),
}
