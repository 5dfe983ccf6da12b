//! AES-256-CBC with PKCS#7 padding.
//!
//! The key and initialization vector are fixed at construction, so the same
//! input always produces the same ciphertext. Both travel in the shadow URL
//! as the component's parameters.

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::component::{Component, Params};
use crate::registry::{check_arity, ResolveError};

use super::{TransformError, Transformer};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const AES_KEY_SIZE: usize = 32;
pub const AES_IV_SIZE: usize = 16;
const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AesTransformer {
    key: [u8; AES_KEY_SIZE],
    iv: [u8; AES_IV_SIZE],
}

impl AesTransformer {
    pub const NAME: &'static str = "aes";

    /// Build from a 32 byte key and a 16 byte initialization vector.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, ResolveError> {
        let key: [u8; AES_KEY_SIZE] = key.try_into().map_err(|_| {
            ResolveError::invalid_params(
                Self::NAME,
                format!("key of {} bytes, got {}", AES_KEY_SIZE, key.len()),
            )
        })?;
        let iv: [u8; AES_IV_SIZE] = iv.try_into().map_err(|_| {
            ResolveError::invalid_params(
                Self::NAME,
                format!("iv of {} bytes, got {}", AES_IV_SIZE, iv.len()),
            )
        })?;
        Ok(Self { key, iv })
    }

    /// Build from `[key, iv]`.
    pub fn from_params(params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        check_arity(Self::NAME, params, 2, "2 parameters: key and iv")?;
        Self::new(&params[0], &params[1])
    }
}

impl Component for AesTransformer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        vec![self.key.to_vec(), self.iv.to_vec()]
    }
}

impl Transformer for AesTransformer {
    fn forward(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let cipher = Aes256CbcEnc::new_from_slices(&self.key, &self.iv)
            .map_err(|e| TransformError::Cipher(e.to_string()))?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(data))
    }

    fn reverse(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
            return Err(TransformError::InvalidInput(format!(
                "ciphertext length {} is not a positive multiple of {}",
                data.len(),
                BLOCK_SIZE
            )));
        }
        let cipher = Aes256CbcDec::new_from_slices(&self.key, &self.iv)
            .map_err(|e| TransformError::Cipher(e.to_string()))?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|_| TransformError::Cipher("invalid padding".to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const KEY: &[u8; 32] = b"thereisnospoonthereisnospoonther";
    const IV: &[u8; 16] = b"abcdefghabcdefgh";

    fn transformer() -> AesTransformer {
        AesTransformer::new(KEY, IV).unwrap()
    }

    #[test]
    fn test_aes_round_trip() {
        let aes = transformer();
        let data = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

        let encrypted = aes.forward(data).unwrap();
        assert_ne!(encrypted.as_slice(), data.as_slice());
        assert_eq!(encrypted.len() % BLOCK_SIZE, 0);

        let decrypted = aes.reverse(&encrypted).unwrap();
        assert_eq!(decrypted, data.to_vec());
    }

    #[test]
    fn test_aes_block_boundaries() {
        let aes = transformer();
        for len in [0usize, 1, 15, 16, 17, 31, 32, 33] {
            let data = vec![0x5a; len];
            let encrypted = aes.forward(&data).unwrap();
            // PKCS#7 always pads, so a full block is added on exact multiples
            assert_eq!(encrypted.len(), (len / BLOCK_SIZE + 1) * BLOCK_SIZE);
            assert_eq!(aes.reverse(&encrypted).unwrap(), data);
        }
    }

    #[test]
    fn test_aes_is_deterministic() {
        let aes = transformer();
        assert_eq!(aes.forward(b"same").unwrap(), aes.forward(b"same").unwrap());
    }

    #[test]
    fn test_aes_reverse_rejects_bad_length() {
        let aes = transformer();
        assert!(matches!(
            aes.reverse(&[1u8; 15]),
            Err(TransformError::InvalidInput(_))
        ));
        assert!(matches!(aes.reverse(&[]), Err(TransformError::InvalidInput(_))));
    }

    #[test]
    fn test_aes_reverse_rejects_bad_padding() {
        let aes = transformer();
        let other = AesTransformer::new(&[7u8; 32], IV).unwrap();
        let encrypted = other.forward(b"not for this key").unwrap();
        assert!(aes.reverse(&encrypted).is_err());
    }

    #[test]
    fn test_aes_params_round_trip() {
        let aes = transformer();
        let rebuilt = AesTransformer::from_params(&aes.params()).unwrap();
        assert_eq!(rebuilt, aes);
    }

    #[test]
    fn test_aes_param_validation() {
        assert!(AesTransformer::from_params(&[KEY.to_vec()]).is_err());
        assert!(AesTransformer::new(&KEY[..16], IV).is_err());
        assert!(AesTransformer::new(KEY, &IV[..8]).is_err());
    }
}
