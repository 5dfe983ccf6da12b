use crate::component::{Component, Params};
use crate::registry::{check_arity, ResolveError};

use super::{TransformError, Transformer};

/// ROT13 over ASCII letters. Every other byte passes through untouched, so
/// the transform is total and its own inverse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotTransformer;

impl RotTransformer {
    pub const NAME: &'static str = "rot";

    pub fn new() -> Self {
        Self
    }

    pub fn from_params(params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        check_arity(Self::NAME, params, 0, "no parameters")?;
        Ok(Self)
    }

    fn rotate(data: &[u8]) -> Vec<u8> {
        data.iter()
            .map(|&b| match b {
                b'a'..=b'z' => (b - b'a' + 13) % 26 + b'a',
                b'A'..=b'Z' => (b - b'A' + 13) % 26 + b'A',
                _ => b,
            })
            .collect()
    }
}

impl Component for RotTransformer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        Vec::new()
    }
}

impl Transformer for RotTransformer {
    fn forward(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(Self::rotate(data))
    }

    fn reverse(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(Self::rotate(data))
    }
}
