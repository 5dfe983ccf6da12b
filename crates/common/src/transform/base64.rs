use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::component::{Component, Params};
use crate::registry::{check_arity, ResolveError};

use super::{TransformError, Transformer};

/// Text-safe encoding of arbitrary bytes using the standard base64 alphabet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Base64Transformer;

impl Base64Transformer {
    pub const NAME: &'static str = "base64";

    pub fn new() -> Self {
        Self
    }

    pub fn from_params(params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        check_arity(Self::NAME, params, 0, "no parameters")?;
        Ok(Self)
    }
}

impl Component for Base64Transformer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        Vec::new()
    }
}

impl Transformer for Base64Transformer {
    fn forward(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(STANDARD.encode(data).into_bytes())
    }

    fn reverse(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(STANDARD.decode(data)?)
    }
}
