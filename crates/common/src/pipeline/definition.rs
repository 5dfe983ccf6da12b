use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::component::{Params, Role};
use crate::registry::{Registry, ResolveError};

use super::{PipelineStateError, UploadPipeline};

/// A named, storable description of an upload pipeline.
///
/// Every component but the last is a transformer; the last is the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    pub components: Vec<ComponentDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    /// Params are standard base64 rather than raw text (binary keys).
    #[serde(rename = "isParamsBase64d", default)]
    pub is_params_base64d: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("pipeline name must not be empty")]
    EmptyName,
    #[error("pipeline {0} has no components")]
    NoComponents(String),
    #[error("parameter {index} of {component} is not valid base64: {source}")]
    Base64 {
        component: String,
        index: usize,
        #[source]
        source: base64::DecodeError,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    State(#[from] PipelineStateError),
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
            is_params_base64d: false,
        }
    }

    /// Component whose binary params are stored base64 encoded.
    pub fn binary(name: impl Into<String>, params: &[Vec<u8>]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| STANDARD.encode(p)).collect(),
            is_params_base64d: true,
        }
    }

    /// The raw parameter bytes handed to the registry.
    pub fn decoded_params(&self) -> Result<Params, DefinitionError> {
        if !self.is_params_base64d {
            return Ok(self.params.iter().map(|p| p.as_bytes().to_vec()).collect());
        }
        self.params
            .iter()
            .enumerate()
            .map(|(index, p)| {
                STANDARD.decode(p).map_err(|source| DefinitionError::Base64 {
                    component: self.name.clone(),
                    index,
                    source,
                })
            })
            .collect()
    }
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>, components: Vec<ComponentDefinition>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }

    /// Resolve every component and assemble a finalized upload pipeline.
    pub fn build(&self, registry: &Registry) -> Result<UploadPipeline, DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        let (sink, transformers) = self
            .components
            .split_last()
            .ok_or_else(|| DefinitionError::NoComponents(self.name.clone()))?;

        let mut steps = Vec::with_capacity(self.components.len());
        for component in transformers {
            let params = component.decoded_params()?;
            steps.push(registry.resolve(Role::Transformer, &component.name, &params)?);
        }
        let params = sink.decoded_params()?;
        steps.push(registry.resolve(Role::Sink, &sink.name, &params)?);

        let mut pipeline = UploadPipeline::new();
        pipeline.add_steps(steps)?;
        Ok(pipeline)
    }

    /// Check that the definition builds, without keeping the result.
    pub fn validate(&self, registry: &Registry) -> Result<(), DefinitionError> {
        self.build(registry).map(|_| ())
    }
}
