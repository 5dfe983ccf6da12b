use crate::component::{Role, Step};
use crate::shadow_url;

use super::{PipelineError, PipelineStateError};

/// Transformers followed by a terminal sink.
#[derive(Debug, Clone, Default)]
pub struct UploadPipeline {
    steps: Vec<Step>,
    finalized: bool,
}

impl UploadPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether a sink has been appended.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Append a batch of steps. A sink may only be the last element of the
    /// batch, and appending it finalizes the pipeline.
    pub fn add_steps(&mut self, steps: Vec<Step>) -> Result<(), PipelineStateError> {
        if self.finalized {
            return Err(PipelineStateError::Finalized);
        }

        let last = steps.len().saturating_sub(1);
        for (i, step) in steps.iter().enumerate() {
            match step.role() {
                Role::Transformer => {}
                Role::Sink if i == last => {}
                Role::Sink => return Err(PipelineStateError::SinkNotFinal),
                Role::Source => {
                    return Err(PipelineStateError::UnexpectedRole {
                        role: Role::Source,
                        position: self.steps.len() + i,
                    })
                }
            }
        }

        self.finalized = steps.last().is_some_and(Step::is_sink);
        self.steps.extend(steps);
        Ok(())
    }

    /// Run every transformer forward, store the result with the sink and
    /// return the shadow URL describing how to get it back.
    pub async fn upload(&self, data: &[u8]) -> Result<String, PipelineError> {
        if !self.finalized {
            return Err(PipelineStateError::NotFinalized.into());
        }

        let mut data = data.to_vec();
        let mut id = None;
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, name = step.name(), bytes = data.len(), "upload step");
            match step {
                Step::Transformer(transformer) => {
                    data = transformer
                        .forward(&data)
                        .map_err(|e| PipelineError::step(index, step.name(), e))?;
                }
                Step::Sink(sink) => {
                    id = Some(
                        sink.put(&data)
                            .await
                            .map_err(|e| PipelineError::step(index, step.name(), e))?,
                    );
                }
                // add_steps never lets a source in
                Step::Source(_) => {
                    return Err(PipelineStateError::UnexpectedRole {
                        role: Role::Source,
                        position: index,
                    }
                    .into())
                }
            }
        }

        let id = id.ok_or(PipelineStateError::NotFinalized)?;
        let url = shadow_url::encode(&self.steps, &id)?;
        tracing::info!(steps = self.steps.len(), "upload complete");
        Ok(url)
    }
}
