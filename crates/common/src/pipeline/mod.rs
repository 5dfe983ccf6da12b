//! Upload and download pipelines.
//!
//! An [`UploadPipeline`] is zero or more transformers followed by exactly one
//! sink; appending the sink finalizes it. A [`DownloadPipeline`] starts with
//! exactly one source followed by transformers, which run in reverse. Both
//! check their shape in `add_steps`, before anything is appended, so a
//! rejected batch leaves the pipeline as it was.

mod definition;
mod download;
mod upload;

pub use definition::{ComponentDefinition, DefinitionError, PipelineDefinition};
pub use download::DownloadPipeline;
pub use upload::UploadPipeline;

use crate::component::Role;
use crate::shadow_url::CodecError;
use crate::storage::StorageError;
use crate::transform::TransformError;

/// Structural violations. These are caller mistakes and never transient.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineStateError {
    #[error("pipeline is finalized, no further steps may be added")]
    Finalized,
    #[error("sink must be final step")]
    SinkNotFinal,
    #[error("first step must be a source")]
    FirstStepNotSource,
    #[error("source must be first step")]
    SourceNotFirst,
    #[error("{role} step not allowed at position {position}")]
    UnexpectedRole { role: Role, position: usize },
    #[error("pipeline not finalized")]
    NotFinalized,
    #[error("empty pipeline")]
    Empty,
}

/// Failure of a single component call.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("source must carry exactly one UTF-8 id parameter")]
    InvalidId,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    State(#[from] PipelineStateError),
    #[error("step {index} ({name}) failed: {source}")]
    Step {
        index: usize,
        name: &'static str,
        #[source]
        source: StepError,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl PipelineError {
    fn step(index: usize, name: &'static str, source: impl Into<StepError>) -> Self {
        PipelineError::Step {
            index,
            name,
            source: source.into(),
        }
    }
}
