mod pipeline;

pub use pipeline::{StoredPipeline, StoredPipelineError};
