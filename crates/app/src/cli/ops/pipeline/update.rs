use std::path::PathBuf;

use clap::Args;

use service::http::api::v0::pipelines::UpdatePipelineRequest;
use service::ApiError;

use super::{read_definition, DefinitionFileError};

/// Replace a stored pipeline with the definition in a JSON file
#[derive(Args, Debug, Clone)]
pub struct Update {
    /// Path to the JSON definition; its name selects the pipeline
    pub file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    File(#[from] DefinitionFileError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Update {
    type Error = UpdateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let definition = read_definition(&self.file).await?;
        let response = ctx
            .client
            .call(UpdatePipelineRequest { definition })
            .await?;
        Ok(format!(
            "updated {}",
            super::summarize(&response.pipeline.definition)
        ))
    }
}
