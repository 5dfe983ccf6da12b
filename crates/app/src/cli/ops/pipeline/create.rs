use std::path::PathBuf;

use clap::Args;

use service::http::api::v0::pipelines::CreatePipelineRequest;
use service::ApiError;

use super::{read_definition, DefinitionFileError};

/// Store a new pipeline from a JSON definition file
#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Path to the JSON definition
    pub file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    File(#[from] DefinitionFileError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let definition = read_definition(&self.file).await?;
        let response = ctx
            .client
            .call(CreatePipelineRequest { definition })
            .await?;
        Ok(format!(
            "created {}",
            super::summarize(&response.pipeline.definition)
        ))
    }
}
