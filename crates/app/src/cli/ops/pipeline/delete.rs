use clap::Args;

use service::http::api::v0::pipelines::DeletePipelineRequest;
use service::ApiError;

/// Delete a stored pipeline
#[derive(Args, Debug, Clone)]
pub struct Delete {
    pub name: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Delete {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client
            .call(DeletePipelineRequest {
                name: self.name.clone(),
            })
            .await?;
        Ok(format!("deleted {}", self.name))
    }
}
