use clap::Args;

use service::http::api::v0::pipelines::ListPipelinesRequest;
use service::ApiError;

/// List stored pipelines
#[derive(Args, Debug, Clone)]
pub struct List;

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(ListPipelinesRequest::default()).await?;

        if response.pipelines.is_empty() {
            return Ok("No pipelines found".to_string());
        }
        Ok(response
            .pipelines
            .iter()
            .map(|p| format!("{} (updated {})", super::summarize(&p.definition), p.updated_at))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
