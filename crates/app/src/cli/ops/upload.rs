use std::path::PathBuf;

use clap::Args;

use service::http::api::v0::pipelines::UploadRequest;
use service::ApiError;

/// Upload a file through a stored pipeline and print its shadow URL
#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Name of the stored pipeline
    pub pipeline: String,

    /// File to upload
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| UploadError::Read(self.path.clone(), e))?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let response = ctx
            .client
            .call(UploadRequest {
                name: self.pipeline.clone(),
                file_name,
                data,
            })
            .await?;

        Ok(match response.link {
            Some(link) => format!("{}\n{}", response.url, link),
            None => response.url,
        })
    }
}
