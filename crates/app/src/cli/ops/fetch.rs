use std::path::PathBuf;

use clap::Args;

use service::ApiError;

/// Download the content behind a shadow URL through the service gateway
#[derive(Args, Debug, Clone)]
pub struct Fetch {
    /// Shadow URL to resolve
    pub url: String,

    /// Write the content here instead of printing it
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("content is binary ({0} bytes), use --output")]
    Binary(usize),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Fetch {
    type Error = FetchError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let data = ctx.client.fetch(&self.url).await?;

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &data)
                    .await
                    .map_err(|e| FetchError::Write(path.clone(), e))?;
                Ok(format!("wrote {} bytes to {}", data.len(), path.display()))
            }
            None => {
                let len = data.len();
                String::from_utf8(data).map_err(|_| FetchError::Binary(len))
            }
        }
    }
}
