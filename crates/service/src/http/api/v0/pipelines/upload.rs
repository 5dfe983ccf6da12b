use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{DefinitionError, PipelineError};

use crate::database::models::StoredPipeline;
use crate::http::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Upload a file through the stored pipeline `name`
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Shadow URL describing how to get the data back
    pub url: String,
    /// Gateway link for `url`, when the service knows its public address
    pub link: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadError> {
    let stored = StoredPipeline::get(&name, state.database())
        .await?
        .ok_or_else(|| UploadError::NotFound(name.clone()))?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("multipart parsing error: {}", e);
        UploadError::Multipart(e.to_string())
    })? {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != "file" {
            tracing::warn!("ignoring unknown field: {}", field_name);
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?;
        file = Some(data.to_vec());
    }
    let data = file.ok_or(UploadError::MissingFile)?;

    let pipeline = stored
        .parse_definition()
        .map_err(|e| UploadError::Corrupt(e.to_string()))?
        .build(state.registry())?;
    tracing::info!(%name, bytes = data.len(), "uploading through pipeline");

    let url = pipeline.upload(&data).await?;
    let link = state.gateway_link(&url);

    Ok((http::StatusCode::OK, Json(UploadResponse { url, link })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Pipeline not found: {0}")]
    NotFound(String),
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("Missing file field")]
    MissingFile,
    #[error("Stored definition is corrupt: {0}")]
    Corrupt(String),
    #[error("Stored definition no longer builds: {0}")]
    Definition(#[from] DefinitionError),
    #[error("Upload failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::NotFound(name) => (
                http::StatusCode::NOT_FOUND,
                format!("Pipeline not found: {}", name),
            )
                .into_response(),
            UploadError::Multipart(_) | UploadError::MissingFile => {
                (http::StatusCode::BAD_REQUEST, format!("Bad request: {}", self)).into_response()
            }
            UploadError::Pipeline(e @ PipelineError::Step { .. }) => {
                tracing::warn!("upload failed: {}", e);
                (http::StatusCode::BAD_GATEWAY, format!("Upload failed: {}", e)).into_response()
            }
            e => {
                tracing::error!("upload error: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let mut full_url = base_url.join("/api/v0/pipelines")?;
        full_url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(&self.name)
            .push("upload");
        let part = Part::bytes(self.data).file_name(self.file_name);
        Ok(client.post(full_url).multipart(Form::new().part("file", part)))
    }
}
