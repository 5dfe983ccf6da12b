use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::database::models::StoredPipeline;
use crate::http::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Request to delete a stored pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePipelineRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePipelineResponse {
    pub deleted: bool,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, DeletePipelineError> {
    if !StoredPipeline::delete(&name, state.database()).await? {
        return Err(DeletePipelineError::NotFound(name));
    }
    tracing::info!(%name, "pipeline deleted");

    Ok((http::StatusCode::OK, Json(DeletePipelineResponse { deleted: true })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeletePipelineError {
    #[error("Pipeline not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for DeletePipelineError {
    fn into_response(self) -> Response {
        match self {
            DeletePipelineError::NotFound(name) => (
                http::StatusCode::NOT_FOUND,
                format!("Pipeline not found: {}", name),
            )
                .into_response(),
            DeletePipelineError::Database(e) => {
                tracing::error!("failed to delete pipeline: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for DeletePipelineRequest {
    type Response = DeletePipelineResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let mut full_url = base_url.join("/api/v0/pipelines")?;
        full_url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(&self.name);
        Ok(client.delete(full_url))
    }
}
