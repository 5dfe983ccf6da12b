use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::PipelineInfo;
use crate::database::models::StoredPipeline;
use crate::http::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Request to list all stored pipelines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPipelinesRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPipelinesResponse {
    pub pipelines: Vec<PipelineInfo>,
}

pub async fn handler(
    State(state): State<ServiceState>,
) -> Result<impl IntoResponse, ListPipelinesError> {
    let pipelines = StoredPipeline::list(state.database())
        .await?
        .into_iter()
        .map(PipelineInfo::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((http::StatusCode::OK, Json(ListPipelinesResponse { pipelines })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListPipelinesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Stored definition is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl IntoResponse for ListPipelinesError {
    fn into_response(self) -> Response {
        tracing::error!("failed to list pipelines: {}", self);
        (
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "Unexpected error".to_string(),
        )
            .into_response()
    }
}

impl ApiRequest for ListPipelinesRequest {
    type Response = ListPipelinesResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/pipelines")?;
        Ok(client.get(full_url))
    }
}
