use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{DefinitionError, PipelineDefinition};

use super::{PipelineInfo, PipelineResponse};
use crate::database::models::{StoredPipeline, StoredPipelineError};
use crate::http::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Request to replace the definition stored under `definition.name`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdatePipelineRequest {
    pub definition: PipelineDefinition,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<UpdatePipelineRequest>,
) -> Result<impl IntoResponse, UpdatePipelineError> {
    let definition = req.definition;
    definition.validate(state.registry())?;

    let stored = StoredPipeline::update(&definition, state.database())
        .await?
        .ok_or_else(|| UpdatePipelineError::NotFound(definition.name.clone()))?;
    tracing::info!(name = %stored.name, "pipeline updated");

    Ok((
        http::StatusCode::OK,
        Json(PipelineResponse {
            pipeline: PipelineInfo::try_from(stored).map_err(StoredPipelineError::from)?,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UpdatePipelineError {
    #[error("Invalid pipeline: {0}")]
    Invalid(#[from] DefinitionError),
    #[error("Pipeline not found: {0}")]
    NotFound(String),
    #[error("Store error: {0}")]
    Store(#[from] StoredPipelineError),
}

impl IntoResponse for UpdatePipelineError {
    fn into_response(self) -> Response {
        match self {
            UpdatePipelineError::Invalid(e) => {
                (http::StatusCode::BAD_REQUEST, format!("Invalid pipeline: {}", e)).into_response()
            }
            UpdatePipelineError::NotFound(name) => (
                http::StatusCode::NOT_FOUND,
                format!("Pipeline not found: {}", name),
            )
                .into_response(),
            UpdatePipelineError::Store(e) => {
                tracing::error!("failed to update pipeline: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for UpdatePipelineRequest {
    type Response = PipelineResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/pipelines")?;
        Ok(client.put(full_url).json(&self))
    }
}
