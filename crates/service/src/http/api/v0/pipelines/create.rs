use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{DefinitionError, PipelineDefinition};

use super::{PipelineInfo, PipelineResponse};
use crate::database::models::{StoredPipeline, StoredPipelineError};
use crate::http::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Request to store a new pipeline definition. The body is the definition itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatePipelineRequest {
    pub definition: PipelineDefinition,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreatePipelineRequest>,
) -> Result<impl IntoResponse, CreatePipelineError> {
    let definition = req.definition;
    definition.validate(state.registry())?;

    let stored = StoredPipeline::create(&definition, state.database())
        .await?
        .ok_or_else(|| CreatePipelineError::Conflict(definition.name.clone()))?;
    tracing::info!(name = %stored.name, "pipeline created");

    Ok((
        http::StatusCode::CREATED,
        Json(PipelineResponse {
            pipeline: PipelineInfo::try_from(stored).map_err(StoredPipelineError::from)?,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreatePipelineError {
    #[error("Invalid pipeline: {0}")]
    Invalid(#[from] DefinitionError),
    #[error("Pipeline already exists: {0}")]
    Conflict(String),
    #[error("Store error: {0}")]
    Store(#[from] StoredPipelineError),
}

impl IntoResponse for CreatePipelineError {
    fn into_response(self) -> Response {
        match self {
            CreatePipelineError::Invalid(e) => {
                (http::StatusCode::BAD_REQUEST, format!("Invalid pipeline: {}", e)).into_response()
            }
            CreatePipelineError::Conflict(name) => (
                http::StatusCode::CONFLICT,
                format!("Pipeline already exists: {}", name),
            )
                .into_response(),
            CreatePipelineError::Store(e) => {
                tracing::error!("failed to store pipeline: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for CreatePipelineRequest {
    type Response = PipelineResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/pipelines")?;
        Ok(client.post(full_url).json(&self))
    }
}
