//! `/api/v0/pipelines`: CRUD over stored pipeline definitions, plus upload
//! through a stored pipeline.

use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use common::prelude::PipelineDefinition;

use crate::database::models::StoredPipeline;
use crate::ServiceState;

pub mod create;
pub mod delete;
pub mod list;
pub mod update;
pub mod upload;

pub use create::CreatePipelineRequest;
pub use delete::DeletePipelineRequest;
pub use list::ListPipelinesRequest;
pub use update::UpdatePipelineRequest;
pub use upload::UploadRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route(
            "/",
            get(list::handler)
                .post(create::handler)
                .put(update::handler),
        )
        .route("/:name", axum::routing::delete(delete::handler))
        .route("/:name/upload", post(upload::handler))
        .with_state(state)
}

/// A stored pipeline as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub definition: PipelineDefinition,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<StoredPipeline> for PipelineInfo {
    type Error = serde_json::Error;

    fn try_from(stored: StoredPipeline) -> Result<Self, Self::Error> {
        Ok(Self {
            definition: stored.parse_definition()?,
            name: stored.name,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }
}

/// Response carrying a single stored pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub pipeline: PipelineInfo,
}
