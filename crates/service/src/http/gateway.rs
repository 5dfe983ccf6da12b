//! Shadow URL gateway: `GET /:shadow_url` rebuilds the download pipeline
//! the URL describes, runs it and serves the recovered bytes.

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use common::prelude::{DownloadPipeline, PipelineError};

use crate::ServiceState;

const TEXT_HTML: &str = "text/html; charset=utf-8";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// How many leading bytes are inspected when sniffing a content type
const SNIFF_LEN: usize = 512;

pub async fn handler(
    State(state): State<ServiceState>,
    Path(shadow_url): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let pipeline = DownloadPipeline::from_url(&shadow_url, state.registry())?;
    tracing::info!(steps = pipeline.len(), "serving shadow url");

    let data = pipeline.download().await?;
    let content_type = sniff_content_type(&data);

    Ok(([(CONTENT_TYPE, content_type)], data))
}

/// Pick a content type from the leading bytes of `data`.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        // a multi-byte character cut at the sniff boundary is still text
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return OCTET_STREAM,
    };

    if text.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return OCTET_STREAM;
    }

    let start = text.trim_start().to_ascii_lowercase();
    if ["<!doctype html", "<html", "<head", "<body"]
        .iter()
        .any(|tag| start.starts_with(tag))
    {
        TEXT_HTML
    } else {
        TEXT_PLAIN
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Pipeline(e @ PipelineError::Step { .. }) => {
                tracing::warn!("shadow url download failed: {}", e);
                (StatusCode::BAD_GATEWAY, format!("Download failed: {}", e)).into_response()
            }
            GatewayError::Pipeline(e) => {
                tracing::debug!("invalid shadow url: {}", e);
                (StatusCode::BAD_REQUEST, format!("Invalid shadow url: {}", e)).into_response()
            }
        }
    }
}
