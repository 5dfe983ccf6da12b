//! Storage backends: the terminal step of an upload and the first step of
//! a download.
//!
//! A backend name usually comes as a symmetric pair: a [`Sink`] that stores
//! bytes and hands back an opaque id, and a [`Source`] of the same name that
//! takes that id and returns the bytes. A `Source` is constructed with the
//! id as its single parameter, which is how the shadow URL carries it.

mod dropbox;
mod memory;
mod pastebin;
mod web;

pub use dropbox::{DropboxSink, DropboxSource};
pub use memory::{MemorySink, MemorySource, MemoryStore};
pub use pastebin::{PastebinSink, PastebinSource, PASTEBIN_RAW_PREFIX};
pub use web::WebSource;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};

use crate::component::Component;
use crate::registry::{check_arity, ResolveError};

/// Write-side storage capability.
#[async_trait]
pub trait Sink: Component + Send + Sync {
    /// Store `data`, returning the id it can later be fetched with. An id is
    /// only returned once the backend has acknowledged the write.
    async fn put(&self, data: &[u8]) -> Result<String, StorageError>;
}

/// Read-side storage capability.
#[async_trait]
pub trait Source: Component + Send + Sync {
    /// Fetch the bytes stored under `id`.
    async fn get(&self, id: &str) -> Result<Vec<u8>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("nothing stored under id {0}")]
    NotFound(String),
    #[error("unsupported data: {0}")]
    UnsupportedData(String),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Turn a non-success response into a [`StorageError::Status`] carrying the body.
async fn ensure_success(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!(%status, "storage request failed: {}", body);
    Err(StorageError::Status { status, body })
}

/// Plain HTTP GET of `url`, returning the body bytes.
async fn fetch(client: &Client, url: &str) -> Result<Vec<u8>, StorageError> {
    tracing::info!("downloading data from {}", url);
    let response = ensure_success(client.get(url).send().await?).await?;
    let content = response.bytes().await?;
    tracing::debug!("downloaded {} bytes", content.len());
    Ok(content.to_vec())
}

/// Extract the single id parameter a source is constructed with.
fn single_id(name: &'static str, params: &[Vec<u8>]) -> Result<String, ResolveError> {
    check_arity(name, params, 1, "1 parameter: id")?;
    String::from_utf8(params[0].clone())
        .map_err(|_| ResolveError::invalid_params(name, "an id that is valid UTF-8"))
}
