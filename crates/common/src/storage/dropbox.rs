//! Dropbox backed storage.
//!
//! The sink uploads under a random file name and then creates a public
//! shared link for it. The link (rewritten to its direct-download form) is
//! the id; the source simply downloads it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::component::{Component, Params};
use crate::registry::{check_arity, ResolveError};

use super::{ensure_success, fetch, single_id, Sink, Source, StorageError};

const DROPBOX_API_URL_UPLOAD: &str = "https://content.dropboxapi.com/2/files/upload";
const DROPBOX_API_URL_CREATE_SHARED_LINK: &str =
    "https://api.dropboxapi.com/2/sharing/create_shared_link_with_settings";

/// Write mode that never overwrites: a conflicting name gets renamed
const UPLOAD_MODE_ADD: &str = "add";
/// Link holders may view (and download) but not edit
const SHARED_LINK_ACCESS_VIEWER: &str = "viewer";
/// Anyone with the link may open it
const SHARED_LINK_AUDIENCE_PUBLIC: &str = "public";

/// Number of random bytes in a generated file name
const RANDOM_FILENAME_BYTES: usize = 16;

#[derive(Debug, Serialize)]
struct UploadArg {
    autorename: bool,
    mode: &'static str,
    mute: bool,
    path: String,
    strict_conflict: bool,
}

#[derive(Debug, Serialize)]
struct SharedLinkSettings {
    access: &'static str,
    allow_download: bool,
    audience: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateSharedLinkRequest {
    path: String,
    settings: SharedLinkSettings,
}

#[derive(Debug, Deserialize)]
struct CreateSharedLinkResponse {
    url: String,
}

pub struct DropboxSink {
    client: Client,
    access_token: String,
}

impl DropboxSink {
    pub const NAME: &'static str = "dropbox";

    pub fn new(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }

    pub fn from_params(client: Client, params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        check_arity(Self::NAME, params, 1, "1 parameter: Dropbox access token")?;
        let token = String::from_utf8(params[0].clone())
            .map_err(|_| ResolveError::invalid_params(Self::NAME, "a UTF-8 access token"))?;
        Ok(Self::new(client, token))
    }

    async fn upload(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let arg = serde_json::to_string(&UploadArg {
            autorename: false,
            mode: UPLOAD_MODE_ADD,
            mute: true,
            path: path.to_string(),
            strict_conflict: true,
        })?;

        let response = self
            .client
            .post(DROPBOX_API_URL_UPLOAD)
            .bearer_auth(&self.access_token)
            .header("Dropbox-API-Arg", arg)
            .header("Content-Type", "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn create_shared_link(&self, path: &str) -> Result<String, StorageError> {
        let request = CreateSharedLinkRequest {
            path: path.to_string(),
            settings: SharedLinkSettings {
                access: SHARED_LINK_ACCESS_VIEWER,
                allow_download: true,
                audience: SHARED_LINK_AUDIENCE_PUBLIC,
            },
        };

        let response = self
            .client
            .post(DROPBOX_API_URL_CREATE_SHARED_LINK)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;
        let link: CreateSharedLinkResponse = serde_json::from_str(&body)?;
        Ok(direct_download_link(&link.url))
    }
}

impl Component for DropboxSink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        vec![self.access_token.clone().into_bytes()]
    }
}

#[async_trait]
impl Sink for DropboxSink {
    async fn put(&self, data: &[u8]) -> Result<String, StorageError> {
        let path = format!("/{}", random_filename()?);

        tracing::info!("uploading {} bytes to Dropbox as {}", data.len(), path);
        self.upload(&path, data).await?;

        tracing::info!("creating shared link for {}", path);
        let link = self.create_shared_link(&path).await?;
        tracing::info!("shared link created: {}", link);
        Ok(link)
    }
}

pub struct DropboxSource {
    client: Client,
    link: String,
}

impl DropboxSource {
    pub fn new(client: Client, link: impl Into<String>) -> Self {
        Self {
            client,
            link: link.into(),
        }
    }

    pub fn from_params(client: Client, params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        let link = single_id(DropboxSink::NAME, params)?;
        Ok(Self::new(client, link))
    }
}

impl Component for DropboxSource {
    fn name(&self) -> &'static str {
        DropboxSink::NAME
    }

    fn params(&self) -> Params {
        vec![self.link.clone().into_bytes()]
    }
}

#[async_trait]
impl Source for DropboxSource {
    async fn get(&self, id: &str) -> Result<Vec<u8>, StorageError> {
        fetch(&self.client, id).await
    }
}

/// Shared links end in `dl=0` (preview page); `dl=1` serves the raw file.
fn direct_download_link(link: &str) -> String {
    match link.strip_suffix("dl=0") {
        Some(prefix) => format!("{}dl=1", prefix),
        None => link.to_string(),
    }
}

fn random_filename() -> Result<String, StorageError> {
    let mut bytes = [0u8; RANDOM_FILENAME_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| {
        StorageError::UnsupportedData(format!("failed to generate file name: {}", e))
    })?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_download_link() {
        assert_eq!(
            direct_download_link("https://www.dropbox.com/s/abc/f?dl=0"),
            "https://www.dropbox.com/s/abc/f?dl=1"
        );
        assert_eq!(
            direct_download_link("https://www.dropbox.com/s/abc/f?raw=1"),
            "https://www.dropbox.com/s/abc/f?raw=1"
        );
    }

    #[test]
    fn test_random_filename() {
        let name = random_filename().unwrap();
        assert_eq!(name.len(), RANDOM_FILENAME_BYTES * 2);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(name, random_filename().unwrap());
    }

    #[test]
    fn test_upload_arg_shape() {
        let arg = UploadArg {
            autorename: false,
            mode: UPLOAD_MODE_ADD,
            mute: true,
            path: "/abc".to_string(),
            strict_conflict: true,
        };
        let json: serde_json::Value = serde_json::to_value(&arg).unwrap();
        assert_eq!(json["mode"], "add");
        assert_eq!(json["path"], "/abc");
        assert_eq!(json["strict_conflict"], true);
    }
}
