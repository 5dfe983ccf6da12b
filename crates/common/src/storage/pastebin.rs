//! Pastebin backed storage.
//!
//! Uploads use the anonymous paste API with a developer key; downloads read
//! the raw paste by its key (e.g. `y1FKvrXe` in `https://pastebin.com/raw/y1FKvrXe`).

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::component::{Component, Params};
use crate::registry::{check_arity, ResolveError};

use super::{ensure_success, fetch, single_id, Sink, Source, StorageError};

/// Prefix of raw paste URLs
pub const PASTEBIN_RAW_PREFIX: &str = "https://pastebin.com/raw";
const PASTEBIN_POST_URL: &str = "https://pastebin.com/api/api_post.php";

/// `api_option` value for creating a paste
const UPLOAD_API_OPTION: &str = "paste";
/// Longest expiry the API accepts short of never (N)
const MAXIMUM_EXPIRE_TIME: &str = "1Y";
/// `api_paste_private`: 0 public, 1 unlisted, 2 private (requires login)
const PRIVACY_PUBLIC: &str = "0";

fn paste_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://pastebin\.com/([A-Za-z0-9]+)$").expect("paste url pattern is valid")
    })
}

pub struct PastebinSink {
    client: Client,
    api_key: String,
}

impl PastebinSink {
    pub const NAME: &'static str = "pastebin";

    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    pub fn from_params(client: Client, params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        check_arity(Self::NAME, params, 1, "1 parameter: pastebin developer key")?;
        let api_key = String::from_utf8(params[0].clone())
            .map_err(|_| ResolveError::invalid_params(Self::NAME, "a UTF-8 developer key"))?;
        Ok(Self::new(client, api_key))
    }
}

impl Component for PastebinSink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        vec![self.api_key.clone().into_bytes()]
    }
}

#[async_trait]
impl Sink for PastebinSink {
    async fn put(&self, data: &[u8]) -> Result<String, StorageError> {
        let content = std::str::from_utf8(data).map_err(|_| {
            StorageError::UnsupportedData(
                "pastebin only stores UTF-8 text, encode binary data first".to_string(),
            )
        })?;

        tracing::info!("uploading {} bytes to pastebin", data.len());
        let form = [
            ("api_dev_key", self.api_key.as_str()),
            ("api_option", UPLOAD_API_OPTION),
            ("api_paste_expire_date", MAXIMUM_EXPIRE_TIME),
            ("api_paste_private", PRIVACY_PUBLIC),
            ("api_paste_code", content),
        ];
        let response = self
            .client
            .post(PASTEBIN_POST_URL)
            .form(&form)
            .send()
            .await?;
        let body = ensure_success(response).await?.text().await?;

        let key = paste_url_pattern()
            .captures(body.trim())
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| StorageError::UnexpectedResponse(body.clone()))?;

        tracing::info!("created paste {}", key);
        Ok(key)
    }
}

pub struct PastebinSource {
    client: Client,
    paste_key: String,
}

impl PastebinSource {
    pub fn new(client: Client, paste_key: impl Into<String>) -> Self {
        Self {
            client,
            paste_key: paste_key.into(),
        }
    }

    pub fn from_params(client: Client, params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        let paste_key = single_id(PastebinSink::NAME, params)?;
        Ok(Self::new(client, paste_key))
    }
}

impl Component for PastebinSource {
    fn name(&self) -> &'static str {
        PastebinSink::NAME
    }

    fn params(&self) -> Params {
        vec![self.paste_key.clone().into_bytes()]
    }
}

#[async_trait]
impl Source for PastebinSource {
    async fn get(&self, id: &str) -> Result<Vec<u8>, StorageError> {
        fetch(&self.client, &format!("{}/{}", PASTEBIN_RAW_PREFIX, id)).await
    }
}
