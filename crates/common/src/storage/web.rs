use async_trait::async_trait;
use reqwest::Client;

use crate::component::{Component, Params};
use crate::registry::ResolveError;

use super::{fetch, single_id, Source, StorageError};

/// Source that downloads its data from an arbitrary URL over HTTP.
pub struct WebSource {
    client: Client,
    url: String,
}

impl WebSource {
    pub const NAME: &'static str = "web";

    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_params(client: Client, params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        let url = single_id(Self::NAME, params)?;
        Ok(Self::new(client, url))
    }
}

impl Component for WebSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        vec![self.url.clone().into_bytes()]
    }
}

#[async_trait]
impl Source for WebSource {
    async fn get(&self, id: &str) -> Result<Vec<u8>, StorageError> {
        fetch(&self.client, id).await
    }
}
