use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::component::{Component, Params};
use crate::registry::{check_arity, ResolveError};

use super::{single_id, Sink, Source, StorageError};

/// In-process blob store backing the `mem` sink/source pair.
///
/// Cloning is cheap and every clone sees the same entries, which is what
/// lets a `mem` source find what a `mem` sink built by the same registry
/// stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under a freshly allocated id.
    pub fn insert(&self, data: &[u8]) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.entries.write().insert(id.clone(), data.to_vec());
        id
    }

    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.entries.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

pub struct MemorySink {
    store: MemoryStore,
}

impl MemorySink {
    pub const NAME: &'static str = "mem";

    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub fn from_params(store: MemoryStore, params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        check_arity(Self::NAME, params, 0, "no parameters")?;
        Ok(Self::new(store))
    }
}

impl Component for MemorySink {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn params(&self) -> Params {
        Vec::new()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn put(&self, data: &[u8]) -> Result<String, StorageError> {
        let id = self.store.insert(data);
        tracing::debug!("stored {} bytes in memory under {}", data.len(), id);
        Ok(id)
    }
}

pub struct MemorySource {
    store: MemoryStore,
    id: String,
}

impl MemorySource {
    pub fn new(store: MemoryStore, id: impl Into<String>) -> Self {
        Self {
            store,
            id: id.into(),
        }
    }

    pub fn from_params(store: MemoryStore, params: &[Vec<u8>]) -> Result<Self, ResolveError> {
        let id = single_id(MemorySink::NAME, params)?;
        Ok(Self::new(store, id))
    }
}

impl Component for MemorySource {
    fn name(&self) -> &'static str {
        MemorySink::NAME
    }

    fn params(&self) -> Params {
        vec![self.id.clone().into_bytes()]
    }
}

#[async_trait]
impl Source for MemorySource {
    async fn get(&self, id: &str) -> Result<Vec<u8>, StorageError> {
        self.store
            .get(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}
