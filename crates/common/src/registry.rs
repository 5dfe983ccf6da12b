//! Name keyed lookup of component constructors.
//!
//! A [`Registry`] turns `(role, name, params)` into a live component. The
//! table is fixed when the registry is built and read-only afterwards, so a
//! single instance can be shared (`Arc<Registry>`) by every pipeline and
//! decode call in the process. Resolution only allocates; it never does I/O.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Client;

use crate::component::{Role, Step};
use crate::storage::{
    DropboxSink, DropboxSource, MemorySink, MemorySource, MemoryStore, PastebinSink,
    PastebinSource, Sink, Source, WebSource,
};
use crate::transform::{
    AesTransformer, Base64Transformer, ChaChaTransformer, RotTransformer, Transformer,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown {role} component: {name}")]
    UnknownComponent { name: String, role: Role },
    #[error("invalid parameters for {name}: expected {expected}")]
    InvalidParams { name: String, expected: String },
}

impl ResolveError {
    pub fn invalid_params(name: &str, expected: impl Into<String>) -> Self {
        ResolveError::InvalidParams {
            name: name.to_string(),
            expected: expected.into(),
        }
    }
}

/// Reject a parameter list whose length is not `arity`.
pub fn check_arity(
    name: &str,
    params: &[Vec<u8>],
    arity: usize,
    expected: &str,
) -> Result<(), ResolveError> {
    if params.len() != arity {
        return Err(ResolveError::invalid_params(
            name,
            format!("{}, got {}", expected, params.len()),
        ));
    }
    Ok(())
}

type Factory<T> = Box<dyn Fn(&[Vec<u8>]) -> Result<Arc<T>, ResolveError> + Send + Sync>;

pub struct Registry {
    transformers: HashMap<&'static str, Factory<dyn Transformer>>,
    sinks: HashMap<&'static str, Factory<dyn Sink>>,
    sources: HashMap<&'static str, Factory<dyn Source>>,
    memory: MemoryStore,
}

impl Registry {
    /// The built-in component table with a fresh in-memory store.
    pub fn builtin() -> Self {
        Self::with_memory_store(MemoryStore::new())
    }

    /// The built-in component table, with `mem` components bound to `memory`.
    pub fn with_memory_store(memory: MemoryStore) -> Self {
        let mut registry = Self::without_memory(memory);

        let store = registry.memory.clone();
        registry.sink(MemorySink::NAME, move |params| {
            MemorySink::from_params(store.clone(), params)
        });
        let store = registry.memory.clone();
        registry.source(MemorySink::NAME, move |params| {
            MemorySource::from_params(store.clone(), params)
        });

        registry
    }

    /// The built-in table minus the `mem` sink and source, for long running
    /// processes where an unbounded in-process store has no place.
    pub fn networked() -> Self {
        Self::without_memory(MemoryStore::new())
    }

    fn without_memory(memory: MemoryStore) -> Self {
        let client = Client::new();
        let mut registry = Self {
            transformers: HashMap::new(),
            sinks: HashMap::new(),
            sources: HashMap::new(),
            memory,
        };

        registry.transformer(AesTransformer::NAME, AesTransformer::from_params);
        registry.transformer(Base64Transformer::NAME, Base64Transformer::from_params);
        registry.transformer(ChaChaTransformer::NAME, ChaChaTransformer::from_params);
        registry.transformer(RotTransformer::NAME, RotTransformer::from_params);

        let http = client.clone();
        registry.sink(PastebinSink::NAME, move |params| {
            PastebinSink::from_params(http.clone(), params)
        });
        let http = client.clone();
        registry.source(PastebinSink::NAME, move |params| {
            PastebinSource::from_params(http.clone(), params)
        });

        let http = client.clone();
        registry.sink(DropboxSink::NAME, move |params| {
            DropboxSink::from_params(http.clone(), params)
        });
        let http = client.clone();
        registry.source(DropboxSink::NAME, move |params| {
            DropboxSource::from_params(http.clone(), params)
        });

        registry.source(WebSource::NAME, move |params| {
            WebSource::from_params(client.clone(), params)
        });

        registry
    }

    /// The store backing the `mem` sink and source.
    pub fn memory_store(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn resolve_transformer(
        &self,
        name: &str,
        params: &[Vec<u8>],
    ) -> Result<Arc<dyn Transformer>, ResolveError> {
        let factory = self
            .transformers
            .get(name)
            .ok_or_else(|| unknown(name, Role::Transformer))?;
        factory(params)
    }

    pub fn resolve_sink(&self, name: &str, params: &[Vec<u8>]) -> Result<Arc<dyn Sink>, ResolveError> {
        let factory = self
            .sinks
            .get(name)
            .ok_or_else(|| unknown(name, Role::Sink))?;
        factory(params)
    }

    pub fn resolve_source(
        &self,
        name: &str,
        params: &[Vec<u8>],
    ) -> Result<Arc<dyn Source>, ResolveError> {
        let factory = self
            .sources
            .get(name)
            .ok_or_else(|| unknown(name, Role::Source))?;
        factory(params)
    }

    /// Resolve `name` in the given role and wrap it as a pipeline [`Step`].
    pub fn resolve(&self, role: Role, name: &str, params: &[Vec<u8>]) -> Result<Step, ResolveError> {
        tracing::debug!(%role, name, params = params.len(), "resolving component");
        Ok(match role {
            Role::Transformer => Step::Transformer(self.resolve_transformer(name, params)?),
            Role::Sink => Step::Sink(self.resolve_sink(name, params)?),
            Role::Source => Step::Source(self.resolve_source(name, params)?),
        })
    }

    /// Names registered for `role`, sorted.
    pub fn names(&self, role: Role) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = match role {
            Role::Transformer => self.transformers.keys().copied().collect(),
            Role::Sink => self.sinks.keys().copied().collect(),
            Role::Source => self.sources.keys().copied().collect(),
        };
        names.sort_unstable();
        names
    }

    fn transformer<T, F>(&mut self, name: &'static str, build: F)
    where
        T: Transformer + 'static,
        F: Fn(&[Vec<u8>]) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        self.transformers.insert(
            name,
            Box::new(move |params| Ok(Arc::new(build(params)?) as Arc<dyn Transformer>)),
        );
    }

    fn sink<T, F>(&mut self, name: &'static str, build: F)
    where
        T: Sink + 'static,
        F: Fn(&[Vec<u8>]) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        self.sinks.insert(
            name,
            Box::new(move |params| Ok(Arc::new(build(params)?) as Arc<dyn Sink>)),
        );
    }

    fn source<T, F>(&mut self, name: &'static str, build: F)
    where
        T: Source + 'static,
        F: Fn(&[Vec<u8>]) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        self.sources.insert(
            name,
            Box::new(move |params| Ok(Arc::new(build(params)?) as Arc<dyn Source>)),
        );
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("transformers", &self.names(Role::Transformer))
            .field("sinks", &self.names(Role::Sink))
            .field("sources", &self.names(Role::Source))
            .finish()
    }
}

fn unknown(name: &str, role: Role) -> ResolveError {
    ResolveError::UnknownComponent {
        name: name.to_string(),
        role,
    }
}
