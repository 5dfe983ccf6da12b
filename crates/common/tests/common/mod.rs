//! Shared test utilities for pipeline integration tests
#![allow(dead_code)]

use ::common::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A registry whose `mem` components all share one store
pub fn setup_registry() -> (Registry, MemoryStore) {
    init_tracing();
    let store = MemoryStore::new();
    let registry = Registry::with_memory_store(store.clone());
    (registry, store)
}

pub fn transformer(registry: &Registry, name: &str, params: &[Vec<u8>]) -> Step {
    registry.resolve(Role::Transformer, name, params).unwrap()
}

pub fn sink(registry: &Registry, name: &str) -> Step {
    registry.resolve(Role::Sink, name, &[]).unwrap()
}

pub fn aes_key() -> Vec<u8> {
    (0u8..32).collect()
}

pub fn aes_iv() -> Vec<u8> {
    (100u8..116).collect()
}

/// Build a finalized upload pipeline from transformer steps and a `mem` sink
pub fn mem_upload_pipeline(registry: &Registry, transformers: Vec<Step>) -> UploadPipeline {
    let mut steps = transformers;
    steps.push(sink(registry, "mem"));
    let mut pipeline = UploadPipeline::new();
    pipeline.add_steps(steps).unwrap();
    pipeline
}
