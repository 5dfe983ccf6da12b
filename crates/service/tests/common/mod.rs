#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use ::common::prelude::{ComponentDefinition, MemoryStore, PipelineDefinition, Registry};
use service::http;
use service::{ApiClient, Database, ServiceState};

pub const GATEWAY_URL: &str = "http://gw.example.test/";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Service state over a private in-memory database. The returned store
/// backs the `mem` sink and source.
pub async fn setup_state() -> (ServiceState, MemoryStore) {
    init_tracing();
    let store = MemoryStore::new();
    let registry = Arc::new(Registry::with_memory_store(store.clone()));
    let database = Database::in_memory().await.expect("in-memory database");
    let gateway_url = Url::parse(GATEWAY_URL).ok();
    (ServiceState::new(database, registry, gateway_url), store)
}

pub fn http_config() -> http::Config {
    http::Config::new(
        SocketAddr::from(([127, 0, 0, 1], 0)),
        tracing::Level::DEBUG,
    )
}

pub async fn setup_router() -> (Router, MemoryStore) {
    let (state, store) = setup_state().await;
    (http::router(http_config(), state), store)
}

/// A running server on an ephemeral port and a client pointed at it.
pub struct TestServer {
    pub client: ApiClient,
    pub store: MemoryStore,
    shutdown_tx: watch::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let (state, store) = setup_state().await;
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let handle = tokio::spawn(async move {
            http::serve(listener, http_config(), state, shutdown_rx)
                .await
                .expect("server");
        });

        let remote = Url::parse(&format!("http://{}/", addr)).expect("remote url");
        let client = ApiClient::new(&remote).expect("client");
        Self {
            client,
            store,
            shutdown_tx,
            handle,
        }
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

pub fn rot_mem_definition(name: &str) -> PipelineDefinition {
    PipelineDefinition::new(
        name,
        vec![
            ComponentDefinition::new("rot", vec![]),
            ComponentDefinition::new("mem", vec![]),
        ],
    )
}

pub fn encrypted_definition(name: &str) -> PipelineDefinition {
    PipelineDefinition::new(
        name,
        vec![
            ComponentDefinition::binary("aes", &[vec![3u8; 32], vec![4u8; 16]]),
            ComponentDefinition::binary("chacha20", &[vec![5u8; 32]]),
            ComponentDefinition::new("base64", vec![]),
            ComponentDefinition::new("mem", vec![]),
        ],
    )
}
