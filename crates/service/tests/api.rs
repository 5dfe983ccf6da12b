mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use ::common::prelude::{ComponentDefinition, PipelineDefinition, Registry, Role, UploadPipeline};

use crate::common::{rot_mem_definition, setup_router};

fn json_request(method: Method, uri: &str, body: &PipelineDefinition) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_create_list_delete() {
    let (router, _store) = setup_router().await;

    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v0/pipelines", &rot_mem_definition("notes")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["pipeline"]["name"], "notes");
    assert_eq!(json["pipeline"]["definition"]["components"][0]["name"], "rot");

    let response = router.clone().oneshot(get("/api/v0/pipelines")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["pipelines"].as_array().unwrap().len(), 1);
    assert_eq!(json["pipelines"][0]["name"], "notes");

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri("/api/v0/pipelines/notes")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted"], true);

    let json = body_json(router.oneshot(get("/api/v0/pipelines")).await.unwrap()).await;
    assert!(json["pipelines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_create_conflicts() {
    let (router, _store) = setup_router().await;
    let definition = rot_mem_definition("twice");

    let first = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v0/pipelines", &definition))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(json_request(Method::POST, "/api/v0/pipelines", &definition))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_definitions_are_rejected() {
    let (router, _store) = setup_router().await;

    let unknown = PipelineDefinition::new(
        "unknown",
        vec![
            ComponentDefinition::new("zip", vec![]),
            ComponentDefinition::new("mem", vec![]),
        ],
    );
    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v0/pipelines", &unknown))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // a transformer cannot close a pipeline
    let no_sink = PipelineDefinition::new("no-sink", vec![ComponentDefinition::new("rot", vec![])]);
    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v0/pipelines", &no_sink))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // aes needs a key and an iv
    let short_params = PipelineDefinition::new(
        "short",
        vec![
            ComponentDefinition::binary("aes", &[vec![0u8; 32]]),
            ComponentDefinition::new("mem", vec![]),
        ],
    );
    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v0/pipelines", &short_params))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(router.oneshot(get("/api/v0/pipelines")).await.unwrap()).await;
    assert!(json["pipelines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_missing() {
    let (router, _store) = setup_router().await;

    let missing = router
        .clone()
        .oneshot(json_request(Method::PUT, "/api/v0/pipelines", &rot_mem_definition("later")))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v0/pipelines", &rot_mem_definition("later")))
        .await
        .unwrap();

    let replacement = PipelineDefinition::new(
        "later",
        vec![
            ComponentDefinition::new("base64", vec![]),
            ComponentDefinition::new("mem", vec![]),
        ],
    );
    let response = router
        .clone()
        .oneshot(json_request(Method::PUT, "/api/v0/pipelines", &replacement))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["pipeline"]["definition"]["components"][0]["name"], "base64");

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri("/api/v0/pipelines/nope")
        .body(Body::empty())
        .unwrap();
    assert_eq!(router.oneshot(delete).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gateway_serves_uploaded_content() {
    let (router, store) = setup_router().await;
    let registry = Registry::with_memory_store(store.clone());

    let mut pipeline = UploadPipeline::new();
    pipeline
        .add_steps(vec![
            registry.resolve(Role::Transformer, "rot", &[]).unwrap(),
            registry.resolve(Role::Sink, "mem", &[]).unwrap(),
        ])
        .unwrap();
    let url = pipeline.upload(b"hello gateway").await.unwrap();

    let response = router.oneshot(get(&format!("/{}", url))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_bytes(response).await, b"hello gateway".to_vec());
}

#[tokio::test]
async fn test_gateway_error_statuses() {
    let (router, _store) = setup_router().await;

    // not base64
    let response = router.clone().oneshot(get("/!!!")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // well formed, but the entry was never stored
    let registry = Registry::builtin();
    let mut pipeline = UploadPipeline::new();
    pipeline
        .add_steps(vec![registry.resolve(Role::Sink, "mem", &[]).unwrap()])
        .unwrap();
    let url = pipeline.upload(b"elsewhere").await.unwrap();

    let response = router.oneshot(get(&format!("/{}", url))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_status_routes() {
    let (router, _store) = setup_router().await;

    let response = router.clone().oneshot(get("/_status/livez")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router.clone().oneshot(get("/_status/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/api/v0/nothing/here")
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["msg"], "not found");
}
