use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Fallback for unrouted paths. Answers in JSON when the client asks for it.
pub async fn not_found_handler(uri: Uri, headers: HeaderMap) -> Response {
    tracing::debug!(path = %uri.path(), "no route matched");

    let wants_json = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if wants_json {
        let body = serde_json::json!({"msg": "not found", "path": uri.path()});
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }

    (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "text/plain")],
        format!("not found: {}", uri.path()),
    )
        .into_response()
}
