/// Media delivery API
///
/// Serves stored objects with single-range `Range` support so browser audio
/// elements can seek. Headers are fully computed before the body stream is
/// attached; the store hands back a stream only after metadata resolution
/// succeeds.
use crate::{
    error::{Result, ServerError},
    middleware::AdminSession,
    range::{self, RangeOutcome},
    state::AppState,
};
use atelier_store::{resolve_content_type, ObjectKey, ObjectMeta};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

const CACHE_FOREVER: &str = "public, max-age=31536000, immutable";
const ALLOW_METHODS: &str = "GET, HEAD, OPTIONS";
const ALLOW_HEADERS: &str = "Range, Content-Type";
const EXPOSE_HEADERS: &str = "Content-Range, Content-Length, Accept-Ranges";

/// GET / HEAD /storage/:key
/// Stream an object, honoring a single-range `Range` header
pub async fn serve_object(
    Path(key): Path<String>,
    State(app_state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response> {
    // Invalid names (separators, traversal) cannot name a stored object
    let key = ObjectKey::new(&key)
        .map_err(|_| ServerError::NotFound("Object not found".to_string()))?;

    let meta = app_state
        .store
        .head(&key)
        .await?
        .ok_or_else(|| ServerError::NotFound("Object not found".to_string()))?;

    let content_type = resolve_content_type(key.as_str(), meta.content_type.as_deref());

    // HEAD: full-object metadata, no body; Range is not evaluated
    if method == Method::HEAD {
        return media_response(StatusCode::OK, &content_type, &meta)
            .header(header::CONTENT_LENGTH, meta.size)
            .body(Body::empty())
            .map_err(response_error);
    }

    let range_header = headers.get(header::RANGE).and_then(|h| h.to_str().ok());

    match range::evaluate(range_header, meta.size) {
        RangeOutcome::Full => {
            let stream = app_state.store.read(&key).await?;
            media_response(StatusCode::OK, &content_type, &meta)
                .header(header::CONTENT_LENGTH, meta.size)
                .body(Body::from_stream(stream))
                .map_err(response_error)
        }
        RangeOutcome::Partial { start, end } => {
            let length = end - start + 1;
            let stream = app_state.store.read_range(&key, start, length).await?;
            media_response(StatusCode::PARTIAL_CONTENT, &content_type, &meta)
                .header(header::CONTENT_LENGTH, length)
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, meta.size),
                )
                .body(Body::from_stream(stream))
                .map_err(response_error)
        }
        RangeOutcome::Unsatisfiable => {
            media_response(StatusCode::RANGE_NOT_SATISFIABLE, &content_type, &meta)
                .header(header::CONTENT_RANGE, format!("bytes */{}", meta.size))
                .body(Body::empty())
                .map_err(response_error)
        }
    }
}

/// DELETE /storage/:key - remove an object (admin only, idempotent)
pub async fn delete_object(
    Path(key): Path<String>,
    State(app_state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<serde_json::Value>> {
    let key = ObjectKey::new(&key)
        .map_err(|_| ServerError::BadRequest("Invalid object key".to_string()))?;

    app_state.store.delete(&key).await?;
    tracing::info!(key = %key, "object deleted");

    Ok(Json(json!({ "success": true })))
}

/// OPTIONS /storage/:key - CORS preflight
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
            (header::ACCESS_CONTROL_MAX_AGE, "86400"),
        ],
    )
}

/// Shared header set for 200/206/HEAD media responses
fn media_response(
    status: StatusCode,
    content_type: &str,
    meta: &ObjectMeta,
) -> axum::http::response::Builder {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ETAG, meta.etag.as_str())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, CACHE_FOREVER)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS)
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS)
        .header(header::ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSE_HEADERS)
}

fn response_error(e: axum::http::Error) -> ServerError {
    ServerError::Internal(format!("Failed to build response: {}", e))
}
