/// Object upload API
use crate::{
    error::{Result, ServerError},
    middleware::AdminSession,
    state::AppState,
};
use atelier_store::ObjectKey;
use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Streaming path for the stored object
    pub url: String,
    /// Minted object key
    pub file_name: String,
}

/// POST /upload
/// Store a multipart `file` field under a freshly minted key (admin only)
pub async fn upload(
    State(app_state): State<AppState>,
    _admin: AdminSession,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServerError::BadRequest("Missing Content-Type".to_string()))?;

    if !content_type.starts_with("multipart/form-data") {
        return Err(ServerError::BadRequest(
            "Expected multipart/form-data".to_string(),
        ));
    }

    let boundary = content_type
        .split("boundary=")
        .nth(1)
        .ok_or_else(|| ServerError::BadRequest("Missing boundary".to_string()))?;

    // Convert Bytes to a stream for multer
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut file_data: Option<Bytes> = None;
    let mut file_extension: Option<String> = None;
    let mut file_content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Failed to parse multipart: {}", e)))?
    {
        if field.name() == Some("file") {
            file_extension = field.file_name().and_then(|name| {
                std::path::Path::new(name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
            });
            file_content_type = field.content_type().map(|m| m.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read file: {}", e)))?,
            );
        }
    }

    let data = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    // Mint a fresh key; the original filename is never trusted beyond its
    // extension
    let id = Uuid::new_v4();
    let key_name = match file_extension {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    };
    let key = ObjectKey::new(&key_name)
        .map_err(|_| ServerError::BadRequest("Invalid file name".to_string()))?;

    app_state
        .store
        .put(&key, file_content_type.as_deref(), data)
        .await?;

    tracing::info!(key = %key, "object uploaded");

    Ok(Json(UploadResponse {
        url: format!("/storage/{key}"),
        file_name: key_name,
    }))
}
