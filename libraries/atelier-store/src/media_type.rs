//! Content-type resolution for stored objects
//!
//! The store keeps whatever content type was supplied at upload, which may
//! be absent or a generic default. Browsers need an accurate audio MIME
//! type for `Range`-based seeking to work reliably, so generic types are
//! re-resolved from the key's extension before serving.

/// Fallback type when nothing better is known
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Resolve the content type to serve for an object
///
/// Uses the stored type when it is specific. A stored
/// `application/octet-stream` is always re-resolved; a stored `audio/mpeg`
/// is re-checked against the extension because upload clients tag wav/ogg
/// files with it.
pub fn resolve_content_type(key: &str, stored: Option<&str>) -> String {
    if let Some(stored) = stored {
        if stored != OCTET_STREAM && stored != "audio/mpeg" {
            return stored.to_string();
        }
    }

    let extension = std::path::Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    if let Some(ext) = extension.as_deref() {
        if let Some(mime) = audio_type_for_extension(ext) {
            return mime.to_string();
        }
        if let Some(mime) = mime_guess::from_ext(ext).first_raw() {
            return mime.to_string();
        }
    }

    stored.unwrap_or(OCTET_STREAM).to_string()
}

/// Explicit audio mappings, checked before `mime_guess`
///
/// `m4a` maps to `audio/mp4` (not `audio/m4a`) for browser compatibility.
fn audio_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "ogg" => Some("audio/ogg"),
        "m4a" => Some("audio/mp4"),
        _ => None,
    }
}
