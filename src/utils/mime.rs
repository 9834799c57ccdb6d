//! MIME utilities shared across modules

/// Content type for an object key, guessed from its extension. Unknown
/// extensions fall back to `application/octet-stream`.
#[must_use]
pub fn content_type_for_key(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
