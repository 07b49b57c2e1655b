use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Content type used when an extension is unknown or missing
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension (without the dot, lower-case) to content type
const MIME_TYPES: &[(&str, &str)] = &[
    // Text types
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    // Application types
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("tar", "application/x-tar"),
    ("gz", "application/gzip"),
    ("wasm", "application/wasm"),
    // Image types
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    // Audio and video types
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    // Font types
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
];

/// Built once on first use, read-only afterwards
fn content_type_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| MIME_TYPES.iter().copied().collect())
}

/// Resolve an extension such as `.HTML` or `png` to a content type
pub fn resolve(extension: &str) -> &'static str {
    let ext = extension.strip_prefix('.').unwrap_or(extension).to_ascii_lowercase();
    content_type_map()
        .get(ext.as_str())
        .copied()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Get the content type for a file based on its extension
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map(resolve)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
