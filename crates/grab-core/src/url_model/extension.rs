//! Content-Type → file extension hints for extensionless names.

/// Maps a `Content-Type` header value to an extension (without the dot).
/// Parameters such as `; charset=utf-8` are ignored. Unknown types yield `None`.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if mime.is_empty() {
        return None;
    }
    let ext = match mime.as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "text/html" => "html",
        "text/csv" => "csv",
        "application/json" => "json",
        "application/zip" => "zip",
        "application/gzip" | "application/x-gzip" => "gz",
        "application/octet-stream" => "bin",
        m if m.starts_with("image/") => "jpg",
        m if m.contains("pdf") => "pdf",
        m if m.starts_with("text/") => "txt",
        _ => return None,
    };
    Some(ext)
}
