//! Filename derivation from locator URLs and content-type hints.

mod extension;
mod path;
mod sanitize;

pub use extension::extension_for_content_type;
pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename;

/// Stem used when neither the caller nor the URL yields a usable name.
pub const DEFAULT_STEM: &str = "download";

/// Derives a safe filename from the last path segment of `url`.
///
/// The segment is percent-decoded and sanitized; an empty or reserved result
/// (".", "..") falls back to [`DEFAULT_STEM`]. No extension is invented here.
///
/// - `derive_filename("https://example.com/archive.zip")` → `"archive.zip"`
/// - `derive_filename("https://example.com/")` → `"download"`
pub fn derive_filename(url: &str) -> String {
    filename_from_url_path(url)
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| is_usable(s))
        .unwrap_or_else(|| DEFAULT_STEM.to_string())
}

/// Sanitizes a caller-supplied name, falling back to [`DEFAULT_STEM`].
pub fn clean_explicit_filename(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    if is_usable(&sanitized) {
        sanitized
    } else {
        DEFAULT_STEM.to_string()
    }
}

/// True when `name` has an extension (a non-empty part after the last dot that is not the first char).
pub fn has_extension(name: &str) -> bool {
    std::path::Path::new(name).extension().is_some()
}

fn is_usable(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".."
}
