//! Filename extraction from URL path.

/// Extracts and percent-decodes the last path segment of a URL.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            filename_from_url_path("https://example.com/a/b/file.deb").as_deref(),
            Some("file.deb")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
    }

    #[test]
    fn ignores_query_and_fragment() {
        assert_eq!(
            filename_from_url_path("https://example.com/file.zip?token=abc#frag").as_deref(),
            Some("file.zip")
        );
    }

    #[test]
    fn trailing_slash_uses_last_directory() {
        assert_eq!(
            filename_from_url_path("https://example.com/pub/releases/").as_deref(),
            Some("releases")
        );
    }

    #[test]
    fn invalid_utf8_escape_kept_raw() {
        assert_eq!(
            filename_from_url_path("https://example.com/bad%FF.bin").as_deref(),
            Some("bad%FF.bin")
        );
    }
}
