//! Parse HTTP response header lines into HeadMetadata.

/// Headers of interest from a HEAD response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadMetadata {
    pub content_type: Option<String>,
}

/// Parse collected header lines into HeadMetadata.
pub(crate) fn parse_headers(lines: &[String]) -> HeadMetadata {
    let mut meta = HeadMetadata::default();
    for line in lines {
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-type") {
            meta.content_type = Some(value.to_string());
        }
    }
    meta
}
