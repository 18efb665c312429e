//! Filesystem-safe filename sanitization.

const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename for use as a single path component.
///
/// Separators, NUL, whitespace and control characters become `_`; runs of `_`
/// collapse; leading/trailing dots, spaces and underscores are trimmed; the
/// result is cut to 255 bytes on a char boundary.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;

    for c in name.chars() {
        let mapped = if c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if mapped == '_' {
            if !last_was_underscore {
                out.push('_');
            }
            last_was_underscore = true;
        } else {
            out.push(mapped);
            last_was_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators() {
        assert_eq!(sanitize_filename("a/b\\c.txt"), "a_b_c.txt");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename("  ..  file.txt  ..  "), "file.txt");
    }

    #[test]
    fn nul_and_control_chars() {
        assert_eq!(sanitize_filename("file\x00na\x07me.txt"), "file_na_me.txt");
    }

    #[test]
    fn caps_length_on_char_boundary() {
        let long = "é".repeat(200);
        let s = sanitize_filename(&long);
        assert!(s.len() <= NAME_MAX);
        assert!(s.chars().all(|c| c == 'é'));
    }
}
