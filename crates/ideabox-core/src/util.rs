//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Reduce a file name to a lowercase, path-safe token while keeping its extension.
pub fn sanitize_file_name(file_name: &str) -> String {
    let trimmed = file_name.trim().trim_matches('/');
    if trimmed.is_empty() {
        return "file".to_string();
    }

    let (stem, ext) = trimmed
        .rsplit_once('.')
        .map_or((trimmed, ""), |parts| parts);
    let stem = sanitize_token(stem);
    let stem = if stem.is_empty() {
        "file".to_string()
    } else {
        stem
    };
    let ext = sanitize_token(ext);

    if ext.is_empty() {
        stem
    } else {
        format!("{stem}.{ext}")
    }
}

/// Lowercase a string and collapse every run of non-alphanumerics into one dash.
pub fn sanitize_token(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" /tmp/ideas ".to_string())),
            Some("/tmp/ideas".to_string())
        );
    }

    #[test]
    fn sanitize_file_name_keeps_extension() {
        assert_eq!(sanitize_file_name("My Photo (1).JPG"), "my-photo-1.jpg");
        assert_eq!(sanitize_file_name("   "), "file");
        assert_eq!(sanitize_file_name("notes/today.txt"), "notes-today.txt");
    }

    #[test]
    fn compact_text_truncates_long_messages() {
        let long = "x".repeat(500);
        assert_eq!(compact_text(&long).len(), 180);
    }
}
