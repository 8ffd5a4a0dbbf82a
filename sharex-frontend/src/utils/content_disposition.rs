//! `Content-Disposition` filename handling for downloads.

use crate::models::FileMetadata;
use once_cell::sync::Lazy;
use regex::Regex;

// Tried in order; the first match wins. Parameter names are case-sensitive.
static FILENAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"filename\*=UTF-8''([^;]+)",
        r#"filename="([^"]+)""#,
        r"filename=([^;]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Failed to compile filename pattern"))
    .collect()
});

/// Extract the filename from a `Content-Disposition` header value.
/// Matches are percent-decoded; a value that fails to decode is used as is.
pub fn filename_from_header(value: &str) -> Option<String> {
    FILENAME_PATTERNS.iter().find_map(|pattern| {
        let raw = pattern.captures(value)?.get(1)?.as_str().trim();
        if raw.is_empty() {
            return None;
        }
        Some(
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string()),
        )
    })
}

/// Header filename, else the metadata's original name, else `file-<id>`.
pub fn resolve_filename(
    header: Option<&str>,
    metadata: Option<&FileMetadata>,
    file_id: &str,
) -> String {
    header
        .and_then(filename_from_header)
        .or_else(|| {
            metadata
                .map(|m| m.original_file_name.clone())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| format!("file-{}", file_id))
}

/// `attachment` header for serving `filename` back to the browser. Carries an
/// ASCII fallback plus the exact UTF-8 name.
pub fn attachment_header(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
