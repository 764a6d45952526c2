//! Helpers that keep employee data and credentials out of logs and spans.

use std::path::Path;

/// Longest server error body echoed into an error message.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// File name component only; directories may contain personal names.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Masks userinfo in a URL (`https://user:pw@host` → `https://****@host`).
pub fn redact_url(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let after_scheme = &url[scheme_end + 3..];
        let authority_end = after_scheme.find('/').unwrap_or(after_scheme.len());
        if let Some(at_pos) = after_scheme[..authority_end].rfind('@') {
            return format!(
                "{}****@{}",
                &url[..scheme_end + 3],
                &after_scheme[at_pos + 1..]
            );
        }
    }
    url.to_string()
}

/// Default dataset name: the file stem (`/x/Q1 staff.xlsx` → `Q1 staff`).
pub fn dataset_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("dataset")
        .to_string()
}

/// Truncates a response body on a char boundary.
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
