//! Common helpers used throughout crm-bridge

// ============================================================================
// URL Helpers
// ============================================================================

/// Trim a base URL and make sure it ends with exactly one `/`.
///
/// Returns an empty string for empty or whitespace-only input.
pub fn ensure_trailing_slash(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Build the endpoint URL for a remote method (`<webhook><method>.json`)
pub fn method_url(webhook: &str, method: &str) -> String {
    format!("{}{}.json", ensure_trailing_slash(webhook), method.trim())
}
