//! File-system safe names.
//!
//! Display names of categories, sections and article titles become folder
//! and file names. Only letters, digits, `-` and `_` survive; everything else
//! collapses into single underscores.

/// Returned for an empty name
pub const UNNAMED: &str = "Unnamed";

/// Returned when nothing usable is left after sanitizing
pub const SANITIZED_FALLBACK: &str = "Sanitized_Content";

/// Map a display name to a single safe path segment.
///
/// Total and deterministic: never panics, never returns an empty string.
///
/// ```
/// use hcmirror::core::sanitize_name;
///
/// assert_eq!(sanitize_name("Refund Policy"), "Refund_Policy");
/// assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
/// assert_eq!(sanitize_name(""), "Unnamed");
/// assert_eq!(sanitize_name("?!"), "Sanitized_Content");
/// ```
pub fn sanitize_name(name: &str) -> String {
    if name.is_empty() {
        return UNNAMED.to_string();
    }

    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect();

    let mut safe = String::with_capacity(replaced.len());
    let mut in_run = false;
    for c in replaced.trim().chars() {
        if c == ' ' || c == '_' {
            if !in_run {
                safe.push('_');
            }
            in_run = true;
        } else {
            safe.push(c);
            in_run = false;
        }
    }

    if safe.chars().all(|c| c == '_') {
        return SANITIZED_FALLBACK.to_string();
    }

    safe
}
