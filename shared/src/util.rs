//! Small shared utilities

/// Build a url-safe slug from a display string.
///
/// Lowercases, trims, collapses every run of non-alphanumeric characters
/// into a single `-`, and strips leading/trailing dashes. The result is
/// stable across calls and safe to embed in combination keys.
pub fn to_slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for ch in s.trim().chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(lower);
        } else {
            pending_dash = true;
        }
    }
    out
}
