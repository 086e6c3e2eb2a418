//! Title normalization for generated and user-supplied titles

/// Trim whitespace and strip wrapping quote characters from a title.
///
/// Models asked for "the title only" still wrap it in quotes often enough
/// that every title, generated or supplied, passes through here. Stripping
/// repeats until a fixed point so the result is idempotent: normalizing an
/// already-normalized title returns it unchanged.
pub fn normalize_title(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let stripped = strip_wrapping_quotes(current).trim();
        if stripped == current {
            return current.to_string();
        }
        current = stripped;
    }
}

/// Strip one matching pair of leading/trailing quotes, if both are present.
fn strip_wrapping_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if s.len() >= 2 {
        let (first, last) = (bytes[0], bytes[s.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}
