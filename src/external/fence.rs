//! Markdown fence removal for model answers.

/// Removes one leading fence line (```` ``` ```` with an optional language tag)
/// and one trailing ```` ``` ````, then trims. Text without fences is only trimmed.
pub fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // The language tag runs to the end of the opening line. A one-line
        // answer like ```` ```{...}``` ```` has no tag.
        body = match rest.find('\n') {
            Some(nl) if is_language_tag(&rest[..nl]) => &rest[nl + 1..],
            _ => rest,
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

fn is_language_tag(s: &str) -> bool {
    s.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+')
}
