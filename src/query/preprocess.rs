//! Query string cleanup

/// Maximum characters of body text kept in a hit snippet
pub const SNIPPET_CHARS: usize = 300;

/// Strips everything except word characters, whitespace, quotes and the
/// `+ - * ( )` operators, then collapses whitespace
///
/// Stripped characters become spaces so that `foo.bar` still yields two
/// terms. An empty return value means there is nothing to search for.
pub fn sanitize_query(query: &str) -> String {
    let replaced: String = query
        .chars()
        .map(|c| if is_query_char(c) { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_query_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(c, '"' | '\'' | '+' | '-' | '*' | '(' | ')')
}

/// First [`SNIPPET_CHARS`] characters of `text`, with `...` appended when cut
pub fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
