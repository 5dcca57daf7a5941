use super::normalize::normalize_parsed;
use url::Url;

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors (same page)
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that do not resolve to an absolute HTTP(S) URL
///
/// The result is normalized (see [`super::normalize_url`]).
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    normalize_parsed(&mut absolute).ok()?;
    Some(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    fn resolve(href: &str) -> Option<String> {
        resolve_link(href, &base_url()).map(|u| u.to_string())
    }

    #[test]
    fn test_absolute_link() {
        assert_eq!(
            resolve("https://other.com/page"),
            Some("https://other.com/page".to_string())
        );
    }

    #[test]
    fn test_root_relative_link() {
        assert_eq!(resolve("/other"), Some("https://example.com/other".to_string()));
    }

    #[test]
    fn test_path_relative_link_uses_page_url() {
        assert_eq!(
            resolve("sibling"),
            Some("https://example.com/docs/sibling".to_string())
        );
    }

    #[test]
    fn test_skips_special_schemes() {
        assert_eq!(resolve("javascript:void(0)"), None);
        assert_eq!(resolve("mailto:test@example.com"), None);
        assert_eq!(resolve("tel:+1234567890"), None);
        assert_eq!(resolve("data:text/html,<h1>x</h1>"), None);
        assert_eq!(resolve("ftp://example.com/file"), None);
    }

    #[test]
    fn test_skips_fragment_only_and_empty() {
        assert_eq!(resolve("#section"), None);
        assert_eq!(resolve("   "), None);
    }

    #[test]
    fn test_strips_fragment_from_resolved() {
        assert_eq!(
            resolve("/guide#intro"),
            Some("https://example.com/guide".to_string())
        );
    }
}
