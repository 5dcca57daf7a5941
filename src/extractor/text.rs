//! Text helpers for the extractor

use scraper::{ElementRef, Node};

/// Subtrees that never contribute text
pub(crate) const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Collapses runs of whitespace (including newlines) to one space and trims the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Appends the text under `element`, skipping stripped subtrees
pub(crate) fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) if !STRIPPED_TAGS.contains(&inner.name()) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Cleaned text of an element with stripped subtrees removed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    clean_text(&raw)
}

/// True if the element is, or sits inside, a stripped subtree
pub(crate) fn is_stripped(element: ElementRef<'_>) -> bool {
    STRIPPED_TAGS.contains(&element.value().name())
        || element.ancestors().any(|node| {
            node.value()
                .as_element()
                .map_or(false, |e| STRIPPED_TAGS.contains(&e.name()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Hello \n\n  world\t!  "), "Hello world !");
        assert_eq!(clean_text("\n \t"), "");
    }

    #[test]
    fn test_element_text_skips_scripts() {
        let html = Html::parse_fragment(
            "<div id='x'>Keep <script>var drop = 1;</script><b>this</b><style>p{}</style></div>",
        );
        let selector = Selector::parse("#x").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(element_text(div), "Keep this");
    }

    #[test]
    fn test_is_stripped_checks_ancestors() {
        let html = Html::parse_document(
            "<body><nav><div class='content'>menu</div></nav><div class='content'>real</div></body>",
        );
        let selector = Selector::parse("div.content").unwrap();
        let flags: Vec<bool> = html.select(&selector).map(is_stripped).collect();
        assert_eq!(flags, vec![true, false]);
    }
}
