use crate::ranking::RankedResult;
use std::fmt::Write;

/// Formats ranked results as a numbered list
///
/// With `show_breakdown`, each result is followed by its non-zero score
/// components.
pub fn format_results(query: &str, results: &[RankedResult], show_breakdown: bool) -> String {
    let mut out = String::new();

    if results.is_empty() {
        let _ = writeln!(out, "No results for '{}'", query);
        return out;
    }

    let _ = writeln!(out, "=== {} results for '{}' ===\n", results.len(), query);

    for (position, result) in results.iter().enumerate() {
        let hit = &result.hit;
        let _ = writeln!(out, "{}. {}", position + 1, hit.title);
        let _ = writeln!(out, "   {}", hit.url);
        if !hit.meta_description.is_empty() {
            let _ = writeln!(out, "   {}", hit.meta_description);
        } else if !hit.content_snippet.is_empty() {
            let _ = writeln!(out, "   {}", hit.content_snippet);
        }
        let _ = writeln!(
            out,
            "   score {:.3} (relevance {:.3}, depth {})",
            result.ranking_score, hit.raw_relevance, hit.depth
        );

        if show_breakdown {
            let b = &result.score_breakdown;
            let components = [
                ("title", b.title_score),
                ("content", b.content_score),
                ("meta", b.meta_score),
                ("heading", b.heading_score),
                ("url", b.url_score),
                ("freshness", b.freshness_score),
                ("length", b.content_length_score),
                ("depth", -b.depth_penalty),
            ];
            let parts: Vec<String> = components
                .iter()
                .filter(|(_, value)| *value != 0.0)
                .map(|(name, value)| format!("{}={:.3}", name, value))
                .collect();
            if !parts.is_empty() {
                let _ = writeln!(out, "   [{}]", parts.join(" "));
            }
        }
        out.push('\n');
    }

    out
}

pub fn print_results(query: &str, results: &[RankedResult], show_breakdown: bool) {
    print!("{}", format_results(query, results, show_breakdown));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchHit;
    use crate::ranking::ScoreBreakdown;

    fn result() -> RankedResult {
        RankedResult {
            hit: SearchHit {
                url: "https://a.test/".to_string(),
                title: "API Guide".to_string(),
                content_snippet: "All about the API".to_string(),
                meta_description: String::new(),
                headings: String::new(),
                raw_relevance: 1.25,
                body_length: 17,
                crawled_at: None,
                depth: 0,
            },
            ranking_score: 16.5,
            score_breakdown: ScoreBreakdown {
                title_score: 5.0,
                ..ScoreBreakdown::default()
            },
        }
    }

    #[test]
    fn test_format_results() {
        let text = format_results("api", &[result()], true);
        assert!(text.contains("1. API Guide"));
        assert!(text.contains("https://a.test/"));
        assert!(text.contains("All about the API"));
        assert!(text.contains("score 16.500"));
        assert!(text.contains("[title=5.000]"));
    }

    #[test]
    fn test_format_no_results() {
        assert_eq!(format_results("zzz", &[], false), "No results for 'zzz'\n");
    }
}
