//! Per-hit score components
//!
//! Each function computes one unweighted signal. Query terms are expected
//! lowercased.

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;
const FRESHNESS_DECAY_DAYS: f64 = 30.0;
const OPTIMAL_LENGTH: f64 = 1500.0;
const LENGTH_SIGMA: f64 = 750.0;

/// Field match used for title, meta description and headings
///
/// Per term found in the field: 10 if the field is exactly the term, 5 if it
/// appears as a space-bounded word, 2 for a bare substring.
pub fn field_match_score(terms: &[String], field: &str) -> f64 {
    if field.is_empty() {
        return 0.0;
    }

    let field = field.to_lowercase();
    let padded = format!(" {} ", field);

    terms
        .iter()
        .filter(|term| field.contains(term.as_str()))
        .map(|term| {
            if *term == field {
                10.0
            } else if padded.contains(&format!(" {} ", term)) {
                5.0
            } else {
                2.0
            }
        })
        .sum()
}

/// TF-IDF of `term` in `content`, with document frequencies taken from
/// `corpus`
pub fn tf_idf(term: &str, content_lower: &str, corpus_lower: &[String]) -> f64 {
    let word_count = content_lower.split_whitespace().count();
    if word_count == 0 || corpus_lower.is_empty() {
        return 0.0;
    }

    let tf = content_lower.matches(term).count() as f64 / word_count as f64;
    let df = corpus_lower.iter().filter(|doc| doc.contains(term)).count();
    let idf = (corpus_lower.len() as f64 / (df as f64 + 1.0)).ln();
    tf * idf
}

/// Sum over terms of occurrences x TF-IDF x position bonus
///
/// `corpus_lower` is the lowercased content of every hit being ranked, so
/// IDF is local to the current result set. The position bonus falls from
/// 1.0 at the start of the content to 0.5 at its end.
pub fn content_match_score(terms: &[String], content: &str, corpus_lower: &[String]) -> f64 {
    if content.is_empty() {
        return 0.0;
    }

    let lower = content.to_lowercase();
    let length = lower.chars().count() as f64;

    terms
        .iter()
        .map(|term| {
            let occurrences = lower.matches(term.as_str()).count() as f64;
            let position_bonus = match lower.find(term.as_str()) {
                Some(byte_offset) => {
                    let offset = lower[..byte_offset].chars().count() as f64;
                    1.0 - (offset / length) * 0.5
                }
                None => 1.0,
            };
            occurrences * tf_idf(term, &lower, corpus_lower) * position_bonus
        })
        .sum()
}

/// One point per term found anywhere in the URL
pub fn url_match_score(terms: &[String], url: &str) -> f64 {
    let url = url.to_lowercase();
    terms.iter().filter(|term| url.contains(term.as_str())).count() as f64
}

/// `exp(-age_days / 30)`; 0 when the crawl time is unknown
pub fn freshness_score(crawled_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(crawled_at) = crawled_at else {
        return 0.0;
    };
    let age_days = (now - crawled_at).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
    (-age_days / FRESHNESS_DECAY_DAYS).exp()
}

/// Gaussian fit around 1500 characters, flat outside `[100, 10000]`
pub fn content_length_score(length: usize) -> f64 {
    if length < 100 {
        return 0.1;
    }
    if length > 10_000 {
        return 0.3;
    }
    let diff = length as f64 - OPTIMAL_LENGTH;
    (-(diff * diff) / (2.0 * LENGTH_SIGMA * LENGTH_SIGMA)).exp()
}

/// Unweighted depth penalty, `depth x 0.1`
pub fn depth_penalty(depth: u32) -> f64 {
    f64::from(depth) * 0.1
}
