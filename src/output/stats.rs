//! Index statistics and ranking weight display

use crate::index::IndexStats;
use crate::ranking::RankingWeights;
use std::fmt::Write;

pub fn format_index_stats(stats: &IndexStats) -> String {
    let mut out = String::new();
    out.push_str("=== Index Statistics ===\n\n");
    let _ = writeln!(out, "  Documents: {}", stats.document_count);
    let _ = writeln!(out, "  Segments: {}", stats.segment_count);
    let _ = writeln!(out, "  Location: {}", stats.location.display());
    out
}

pub fn print_index_stats(stats: &IndexStats) {
    print!("{}", format_index_stats(stats));
}

/// One `key = value` line per weight, in their canonical order
pub fn format_weights(weights: &RankingWeights) -> String {
    let mut out = String::new();
    out.push_str("=== Ranking Weights ===\n\n");
    for (key, value) in weights.entries() {
        let _ = writeln!(out, "  {:<24} {:>6.2}", key, value);
    }
    out
}

pub fn print_weights(weights: &RankingWeights) {
    print!("{}", format_weights(weights));
}
