//! Ranking weights

use serde::{Deserialize, Serialize};

/// The eight ranking knobs, keyed by their external names
///
/// `depth_penalty` is stored negative; only its magnitude is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub title_match: f64,
    pub content_match: f64,
    pub meta_description_match: f64,
    pub heading_match: f64,
    pub url_match: f64,
    pub freshness: f64,
    pub content_length: f64,
    pub depth_penalty: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            title_match: 3.0,
            content_match: 1.0,
            meta_description_match: 2.0,
            heading_match: 2.5,
            url_match: 1.5,
            freshness: 1.0,
            content_length: 0.5,
            depth_penalty: -0.2,
        }
    }
}

impl RankingWeights {
    /// Every weight key accepted by [`RankingWeights::set`]
    pub const KEYS: [&'static str; 8] = [
        "title_match",
        "content_match",
        "meta_description_match",
        "heading_match",
        "url_match",
        "freshness",
        "content_length",
        "depth_penalty",
    ];

    /// `(key, value)` pairs in [`RankingWeights::KEYS`] order
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("title_match", self.title_match),
            ("content_match", self.content_match),
            ("meta_description_match", self.meta_description_match),
            ("heading_match", self.heading_match),
            ("url_match", self.url_match),
            ("freshness", self.freshness),
            ("content_length", self.content_length),
            ("depth_penalty", self.depth_penalty),
        ]
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Overwrites one weight; returns false for an unknown key
    pub fn set(&mut self, key: &str, value: f64) -> bool {
        let slot = match key {
            "title_match" => &mut self.title_match,
            "content_match" => &mut self.content_match,
            "meta_description_match" => &mut self.meta_description_match,
            "heading_match" => &mut self.heading_match,
            "url_match" => &mut self.url_match,
            "freshness" => &mut self.freshness,
            "content_length" => &mut self.content_length,
            "depth_penalty" => &mut self.depth_penalty,
            _ => return false,
        };
        *slot = value;
        true
    }
}
