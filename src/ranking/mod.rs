//! Ranking engine
//!
//! Re-scores raw query hits with a weighted combination of:
//! - Field matches on title, meta description and headings
//! - Content TF-IDF, computed over the current result set
//! - URL matches
//! - Freshness, content-length fit and a depth penalty
//!
//! Weights are live configuration: updates apply to the next `rank` call.

mod scorer;
mod weights;

pub use scorer::{
    content_length_score, content_match_score, depth_penalty, field_match_score,
    freshness_score, tf_idf, url_match_score,
};
pub use weights::RankingWeights;

use crate::query::SearchHit;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Errors raised by weight updates
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Unknown ranking weight '{0}'")]
    UnknownWeight(String),
}

/// Unweighted component scores of one result
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub title_score: f64,
    pub content_score: f64,
    pub meta_score: f64,
    pub heading_score: f64,
    pub url_score: f64,
    pub freshness_score: f64,
    pub content_length_score: f64,
    pub depth_penalty: f64,
}

impl ScoreBreakdown {
    /// Weighted sum, with the depth penalty scaled by the magnitude of its weight
    pub fn weighted_total(&self, weights: &RankingWeights) -> f64 {
        self.title_score * weights.title_match
            + self.content_score * weights.content_match
            + self.meta_score * weights.meta_description_match
            + self.heading_score * weights.heading_match
            + self.url_score * weights.url_match
            + self.freshness_score * weights.freshness
            + self.content_length_score * weights.content_length
            - self.depth_penalty * weights.depth_penalty.abs()
    }
}

/// A search hit with its final score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub hit: SearchHit,
    pub ranking_score: f64,
    pub score_breakdown: ScoreBreakdown,
}

impl RankedResult {
    /// Wraps a hit without re-ranking: the score is the raw relevance
    pub fn unranked(hit: SearchHit) -> Self {
        Self {
            ranking_score: hit.raw_relevance,
            score_breakdown: ScoreBreakdown::default(),
            hit,
        }
    }
}

/// Multi-factor re-ranker holding the live weights
#[derive(Debug, Default)]
pub struct RankingEngine {
    weights: RwLock<RankingWeights>,
}

impl RankingEngine {
    pub fn new(weights: RankingWeights) -> Self {
        Self {
            weights: RwLock::new(weights),
        }
    }

    /// Snapshot copy of the current weights
    pub fn get_weights(&self) -> RankingWeights {
        *self.weights.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merges the named weights into the current ones
    ///
    /// All keys are checked before anything is written, so an unknown key
    /// leaves the weights untouched.
    ///
    /// # Returns
    ///
    /// The weights after the update.
    pub fn update_weights(
        &self,
        updates: &HashMap<String, f64>,
    ) -> Result<RankingWeights, RankingError> {
        if let Some(unknown) = updates
            .keys()
            .find(|key| !RankingWeights::KEYS.contains(&key.as_str()))
        {
            return Err(RankingError::UnknownWeight(unknown.clone()));
        }

        let mut weights = self.weights.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in updates {
            weights.set(key, *value);
        }
        tracing::info!("Ranking weights updated: {:?}", updates);
        Ok(*weights)
    }

    /// Ranks hits against the query using the current time for freshness
    pub fn rank(&self, hits: Vec<SearchHit>, query: &str) -> Vec<RankedResult> {
        self.rank_at(hits, query, Utc::now())
    }

    /// Ranks hits as of `now`
    ///
    /// Deterministic for fixed inputs and weights. Sorting is stable, so
    /// equal scores keep their input order.
    pub fn rank_at(
        &self,
        hits: Vec<SearchHit>,
        query: &str,
        now: DateTime<Utc>,
    ) -> Vec<RankedResult> {
        if hits.is_empty() {
            return Vec::new();
        }

        let weights = self.get_weights();
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let corpus: Vec<String> = hits
            .iter()
            .map(|hit| hit.content_snippet.to_lowercase())
            .collect();

        let mut ranked: Vec<RankedResult> = hits
            .into_iter()
            .map(|hit| {
                let breakdown = ScoreBreakdown {
                    title_score: field_match_score(&terms, &hit.title),
                    content_score: content_match_score(&terms, &hit.content_snippet, &corpus),
                    meta_score: field_match_score(&terms, &hit.meta_description),
                    heading_score: field_match_score(&terms, &hit.headings),
                    url_score: url_match_score(&terms, &hit.url),
                    freshness_score: freshness_score(hit.crawled_at, now),
                    content_length_score: content_length_score(hit.body_length),
                    depth_penalty: depth_penalty(hit.depth),
                };
                RankedResult {
                    ranking_score: breakdown.weighted_total(&weights) + hit.raw_relevance,
                    score_breakdown: breakdown,
                    hit,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.ranking_score.total_cmp(&a.ranking_score));

        tracing::info!("Ranked {} results for query: '{}'", ranked.len(), query);
        ranked
    }
}
