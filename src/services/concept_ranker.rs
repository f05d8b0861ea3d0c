use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppResult;
use crate::models::concept::Concept;

const SUMMARY_WORD_LIMIT: usize = 50;
const SUBJECT_BOOST: f64 = 1.5;

/// What the caller is studying for; drives relevance ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RankQuery {
    pub text: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedConcept {
    pub concept: Concept,
    pub score: f64,
}

/// Supplies the concept set to schedule, most relevant first.
///
/// Implementations are constructed by the caller and injected; the planner
/// never creates ranking clients of its own.
pub trait ConceptRanker: Send + Sync {
    fn name(&self) -> &'static str;

    fn rank(&self, query: &RankQuery, concepts: &[Concept]) -> AppResult<Vec<RankedConcept>>;
}

/// Keeps the caller's concept list as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRanker;

impl ConceptRanker for PassthroughRanker {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn rank(&self, query: &RankQuery, concepts: &[Concept]) -> AppResult<Vec<RankedConcept>> {
        let limit = query.top_k.unwrap_or(concepts.len());
        Ok(concepts
            .iter()
            .take(limit)
            .map(|concept| RankedConcept {
                concept: concept.clone(),
                score: 1.0,
            })
            .collect())
    }
}

/// Offline word-overlap ranking (Jaccard) used when no semantic ranker is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordConceptRanker;

impl KeywordConceptRanker {
    pub fn score(query_words: &HashSet<String>, query_subject: Option<&str>, concept: &Concept) -> f64 {
        let mut concept_words = tokenize(&concept.title);
        if let Some(summary) = concept.summary.as_deref() {
            concept_words.extend(
                summary
                    .split_whitespace()
                    .take(SUMMARY_WORD_LIMIT)
                    .map(str::to_lowercase),
            );
        }

        let intersection = query_words.intersection(&concept_words).count();
        let union = query_words.union(&concept_words).count();
        if intersection == 0 || union == 0 {
            return 0.0;
        }

        let mut score = intersection as f64 / union as f64;
        let same_subject = match (query_subject, concept.subject.as_deref()) {
            (Some(wanted), Some(actual)) => wanted.trim().eq_ignore_ascii_case(actual.trim()),
            _ => false,
        };
        if same_subject {
            score *= SUBJECT_BOOST;
        }
        score
    }
}

impl ConceptRanker for KeywordConceptRanker {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn rank(&self, query: &RankQuery, concepts: &[Concept]) -> AppResult<Vec<RankedConcept>> {
        let query_words = tokenize(&query.text);
        let mut ranked: Vec<RankedConcept> = concepts
            .iter()
            .filter_map(|concept| {
                let score = Self::score(&query_words, query.subject.as_deref(), concept);
                (score > 0.0).then(|| RankedConcept {
                    concept: concept.clone(),
                    score: (score * 10_000.0).round() / 10_000.0,
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        if let Some(limit) = query.top_k {
            ranked.truncate(limit);
        }

        debug!(
            target: "app::planner::ranker",
            query = %query.text,
            candidates = concepts.len(),
            matched = ranked.len(),
            "keyword ranking complete"
        );
        Ok(ranked)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
