// Cross-product scoring and ranking.
//
// References and queries are two (possibly overlapping) index ranges over
// one shared document list, so a pair can be recognized as a self-comparison
// by index identity even when distinct documents happen to share content.

use std::ops::Range;

use anyhow::Result;
use tracing::info;

use crate::document::SpectrumDocument;

use super::traits::SimilarityScorer;

/// One scored (reference, query) pair. Indices point into the shared
/// document list given to `calculate_scores`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePair {
    pub reference: usize,
    pub query: usize,
    pub score: f64,
}

/// Score every reference against every query, reference-major order.
pub fn calculate_scores(
    documents: &[SpectrumDocument],
    references: Range<usize>,
    queries: Range<usize>,
    scorer: &dyn SimilarityScorer,
) -> Result<Vec<ScorePair>> {
    if references.end > documents.len() || queries.end > documents.len() {
        anyhow::bail!(
            "Reference range {references:?} or query range {queries:?} exceeds document count {}",
            documents.len()
        );
    }

    let mut pairs = Vec::with_capacity(references.len() * queries.len());
    for r in references {
        for q in queries.clone() {
            let score = scorer.score(&documents[r], &documents[q])?;
            pairs.push(ScorePair {
                reference: r,
                query: q,
                score,
            });
        }
    }

    info!(pairs = pairs.len(), "Calculated similarity scores");
    Ok(pairs)
}

/// Drop self-comparisons (same index on both sides) and sort by descending
/// score. The sort is stable, so equal scores keep reference-major order.
pub fn rank_scores(pairs: Vec<ScorePair>) -> Vec<ScorePair> {
    let mut ranked: Vec<ScorePair> = pairs
        .into_iter()
        .filter(|p| p.reference != p.query)
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
