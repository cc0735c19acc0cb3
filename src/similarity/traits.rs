// Similarity scorer trait, kept swap-ready.
//
// The pipeline only needs "two documents in, one number out". Keeping that
// behind a trait means the embedding-based scorer can be swapped for a
// direct peak-matching one without touching the scoring loop.

use anyhow::Result;

use crate::document::SpectrumDocument;

/// Scores how alike two spectrum documents are. Higher is more similar;
/// a document scored against itself should come out at 1.0.
pub trait SimilarityScorer {
    fn score(&self, reference: &SpectrumDocument, query: &SpectrumDocument) -> Result<f64>;
}
