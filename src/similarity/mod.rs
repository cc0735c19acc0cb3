// Similarity scoring between spectrum documents.

pub mod embedding;
pub mod scores;
pub mod traits;

pub use embedding::EmbeddingSimilarity;
pub use scores::{calculate_scores, rank_scores, ScorePair};
pub use traits::SimilarityScorer;
