// Embedding-based similarity: intensity-weighted document vectors compared
// by cosine.
//
// A document's vector is the sum of its word vectors, each scaled by the
// peak intensity raised to a weighting exponent. An exponent of 0.5 damps
// the dominance of base peaks; 0.0 ignores intensity entirely; 1.0 weights
// linearly. The score is the raw cosine: it can go negative and is not
// clamped, so a ranking over scores preserves the full ordering.

use anyhow::Result;
use tracing::debug;

use crate::document::SpectrumDocument;
use crate::embedding::EmbeddingModel;

use super::traits::SimilarityScorer;

/// Similarity scorer backed by a trained embedding model.
pub struct EmbeddingSimilarity<'a> {
    model: &'a EmbeddingModel,
    /// Exponent applied to peak intensities when weighting word vectors.
    pub intensity_weighting_power: f64,
    /// Highest tolerated fraction of a document's total weight carried by
    /// words missing from the vocabulary. 0.0 means any missing word is an
    /// error, the right default when the model was trained on the same
    /// corpus being scored.
    pub allowed_missing_fraction: f64,
}

impl<'a> EmbeddingSimilarity<'a> {
    pub fn new(model: &'a EmbeddingModel, intensity_weighting_power: f64) -> Self {
        Self {
            model,
            intensity_weighting_power,
            allowed_missing_fraction: 0.0,
        }
    }

    pub fn with_allowed_missing(mut self, fraction: f64) -> Self {
        self.allowed_missing_fraction = fraction;
        self
    }

    /// Weighted sum of the document's word vectors, in f64 for stable
    /// cosine computation downstream.
    pub fn document_vector(&self, doc: &SpectrumDocument) -> Result<Vec<f64>> {
        if doc.is_empty() {
            anyhow::bail!("Cannot embed an empty document");
        }

        let dim = self.model.params.vector_size;
        let mut vector = vec![0.0f64; dim];
        let mut total_weight = 0.0f64;
        let mut missing_weight = 0.0f64;
        let mut missing_words = 0usize;

        for (word, &intensity) in doc.words.iter().zip(doc.weights.iter()) {
            let weight = intensity.powf(self.intensity_weighting_power);
            total_weight += weight;
            match self.model.vector(word) {
                Some(v) => {
                    for (acc, &x) in vector.iter_mut().zip(v.iter()) {
                        *acc += weight * f64::from(x);
                    }
                }
                None => {
                    missing_weight += weight;
                    missing_words += 1;
                }
            }
        }

        if total_weight <= 0.0 {
            anyhow::bail!("Document has no positive word weights");
        }
        let missing_fraction = missing_weight / total_weight;
        if missing_fraction > self.allowed_missing_fraction {
            anyhow::bail!(
                "{} of {} words ({:.1}% of weight) are missing from the vocabulary \
                 (allowed {:.1}%); was the model trained on a different corpus?",
                missing_words,
                doc.len(),
                missing_fraction * 100.0,
                self.allowed_missing_fraction * 100.0
            );
        }
        if missing_words > 0 {
            debug!(
                missing = missing_words,
                total = doc.len(),
                "Embedding document with missing words skipped"
            );
        }

        Ok(vector)
    }
}

impl SimilarityScorer for EmbeddingSimilarity<'_> {
    fn score(&self, reference: &SpectrumDocument, query: &SpectrumDocument) -> Result<f64> {
        let a = self.document_vector(reference)?;
        let b = self.document_vector(query)?;
        cosine(&a, &b)
    }
}

/// Raw cosine between two equal-length vectors. Errors on a zero-norm
/// vector rather than inventing a score for it.
fn cosine(a: &[f64], b: &[f64]) -> Result<f64> {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = norm_a * norm_b;
    if denom < f64::EPSILON {
        anyhow::bail!("Cannot compute cosine of a zero-norm document vector");
    }
    Ok(dot / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{TrainParams, VocabEntry};
    use crate::spectrum::Metadata;

    fn model() -> EmbeddingModel {
        let params = TrainParams {
            vector_size: 2,
            ..TrainParams::default()
        };
        EmbeddingModel::from_parts(
            params,
            vec![
                VocabEntry {
                    word: "peak@100.00".to_string(),
                    count: 2,
                },
                VocabEntry {
                    word: "peak@200.00".to_string(),
                    count: 2,
                },
                VocabEntry {
                    word: "peak@300.00".to_string(),
                    count: 1,
                },
            ],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        )
        .unwrap()
    }

    fn doc(words: &[&str], weights: &[f64]) -> SpectrumDocument {
        SpectrumDocument {
            words: words.iter().map(|w| w.to_string()).collect(),
            weights: weights.to_vec(),
            metadata: Metadata::default(),
        }
    }

    #[test]
    fn document_vector_weights_by_sqrt_intensity() {
        let m = model();
        let scorer = EmbeddingSimilarity::new(&m, 0.5);
        // weights 1.0 and 0.25 -> sqrt -> 1.0 and 0.5
        let v = scorer
            .document_vector(&doc(&["peak@100.00", "peak@200.00"], &[1.0, 0.25]))
            .unwrap();
        assert!((v[0] - 1.0).abs() < 1e-12);
        assert!((v[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn score_matches_hand_computed_cosine() {
        let m = model();
        let scorer = EmbeddingSimilarity::new(&m, 0.5);
        let a = doc(&["peak@100.00", "peak@200.00"], &[1.0, 0.25]);
        let b = doc(&["peak@200.00"], &[1.0]);
        // a -> [1.0, 0.5], b -> [0.0, 1.0]: cos = 0.5 / sqrt(1.25)
        let expected = 0.5 / 1.25f64.sqrt();
        let s = scorer.score(&a, &b).unwrap();
        assert!((s - expected).abs() < 1e-12, "got {s}, expected {expected}");
    }

    #[test]
    fn zero_weighting_power_ignores_intensity() {
        let m = model();
        let scorer = EmbeddingSimilarity::new(&m, 0.0);
        let v = scorer
            .document_vector(&doc(&["peak@100.00", "peak@200.00"], &[1.0, 0.0001]))
            .unwrap();
        assert!((v[0] - 1.0).abs() < 1e-12);
        assert!((v[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn self_score_is_one() {
        let m = model();
        let scorer = EmbeddingSimilarity::new(&m, 0.5);
        let a = doc(&["peak@100.00", "peak@300.00"], &[0.8, 0.3]);
        let s = scorer.score(&a, &a).unwrap();
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn opposite_vectors_score_negative() {
        let params = TrainParams {
            vector_size: 2,
            ..TrainParams::default()
        };
        let m = EmbeddingModel::from_parts(
            params,
            vec![
                VocabEntry {
                    word: "a".to_string(),
                    count: 1,
                },
                VocabEntry {
                    word: "b".to_string(),
                    count: 1,
                },
            ],
            vec![vec![1.0, 0.0], vec![-1.0, 0.0]],
        )
        .unwrap();
        let scorer = EmbeddingSimilarity::new(&m, 0.5);
        let s = scorer
            .score(&doc(&["a"], &[1.0]), &doc(&["b"], &[1.0]))
            .unwrap();
        assert!((s + 1.0).abs() < 1e-12, "unclamped cosine should be -1, got {s}");
    }

    #[test]
    fn missing_word_is_an_error_by_default() {
        let m = model();
        let scorer = EmbeddingSimilarity::new(&m, 0.5);
        let a = doc(&["peak@100.00", "peak@999.00"], &[1.0, 1.0]);
        assert!(scorer.document_vector(&a).is_err());
    }

    #[test]
    fn missing_word_tolerated_within_allowed_fraction() {
        let m = model();
        let scorer = EmbeddingSimilarity::new(&m, 0.5).with_allowed_missing(0.6);
        // Missing word holds half the weight: within the 60% allowance
        let a = doc(&["peak@100.00", "peak@999.00"], &[1.0, 1.0]);
        let v = scorer.document_vector(&a).unwrap();
        assert!((v[0] - 1.0).abs() < 1e-12);
        assert!((v[1] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn empty_document_is_an_error() {
        let m = model();
        let scorer = EmbeddingSimilarity::new(&m, 0.5);
        assert!(scorer.document_vector(&doc(&[], &[])).is_err());
    }
}
