// Skip-gram training with negative sampling.
//
// Single-threaded on purpose: peak vocabularies are a few thousand words at
// most, and a deterministic pass (fixed seed, fixed iteration order) means a
// given corpus always produces the same model file. Hogwild-style parallel
// updates would trade that reproducibility for speed we don't need.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::debug;

use super::model::{EmbeddingModel, TrainParams, VocabEntry};

/// Exponent flattening the unigram distribution for negative sampling.
const NOISE_EXPONENT: f64 = 0.75;

/// Per-epoch training summary, reported through the progress callback.
#[derive(Debug, Clone)]
pub struct EpochStats {
    /// 0-based epoch index.
    pub epoch: usize,
    pub epochs: usize,
    /// Cumulative negative-sampling loss over this epoch.
    pub loss: f64,
    /// Number of (center, context) pairs trained this epoch.
    pub pairs: u64,
}

/// Train word vectors over a corpus of token sequences.
pub fn train(corpus: &[Vec<String>], params: &TrainParams) -> Result<EmbeddingModel> {
    train_with_progress(corpus, params, |_| {})
}

/// Train, invoking `on_epoch` after every pass over the corpus.
pub fn train_with_progress(
    corpus: &[Vec<String>],
    params: &TrainParams,
    mut on_epoch: impl FnMut(&EpochStats),
) -> Result<EmbeddingModel> {
    if corpus.is_empty() {
        anyhow::bail!("Cannot train an embedding on an empty corpus");
    }
    if params.vector_size == 0 {
        anyhow::bail!("vector_size must be at least 1");
    }
    if params.window == 0 {
        anyhow::bail!("window must be at least 1");
    }

    let (vocab, index) = build_vocab(corpus, params.min_count);
    if vocab.is_empty() {
        anyhow::bail!(
            "Vocabulary is empty after applying min_count={}",
            params.min_count
        );
    }

    // Documents as vocabulary indices, unknown (below-min-count) words dropped
    let encoded: Vec<Vec<usize>> = corpus
        .iter()
        .map(|doc| doc.iter().filter_map(|w| index.get(w).copied()).collect())
        .collect();
    let corpus_words: u64 = encoded.iter().map(|d| d.len() as u64).sum();

    let noise = NoiseTable::new(&vocab);
    let mut rng = StdRng::seed_from_u64(params.seed);
    let dim = params.vector_size;

    // Input vectors small-random, output vectors zero, the usual word2vec
    // initialization.
    let mut syn0: Vec<f32> = (0..vocab.len() * dim)
        .map(|_| (rng.random::<f32>() - 0.5) / dim as f32)
        .collect();
    let mut syn1neg: Vec<f32> = vec![0.0; vocab.len() * dim];

    let total_words = (params.epochs as u64 * corpus_words).max(1);
    let mut processed: u64 = 0;
    let lr_span = params.learning_rate - params.min_learning_rate;

    for epoch in 0..params.epochs {
        let mut epoch_loss = 0.0f64;
        let mut epoch_pairs = 0u64;

        for doc in &encoded {
            let lr = params.learning_rate
                - lr_span * (processed as f32 / total_words as f32);
            let lr = lr.max(params.min_learning_rate);

            for center_pos in 0..doc.len() {
                let center = doc[center_pos];
                // Shrink the window uniformly, as word2vec does, so nearer
                // context words are weighted more in expectation
                let effective = params.window - rng.random_range(0..params.window);
                let lo = center_pos.saturating_sub(effective);
                let hi = (center_pos + effective).min(doc.len().saturating_sub(1));

                for context_pos in lo..=hi {
                    if context_pos == center_pos {
                        continue;
                    }
                    let context = doc[context_pos];
                    epoch_loss += train_pair(
                        &mut syn0,
                        &mut syn1neg,
                        dim,
                        context,
                        center,
                        lr,
                        params.negative,
                        &noise,
                        &mut rng,
                    );
                    epoch_pairs += 1;
                }
            }
            processed += doc.len() as u64;
        }

        debug!(epoch, loss = epoch_loss, pairs = epoch_pairs, "Epoch complete");
        on_epoch(&EpochStats {
            epoch,
            epochs: params.epochs,
            loss: epoch_loss,
            pairs: epoch_pairs,
        });
    }

    let vectors: Vec<Vec<f32>> = (0..vocab.len())
        .map(|i| syn0[i * dim..(i + 1) * dim].to_vec())
        .collect();
    EmbeddingModel::from_parts(params.clone(), vocab, vectors)
}

/// One positive pair plus `negative` noise draws. Input vector is the
/// context word, predicted word is the center (the word2vec convention).
/// Returns the negative-sampling loss contribution.
#[allow(clippy::too_many_arguments)]
fn train_pair(
    syn0: &mut [f32],
    syn1neg: &mut [f32],
    dim: usize,
    input: usize,
    output: usize,
    lr: f32,
    negative: usize,
    noise: &NoiseTable,
    rng: &mut StdRng,
) -> f64 {
    let l1 = input * dim;
    let mut grad_in = vec![0.0f32; dim];
    let mut loss = 0.0f64;

    for k in 0..=negative {
        let (target, label) = if k == 0 {
            (output, 1.0f32)
        } else {
            let t = noise.sample(rng);
            if t == output {
                continue;
            }
            (t, 0.0f32)
        };

        let l2 = target * dim;
        let f: f32 = (0..dim).map(|j| syn0[l1 + j] * syn1neg[l2 + j]).sum();
        let sig = sigmoid(f);
        let g = (label - sig) * lr;

        loss -= if label > 0.5 {
            (sig.max(1e-10) as f64).ln()
        } else {
            ((1.0 - sig).max(1e-10) as f64).ln()
        };

        for j in 0..dim {
            grad_in[j] += g * syn1neg[l2 + j];
            syn1neg[l2 + j] += g * syn0[l1 + j];
        }
    }

    for j in 0..dim {
        syn0[l1 + j] += grad_in[j];
    }

    loss
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Count words and order the vocabulary: descending count, ties
/// lexicographic. The tie-break keeps vocabulary indices stable across runs
/// regardless of HashMap iteration order.
fn build_vocab(
    corpus: &[Vec<String>],
    min_count: u64,
) -> (Vec<VocabEntry>, HashMap<String, usize>) {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for doc in corpus {
        for word in doc {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
    }

    let mut vocab: Vec<VocabEntry> = counts
        .into_iter()
        .filter(|&(_, c)| c >= min_count)
        .map(|(word, count)| VocabEntry {
            word: word.to_string(),
            count,
        })
        .collect();
    vocab.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));

    let index = vocab
        .iter()
        .enumerate()
        .map(|(i, e)| (e.word.clone(), i))
        .collect();
    (vocab, index)
}

/// Cumulative distribution over vocabulary indices with counts raised to
/// `NOISE_EXPONENT`, sampled by binary search.
struct NoiseTable {
    cumulative: Vec<f64>,
}

impl NoiseTable {
    fn new(vocab: &[VocabEntry]) -> Self {
        let mut cumulative = Vec::with_capacity(vocab.len());
        let mut sum = 0.0f64;
        for entry in vocab {
            sum += (entry.count as f64).powf(NOISE_EXPONENT);
            cumulative.push(sum);
        }
        Self { cumulative }
    }

    fn sample(&self, rng: &mut StdRng) -> usize {
        let total = *self.cumulative.last().unwrap_or(&0.0);
        let x = rng.random::<f64>() * total;
        self.cumulative
            .partition_point(|&c| c <= x)
            .min(self.cumulative.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Vec<String>> {
        let doc_a: Vec<String> = ["peak@100.00", "peak@200.00", "loss@50.00"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let doc_b: Vec<String> = ["peak@100.00", "peak@300.00", "loss@50.00"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        vec![doc_a, doc_b]
    }

    fn small_params() -> TrainParams {
        TrainParams {
            vector_size: 4,
            epochs: 5,
            ..TrainParams::default()
        }
    }

    #[test]
    fn vocab_order_is_count_then_lexicographic() {
        let (vocab, index) = build_vocab(&corpus(), 1);
        assert_eq!(vocab.len(), 4);
        // Count 2: loss@50.00 and peak@100.00 (lexicographic); then count 1
        assert_eq!(vocab[0].word, "loss@50.00");
        assert_eq!(vocab[1].word, "peak@100.00");
        assert_eq!(vocab[2].word, "peak@200.00");
        assert_eq!(vocab[3].word, "peak@300.00");
        assert_eq!(index["peak@100.00"], 1);
    }

    #[test]
    fn min_count_drops_rare_words() {
        let (vocab, _) = build_vocab(&corpus(), 2);
        assert_eq!(vocab.len(), 2);
        assert!(vocab.iter().all(|e| e.count >= 2));
    }

    #[test]
    fn trained_model_covers_vocabulary() {
        let model = train(&corpus(), &small_params()).unwrap();
        assert_eq!(model.vocab_size(), 4);
        for word in ["peak@100.00", "peak@200.00", "peak@300.00", "loss@50.00"] {
            let v = model.vector(word).unwrap();
            assert_eq!(v.len(), 4);
            assert!(v.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = train(&corpus(), &small_params()).unwrap();
        let b = train(&corpus(), &small_params()).unwrap();
        assert_eq!(a.vector("peak@100.00"), b.vector("peak@100.00"));
        assert_eq!(a.vector("loss@50.00"), b.vector("loss@50.00"));
    }

    #[test]
    fn different_seed_changes_vectors() {
        let a = train(&corpus(), &small_params()).unwrap();
        let params_b = TrainParams {
            seed: 99,
            ..small_params()
        };
        let b = train(&corpus(), &params_b).unwrap();
        assert_ne!(a.vector("peak@100.00"), b.vector("peak@100.00"));
    }

    #[test]
    fn empty_corpus_fails() {
        assert!(train(&[], &small_params()).is_err());
    }

    #[test]
    fn epoch_callback_fires_per_epoch() {
        let mut seen = Vec::new();
        train_with_progress(&corpus(), &small_params(), |stats| {
            seen.push(stats.epoch);
        })
        .unwrap();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn noise_table_respects_distribution_support() {
        let (vocab, _) = build_vocab(&corpus(), 1);
        let noise = NoiseTable::new(&vocab);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(noise.sample(&mut rng) < vocab.len());
        }
    }
}
