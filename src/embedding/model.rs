// EmbeddingModel: trained word vectors with JSON persistence.
//
// The model file is the expensive artifact of a run: training over a large
// spectrum library takes far longer than scoring, so the workflow trains
// once and reloads the cached file on subsequent runs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Hyperparameters for embedding training.
///
/// Defaults are the values used by the reference scoring workflow; they are
/// deliberately small (5-dimensional vectors) because peak vocabularies are
/// tiny compared to natural language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    /// Dimensionality of the word vectors.
    pub vector_size: usize,
    /// Full passes over the corpus.
    pub epochs: usize,
    /// Words seen fewer times than this are dropped from the vocabulary.
    pub min_count: u64,
    /// Maximum distance between a center word and its context words.
    pub window: usize,
    /// Negative samples drawn per positive pair.
    pub negative: usize,
    /// Starting learning rate, decayed linearly to `min_learning_rate`.
    pub learning_rate: f32,
    pub min_learning_rate: f32,
    /// RNG seed. Training is single-threaded and fully deterministic for a
    /// fixed seed and corpus.
    pub seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            vector_size: 5,
            epochs: 20,
            min_count: 1,
            window: 5,
            negative: 5,
            learning_rate: 0.025,
            min_learning_rate: 1e-4,
            seed: 1,
        }
    }
}

/// One vocabulary word and its corpus frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub word: String,
    pub count: u64,
}

/// Trained word vectors plus the vocabulary and parameters that produced
/// them. Vocabulary order is descending count, ties lexicographic, stable
/// across runs so the same corpus and seed give byte-identical model files.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingModel {
    pub params: TrainParams,
    vocab: Vec<VocabEntry>,
    /// One vector per vocab entry, same order.
    vectors: Vec<Vec<f32>>,
    pub trained_at: DateTime<Utc>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl EmbeddingModel {
    /// Assemble a model from already-trained parts. Fails if the vocabulary
    /// and vector table disagree in shape.
    pub fn from_parts(
        params: TrainParams,
        vocab: Vec<VocabEntry>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if vocab.len() != vectors.len() {
            anyhow::bail!(
                "Vocabulary has {} entries but {} vectors",
                vocab.len(),
                vectors.len()
            );
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != params.vector_size) {
            anyhow::bail!(
                "Vector length {} does not match vector_size {}",
                bad.len(),
                params.vector_size
            );
        }
        let mut model = Self {
            params,
            vocab,
            vectors,
            trained_at: Utc::now(),
            index: HashMap::new(),
        };
        model.rebuild_index();
        Ok(model)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .vocab
            .iter()
            .enumerate()
            .map(|(i, e)| (e.word.clone(), i))
            .collect();
    }

    /// Vector for a word, or None if it isn't in the vocabulary.
    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&i| self.vectors[i].as_slice())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn vocab(&self) -> &[VocabEntry] {
        &self.vocab
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Write the model as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create model directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string(self).context("Failed to serialize embedding model")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write model file: {}", path.display()))?;
        info!(path = %path.display(), vocab = self.vocab.len(), "Saved embedding model");
        Ok(())
    }

    /// Load a model from JSON, validating the vector table shape.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        let mut model: Self = serde_json::from_str(&json)
            .with_context(|| format!("Malformed model file: {}", path.display()))?;
        if model.vocab.len() != model.vectors.len() {
            anyhow::bail!(
                "Corrupt model file {}: {} vocab entries vs {} vectors",
                path.display(),
                model.vocab.len(),
                model.vectors.len()
            );
        }
        if let Some(bad) = model
            .vectors
            .iter()
            .find(|v| v.len() != model.params.vector_size)
        {
            anyhow::bail!(
                "Corrupt model file {}: vector length {} vs recorded vector_size {}",
                path.display(),
                bad.len(),
                model.params.vector_size
            );
        }
        model.rebuild_index();
        info!(path = %path.display(), vocab = model.vocab.len(), "Loaded embedding model");
        Ok(model)
    }
}
