// Word embeddings over spectrum-document tokens.
//
// The model maps peak/loss words to dense vectors; the trainer learns them
// from co-occurrence within documents (skip-gram with negative sampling).

pub mod model;
pub mod train;

pub use model::{EmbeddingModel, TrainParams, VocabEntry};
pub use train::{train, train_with_progress, EpochStats};
