// Peakvec: spectral similarity scoring for tandem mass spectrometry.
//
// This is the library root. Each module corresponds to a stage of the
// scoring pipeline: import spectra, filter them, tokenize into documents,
// learn peak embeddings, and score document pairs.

pub mod config;
pub mod document;
pub mod embedding;
pub mod filtering;
pub mod importing;
pub mod output;
pub mod pipeline;
pub mod similarity;
pub mod spectrum;
