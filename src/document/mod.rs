// SpectrumDocument: a spectrum re-expressed as a token sequence.
//
// Each peak becomes a word like "peak@289.29" and each loss a word like
// "loss@144.56", rounded to a fixed number of decimals so that near-equal
// m/z values across spectra collapse onto the same vocabulary entry. The
// token order (peaks ascending, then losses ascending) doubles as the
// "sentence" the embedding model trains on, and each token carries its
// peak's intensity as a weight for scoring.

use crate::spectrum::{Metadata, Spectrum};

/// Default number of m/z decimals kept when forming words.
pub const DEFAULT_N_DECIMALS: usize = 2;

/// Tokenized representation of one spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumDocument {
    /// Peak words (ascending m/z) followed by loss words (ascending loss).
    pub words: Vec<String>,
    /// Intensity of the peak behind each word, same order as `words`.
    pub weights: Vec<f64>,
    /// Metadata of the source spectrum, kept for display and reporting.
    pub metadata: Metadata,
}

impl SpectrumDocument {
    /// Tokenize with the default decimal precision.
    pub fn new(spectrum: &Spectrum) -> Self {
        Self::with_decimals(spectrum, DEFAULT_N_DECIMALS)
    }

    /// Tokenize, rounding m/z values to `n_decimals` places.
    pub fn with_decimals(spectrum: &Spectrum, n_decimals: usize) -> Self {
        let capacity =
            spectrum.peaks.len() + spectrum.losses.as_ref().map_or(0, |l| l.len());
        let mut words = Vec::with_capacity(capacity);
        let mut weights = Vec::with_capacity(capacity);

        for (mz, intensity) in spectrum.peaks.iter() {
            words.push(format!("peak@{mz:.n_decimals$}"));
            weights.push(intensity);
        }
        if let Some(losses) = &spectrum.losses {
            for (mz, intensity) in losses.iter() {
                words.push(format!("loss@{mz:.n_decimals$}"));
                weights.push(intensity);
            }
        }

        Self {
            words,
            weights,
            metadata: spectrum.metadata.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
