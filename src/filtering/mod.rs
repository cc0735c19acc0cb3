// Per-spectrum filtering pipeline.
//
// Filters run in a fixed order; each takes a Spectrum by value and the
// disqualifying ones return Option. A None anywhere drops the spectrum from
// the analysis: downstream stages only ever see spectra that passed the
// whole chain.

mod losses;
mod metadata;
mod peaks;

pub use losses::add_losses;
pub use metadata::{add_parent_mass, default_filters, PROTON_MASS};
pub use peaks::{
    normalize_intensities, require_minimum_number_of_peaks, select_by_mz,
    select_by_relative_intensity,
};

use crate::spectrum::Spectrum;

/// Thresholds for the standard filter chain.
#[derive(Debug, Clone)]
pub struct FilterParams {
    /// Inclusive relative-intensity window (fraction of the max peak).
    pub intensity_from: f64,
    pub intensity_to: f64,
    /// Inclusive m/z window.
    pub mz_from: f64,
    pub mz_to: f64,
    /// Minimum surviving peak count; fewer drops the spectrum.
    pub min_peaks: usize,
    /// Inclusive loss m/z window for `add_losses`.
    pub loss_mz_from: f64,
    pub loss_mz_to: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            intensity_from: 0.01,
            intensity_to: 1.0,
            mz_from: 0.0,
            mz_to: 1000.0,
            min_peaks: 5,
            loss_mz_from: 0.0,
            loss_mz_to: 1000.0,
        }
    }
}

/// Run the standard filter chain on one spectrum.
///
/// Order matters: metadata harmonization and parent-mass annotation first,
/// then intensity normalization, then the windowing filters (which assume
/// normalized intensities for their thresholds), then the peak-count gate,
/// and finally loss annotation on whatever peaks survived.
pub fn apply_filters(spectrum: Spectrum, params: &FilterParams) -> Option<Spectrum> {
    let s = default_filters(spectrum);
    let s = add_parent_mass(s);
    let s = normalize_intensities(s)?;
    let s = select_by_relative_intensity(s, params.intensity_from, params.intensity_to);
    let s = select_by_mz(s, params.mz_from, params.mz_to);
    let s = require_minimum_number_of_peaks(s, params.min_peaks)?;
    Some(add_losses(s, params.loss_mz_from, params.loss_mz_to))
}

/// Filter a whole batch, dropping spectra that fail. Logs the attrition.
pub fn apply_filters_batch(spectra: Vec<Spectrum>, params: &FilterParams) -> Vec<Spectrum> {
    let total = spectra.len();
    let kept: Vec<Spectrum> = spectra
        .into_iter()
        .filter_map(|s| apply_filters(s, params))
        .collect();
    tracing::info!(
        total,
        kept = kept.len(),
        dropped = total - kept.len(),
        "Applied spectrum filters"
    );
    kept
}
