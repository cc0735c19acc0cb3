// Peak-level filters: normalization, windowing, and the peak-count gate.

use tracing::warn;

use crate::spectrum::Spectrum;

/// Scale intensities so the largest peak is 1.0.
///
/// Returns None, disqualifying the spectrum, when there are no peaks or
/// the maximum intensity is not positive, since relative intensities would
/// be meaningless either way.
pub fn normalize_intensities(mut spectrum: Spectrum) -> Option<Spectrum> {
    let max = spectrum.peaks.max_intensity()?;
    if max <= 0.0 {
        warn!(
            spectrum = %spectrum.display_name(),
            "Cannot normalize: maximum intensity is not positive"
        );
        return None;
    }
    spectrum.peaks = spectrum.peaks.scale_intensities(1.0 / max);
    if let Some(losses) = spectrum.losses.take() {
        spectrum.losses = Some(losses.scale_intensities(1.0 / max));
    }
    Some(spectrum)
}

/// Keep peaks whose intensity relative to the current maximum lies in the
/// inclusive range [from, to].
pub fn select_by_relative_intensity(mut spectrum: Spectrum, from: f64, to: f64) -> Spectrum {
    let Some(max) = spectrum.peaks.max_intensity() else {
        return spectrum;
    };
    if max <= 0.0 {
        return spectrum;
    }
    spectrum.peaks = spectrum.peaks.retain(|_, intensity| {
        let rel = intensity / max;
        rel >= from && rel <= to
    });
    spectrum
}

/// Keep peaks whose m/z lies in the inclusive range [from, to].
pub fn select_by_mz(mut spectrum: Spectrum, from: f64, to: f64) -> Spectrum {
    spectrum.peaks = spectrum.peaks.retain(|mz, _| mz >= from && mz <= to);
    spectrum
}

/// Disqualify spectra with fewer than `n_required` peaks.
pub fn require_minimum_number_of_peaks(spectrum: Spectrum, n_required: usize) -> Option<Spectrum> {
    if spectrum.peaks.len() < n_required {
        warn!(
            spectrum = %spectrum.display_name(),
            peaks = spectrum.peaks.len(),
            required = n_required,
            "Dropping spectrum with too few peaks"
        );
        return None;
    }
    Some(spectrum)
}
