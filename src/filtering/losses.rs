// Neutral-loss annotation.
//
// A loss is the mass shed between the precursor ion and a fragment peak:
// precursor_mz - peak_mz. Losses re-express fragmentation in terms of what
// left the molecule, which lets two compounds sharing a substructure match
// even when their fragment m/z values differ.

use tracing::warn;

use crate::spectrum::{PeakArray, Spectrum};

/// Annotate the spectrum with neutral losses inside [loss_mz_from, loss_mz_to].
///
/// Each loss keeps the intensity of the fragment peak it came from, and the
/// loss array is ascending by loss m/z. A spectrum without a precursor m/z
/// passes through unannotated with a warning.
pub fn add_losses(mut spectrum: Spectrum, loss_mz_from: f64, loss_mz_to: f64) -> Spectrum {
    let Some(precursor_mz) = spectrum.metadata.precursor_mz else {
        warn!(
            spectrum = %spectrum.display_name(),
            "Cannot derive losses without precursor m/z"
        );
        return spectrum;
    };

    let mut loss_mz = Vec::with_capacity(spectrum.peaks.len());
    let mut loss_intensities = Vec::with_capacity(spectrum.peaks.len());
    for (mz, intensity) in spectrum.peaks.iter() {
        let loss = precursor_mz - mz;
        if loss >= loss_mz_from && loss <= loss_mz_to {
            loss_mz.push(loss);
            loss_intensities.push(intensity);
        }
    }

    // Constructor re-sorts ascending by loss m/z (peaks descend toward the
    // precursor, so the raw loss order is descending).
    match PeakArray::new(loss_mz, loss_intensities) {
        Ok(losses) => spectrum.losses = Some(losses),
        Err(e) => {
            warn!(
                spectrum = %spectrum.display_name(),
                error = %e,
                "Skipping loss annotation"
            );
        }
    }

    spectrum
}
