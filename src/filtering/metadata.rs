// Metadata harmonization filters.
//
// Source files disagree about how they record polarity and charge: some give
// an ion mode, some only an adduct string, some a charge whose sign
// contradicts the stated mode. These filters settle the disagreements before
// anything numeric depends on them.

use regex_lite::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::spectrum::{IonMode, Spectrum};

/// Mass of a proton in Da. Used to step between the measured precursor ion
/// m/z and the neutral parent mass.
pub const PROTON_MASS: f64 = 1.007_276_466_88;

/// Trailing-sign matcher for adduct strings like "[M+H]+" or "[M-H]1-".
fn adduct_sign_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\](\d*)([+-])$").expect("valid adduct regex"))
}

/// Standard metadata harmonization.
///
/// - Derives the ion mode from the adduct suffix, or from the charge sign,
///   when the file didn't state one.
/// - Corrects the charge to agree with the ion mode: flips a contradicting
///   sign, and defaults to +1 or -1 when the charge is missing entirely.
pub fn default_filters(mut spectrum: Spectrum) -> Spectrum {
    let meta = &mut spectrum.metadata;

    if meta.ionmode.is_none() {
        meta.ionmode = meta
            .adduct
            .as_deref()
            .and_then(ionmode_from_adduct)
            .or_else(|| match meta.charge {
                Some(c) if c > 0 => Some(IonMode::Positive),
                Some(c) if c < 0 => Some(IonMode::Negative),
                _ => None,
            });
    }

    if let Some(mode) = meta.ionmode {
        match meta.charge {
            None | Some(0) => {
                meta.charge = Some(mode.sign());
            }
            Some(c) if c.signum() != mode.sign() => {
                debug!(
                    charge = c,
                    ionmode = ?mode,
                    "Charge sign contradicts ion mode, flipping"
                );
                meta.charge = Some(-c);
            }
            _ => {}
        }
    }

    spectrum
}

/// Read the polarity off an adduct string's trailing sign, e.g. "[M+H]+".
fn ionmode_from_adduct(adduct: &str) -> Option<IonMode> {
    let caps = adduct_sign_re().captures(adduct.trim())?;
    match &caps[2] {
        "+" => Some(IonMode::Positive),
        "-" => Some(IonMode::Negative),
        _ => None,
    }
}

/// Annotate the neutral parent mass.
///
/// `parent = precursor_mz * |charge| - charge * PROTON_MASS`, the
/// single-proton-per-charge assumption. An already-present parent mass is
/// kept as-is; a spectrum without precursor m/z or charge passes through
/// unannotated with a warning.
pub fn add_parent_mass(mut spectrum: Spectrum) -> Spectrum {
    if spectrum.metadata.parent_mass.is_some() {
        return spectrum;
    }

    match (spectrum.metadata.precursor_mz, spectrum.metadata.charge) {
        (Some(precursor_mz), Some(charge)) if charge != 0 => {
            let parent = precursor_mz * f64::from(charge.abs()) - f64::from(charge) * PROTON_MASS;
            spectrum.metadata.parent_mass = Some(parent);
        }
        _ => {
            warn!(
                spectrum = %spectrum.display_name(),
                "Cannot derive parent mass without precursor m/z and charge"
            );
        }
    }

    spectrum
}
