// Spectrum metadata: the typed header fields plus a catch-all map.
//
// The fields that drive filtering and scoring (precursor m/z, charge, ion
// mode, parent mass) are typed; everything else from the source file lands
// in `extra` with lowercased keys so lookups don't depend on the file's
// capitalization habits.

use std::collections::BTreeMap;

/// Polarity of the ionization, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IonMode {
    Positive,
    Negative,
}

impl IonMode {
    /// Sign convention: +1 for positive mode, -1 for negative.
    pub fn sign(self) -> i32 {
        match self {
            IonMode::Positive => 1,
            IonMode::Negative => -1,
        }
    }

    /// Parse from a metadata value like "positive" / "Negative" / "n/a".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "positive" | "pos" | "+" => Some(IonMode::Positive),
            "negative" | "neg" | "-" => Some(IonMode::Negative),
            _ => None,
        }
    }
}

/// Header metadata for one spectrum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    /// First PEPMASS value, the precursor ion m/z.
    pub precursor_mz: Option<f64>,
    /// Second PEPMASS value, when the file carries one.
    pub precursor_intensity: Option<f64>,
    /// Signed integer charge (e.g. +1, -2).
    pub charge: Option<i32>,
    pub ionmode: Option<IonMode>,
    /// Neutral parent mass, derived by `add_parent_mass` or read from file.
    pub parent_mass: Option<f64>,
    /// Adduct string as written in the source, e.g. "[M+H]+".
    pub adduct: Option<String>,
    /// Everything else, keys lowercased.
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Look up an unrecognized header field (case-insensitive key).
    pub fn get_extra(&self, key: &str) -> Option<&str> {
        self.extra.get(&key.to_lowercase()).map(String::as_str)
    }
}
