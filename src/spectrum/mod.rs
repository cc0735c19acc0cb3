// Core spectrum data model.
//
// A Spectrum is a peak list (m/z + intensity pairs) plus the metadata that
// came with it from the source file. Losses (precursor minus fragment m/z)
// are absent until derived by the filtering stage.

mod metadata;
mod peaks;

pub use metadata::{IonMode, Metadata};
pub use peaks::PeakArray;

/// A single mass-spectrometry measurement: peaks, metadata, and
/// (once derived) neutral losses.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub metadata: Metadata,
    pub peaks: PeakArray,
    /// Neutral losses (precursor_mz - peak_mz), ascending by loss m/z.
    /// None until `add_losses` has run.
    pub losses: Option<PeakArray>,
}

impl Spectrum {
    pub fn new(metadata: Metadata, peaks: PeakArray) -> Self {
        Self {
            metadata,
            peaks,
            losses: None,
        }
    }

    /// Display name for logs and tables: the title if present, otherwise
    /// a precursor-based placeholder.
    pub fn display_name(&self) -> String {
        if let Some(title) = &self.metadata.title {
            return title.clone();
        }
        match self.metadata.precursor_mz {
            Some(mz) => format!("precursor {mz:.4}"),
            None => "untitled spectrum".to_string(),
        }
    }
}
