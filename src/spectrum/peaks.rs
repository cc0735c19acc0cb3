// PeakArray: parallel m/z and intensity arrays with the ordering invariant.
//
// The constructor sorts by m/z so every downstream consumer (filters, loss
// derivation, tokenization) can rely on ascending order without re-checking.

use anyhow::Result;

/// Parallel arrays of m/z and intensity values, m/z ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakArray {
    mz: Vec<f64>,
    intensities: Vec<f64>,
}

impl PeakArray {
    /// Build a peak array from parallel m/z and intensity vectors.
    ///
    /// Sorts both by ascending m/z. Fails if the lengths differ or any
    /// value is non-finite.
    pub fn new(mz: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        if mz.len() != intensities.len() {
            anyhow::bail!(
                "Peak arrays must have equal length: {} m/z values vs {} intensities",
                mz.len(),
                intensities.len()
            );
        }
        if mz.iter().chain(intensities.iter()).any(|v| !v.is_finite()) {
            anyhow::bail!("Peak arrays must contain only finite values");
        }

        let mut pairs: Vec<(f64, f64)> = mz.into_iter().zip(intensities).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let (mz, intensities) = pairs.into_iter().unzip();
        Ok(Self { mz, intensities })
    }

    /// An empty peak array.
    pub fn empty() -> Self {
        Self {
            mz: Vec::new(),
            intensities: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn mz(&self) -> &[f64] {
        &self.mz
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Largest intensity, or None for an empty array.
    pub fn max_intensity(&self) -> Option<f64> {
        self.intensities.iter().copied().fold(None, |acc, v| {
            Some(match acc {
                Some(m) if m >= v => m,
                _ => v,
            })
        })
    }

    /// Iterate over (m/z, intensity) pairs in ascending m/z order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mz
            .iter()
            .copied()
            .zip(self.intensities.iter().copied())
    }

    /// New array keeping only the peaks the predicate accepts.
    /// Order is preserved, so the result stays sorted.
    pub fn retain(&self, mut keep: impl FnMut(f64, f64) -> bool) -> Self {
        let mut mz = Vec::new();
        let mut intensities = Vec::new();
        for (m, i) in self.iter() {
            if keep(m, i) {
                mz.push(m);
                intensities.push(i);
            }
        }
        Self { mz, intensities }
    }

    /// New array with every intensity scaled by `factor`.
    pub fn scale_intensities(&self, factor: f64) -> Self {
        Self {
            mz: self.mz.clone(),
            intensities: self.intensities.iter().map(|i| i * factor).collect(),
        }
    }
}
