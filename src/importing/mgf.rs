// MGF (Mascot Generic Format) reader.
//
// An MGF file is a sequence of BEGIN IONS / END IONS blocks. Each block has
// KEY=VALUE header lines followed by peak lines of whitespace-separated
// numbers (m/z, intensity, and sometimes a trailing charge column we ignore).
//
// The parser is line-oriented and fails with the offending line number on
// malformed input: a truncated block or an unparsable peak line should stop
// the run, not silently shrink the dataset.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::spectrum::{IonMode, Metadata, PeakArray, Spectrum};

/// Load all spectra from an MGF file on disk.
pub fn load_from_mgf(path: &Path) -> Result<Vec<Spectrum>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open MGF file: {}", path.display()))?;
    let spectra = parse_mgf(BufReader::new(file))
        .with_context(|| format!("Failed to parse MGF file: {}", path.display()))?;
    debug!(count = spectra.len(), path = %path.display(), "Loaded MGF file");
    Ok(spectra)
}

/// Parse MGF content from any buffered reader.
pub fn parse_mgf(reader: impl BufRead) -> Result<Vec<Spectrum>> {
    let mut spectra = Vec::new();
    let mut block: Option<Block> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("I/O error at line {line_no}"))?;
        let trimmed = line.trim();

        // Blank lines and comments are allowed anywhere
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.eq_ignore_ascii_case("BEGIN IONS") {
            if block.is_some() {
                anyhow::bail!("Nested BEGIN IONS at line {line_no}");
            }
            block = Some(Block::default());
            continue;
        }

        if trimmed.eq_ignore_ascii_case("END IONS") {
            let b = block
                .take()
                .with_context(|| format!("END IONS without BEGIN IONS at line {line_no}"))?;
            spectra.push(b.into_spectrum()?);
            continue;
        }

        let Some(b) = block.as_mut() else {
            anyhow::bail!("Content outside BEGIN IONS/END IONS at line {line_no}: {trimmed}");
        };

        if let Some((key, value)) = trimmed.split_once('=') {
            b.apply_header(key, value)
                .with_context(|| format!("Malformed header at line {line_no}: {trimmed}"))?;
        } else {
            let (mz, intensity) = parse_peak_line(trimmed)
                .with_context(|| format!("Malformed peak line at line {line_no}: {trimmed}"))?;
            b.mz.push(mz);
            b.intensities.push(intensity);
        }
    }

    if block.is_some() {
        anyhow::bail!("Unterminated BEGIN IONS block at end of file");
    }

    Ok(spectra)
}

/// Accumulator for one BEGIN IONS block.
#[derive(Default)]
struct Block {
    metadata: Metadata,
    mz: Vec<f64>,
    intensities: Vec<f64>,
}

impl Block {
    fn apply_header(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key.trim().to_uppercase().as_str() {
            "TITLE" => self.metadata.title = Some(value.to_string()),
            "PEPMASS" => {
                // One or two values: precursor m/z, optional intensity. The
                // precursor feeds parent-mass and loss derivation, so an
                // unparsable value is an error, not a missing field.
                let mut parts = value.split_whitespace();
                let precursor: f64 = parts
                    .next()
                    .context("Missing PEPMASS value")?
                    .parse()
                    .context("Unparsable PEPMASS precursor m/z")?;
                self.metadata.precursor_mz = Some(precursor);
                self.metadata.precursor_intensity = match parts.next() {
                    Some(v) => Some(v.parse().context("Unparsable PEPMASS intensity")?),
                    None => None,
                };
            }
            "CHARGE" => self.metadata.charge = parse_charge(value),
            "IONMODE" => self.metadata.ionmode = IonMode::parse(value),
            "ADDUCT" | "PRECURSORTYPE" => self.metadata.adduct = Some(value.to_string()),
            "PARENTMASS" => self.metadata.parent_mass = value.parse().ok(),
            other => {
                self.metadata
                    .extra
                    .insert(other.to_lowercase(), value.to_string());
            }
        }
        Ok(())
    }

    fn into_spectrum(self) -> Result<Spectrum> {
        let peaks = PeakArray::new(self.mz, self.intensities)?;
        Ok(Spectrum::new(self.metadata, peaks))
    }
}

/// Parse a peak line: "mz intensity" with an optional trailing charge column.
fn parse_peak_line(line: &str) -> Result<(f64, f64)> {
    let mut parts = line.split_whitespace();
    let mz: f64 = parts
        .next()
        .context("Missing m/z value")?
        .parse()
        .context("Unparsable m/z value")?;
    let intensity: f64 = parts
        .next()
        .context("Missing intensity value")?
        .parse()
        .context("Unparsable intensity value")?;
    Ok((mz, intensity))
}

/// Parse MGF charge notation: "2+", "1-", "+2", "-1", or a bare integer.
fn parse_charge(value: &str) -> Option<i32> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    if let Some(stripped) = v.strip_suffix('+') {
        return stripped.parse::<i32>().ok().map(i32::abs);
    }
    if let Some(stripped) = v.strip_suffix('-') {
        return stripped.parse::<i32>().ok().map(|c| -c.abs());
    }
    v.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SIMPLE: &str = "\
BEGIN IONS
TITLE=Test compound
PEPMASS=310.1025 5021.0
CHARGE=1+
RTINSECONDS=72.4
100.10 2.5
205.00 10.0
END IONS
";

    #[test]
    fn parses_single_block() {
        let spectra = parse_mgf(Cursor::new(SIMPLE)).unwrap();
        assert_eq!(spectra.len(), 1);
        let s = &spectra[0];
        assert_eq!(s.metadata.title.as_deref(), Some("Test compound"));
        assert_eq!(s.metadata.precursor_mz, Some(310.1025));
        assert_eq!(s.metadata.precursor_intensity, Some(5021.0));
        assert_eq!(s.metadata.charge, Some(1));
        assert_eq!(s.metadata.get_extra("rtinseconds"), Some("72.4"));
        assert_eq!(s.peaks.len(), 2);
        assert_eq!(s.peaks.mz(), &[100.10, 205.00]);
    }

    #[test]
    fn charge_notation_variants() {
        assert_eq!(parse_charge("2+"), Some(2));
        assert_eq!(parse_charge("1-"), Some(-1));
        assert_eq!(parse_charge("+2"), Some(2));
        assert_eq!(parse_charge("-1"), Some(-1));
        assert_eq!(parse_charge("3"), Some(3));
        assert_eq!(parse_charge(""), None);
        assert_eq!(parse_charge("x"), None);
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let input = "# exported by instrument\n\nBEGIN IONS\nPEPMASS=100.0\n50.0 1.0\n\nEND IONS\n";
        let spectra = parse_mgf(Cursor::new(input)).unwrap();
        assert_eq!(spectra.len(), 1);
        assert_eq!(spectra[0].peaks.len(), 1);
    }

    #[test]
    fn peak_line_with_trailing_charge_column() {
        let input = "BEGIN IONS\nPEPMASS=100.0\n50.0 1.0 1\nEND IONS\n";
        let spectra = parse_mgf(Cursor::new(input)).unwrap();
        assert_eq!(spectra[0].peaks.mz(), &[50.0]);
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let input = "BEGIN IONS\nPEPMASS=100.0\n50.0 1.0\n";
        assert!(parse_mgf(Cursor::new(input)).is_err());
    }

    #[test]
    fn stray_end_is_an_error() {
        assert!(parse_mgf(Cursor::new("END IONS\n")).is_err());
    }

    #[test]
    fn malformed_peak_line_is_an_error() {
        let input = "BEGIN IONS\n50.0 abc\nEND IONS\n";
        let err = parse_mgf(Cursor::new(input)).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "{err:#}");
    }

    #[test]
    fn malformed_pepmass_is_an_error() {
        let input = "BEGIN IONS\nPEPMASS=abc\n50.0 1.0\nEND IONS\n";
        let err = parse_mgf(Cursor::new(input)).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "{err:#}");
    }

    #[test]
    fn multiple_blocks_in_order() {
        let input = "BEGIN IONS\nTITLE=a\n50.0 1.0\nEND IONS\nBEGIN IONS\nTITLE=b\n60.0 1.0\nEND IONS\n";
        let spectra = parse_mgf(Cursor::new(input)).unwrap();
        assert_eq!(spectra.len(), 2);
        assert_eq!(spectra[0].metadata.title.as_deref(), Some("a"));
        assert_eq!(spectra[1].metadata.title.as_deref(), Some("b"));
    }
}
