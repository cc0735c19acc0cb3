// Colored terminal output for ranked pair tables and filter summaries.
//
// All terminal-specific formatting lives here; main.rs delegates.

use colored::Colorize;

use crate::document::SpectrumDocument;
use crate::similarity::ScorePair;
use crate::spectrum::Spectrum;

/// Display the top-N ranked (reference, query) pairs.
pub fn display_top_pairs(documents: &[SpectrumDocument], ranked: &[ScorePair], top: usize) {
    if ranked.is_empty() {
        println!("No pairs to rank; check the reference and query slices.");
        return;
    }

    let shown = ranked.len().min(top);
    println!(
        "\n{}",
        format!("=== Top {shown} of {} spectrum pairs ===", ranked.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:>5} {:<30} {:>5} {:<30} {:>12}",
        "Rank".dimmed(),
        "Ref".dimmed(),
        "Reference spectrum".dimmed(),
        "Qry".dimmed(),
        "Query spectrum".dimmed(),
        "Score".dimmed(),
    );
    println!("  {}", "-".repeat(94).dimmed());

    for (i, pair) in ranked.iter().take(top).enumerate() {
        let ref_name = super::truncate_chars(&document_name(documents, pair.reference), 28);
        let query_name = super::truncate_chars(&document_name(documents, pair.query), 28);
        println!(
            "  {:>4}. {:>5} {:<30} {:>5} {:<30} {}",
            i + 1,
            pair.reference,
            ref_name,
            pair.query,
            query_name,
            colorize_score(pair.score),
        );
    }
    println!();
}

/// Display a per-file filtering summary for `inspect`.
pub fn display_filter_summary(total: usize, kept: &[Spectrum]) {
    println!(
        "\n{}",
        format!("=== {} of {total} spectra passed filtering ===", kept.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<36} {:>12} {:>7} {:>7}",
        "#".dimmed(),
        "Spectrum".dimmed(),
        "Precursor".dimmed(),
        "Peaks".dimmed(),
        "Losses".dimmed(),
    );
    println!("  {}", "-".repeat(72).dimmed());

    for (i, s) in kept.iter().enumerate() {
        let precursor = match s.metadata.precursor_mz {
            Some(mz) => format!("{mz:.4}"),
            None => "-".to_string(),
        };
        println!(
            "  {:>4}  {:<36} {:>12} {:>7} {:>7}",
            i,
            super::truncate_chars(&s.display_name(), 34),
            precursor,
            s.peaks.len(),
            s.losses.as_ref().map_or(0, |l| l.len()),
        );
    }
    println!();
}

fn document_name(documents: &[SpectrumDocument], index: usize) -> String {
    documents
        .get(index)
        .and_then(|d| d.metadata.title.clone())
        .unwrap_or_else(|| format!("document {index}"))
}

/// Color a similarity score by how close it is to a perfect match.
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:>12.6}");
    if score >= 0.95 {
        text.bright_green().bold()
    } else if score >= 0.7 {
        text.bright_yellow()
    } else {
        text.normal()
    }
}
