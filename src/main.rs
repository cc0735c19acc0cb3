use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

mod config;

/// Peakvec: spectral similarity scoring for tandem mass spectrometry.
///
/// Filters MS/MS spectra, tokenizes peaks and neutral losses into documents,
/// learns peak embeddings, and ranks reference/query spectrum pairs by
/// intensity-weighted embedding similarity.
#[derive(Parser)]
#[command(name = "peakvec", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an MGF file, run the filter chain, and show what survives
    Inspect {
        /// Path to the MGF spectra file
        file: PathBuf,
    },

    /// Train a peak embedding model from an MGF file
    Train {
        /// Path to the MGF spectra file
        file: PathBuf,

        /// Dimensionality of the word vectors (default: 5)
        #[arg(long, default_value = "5")]
        vector_size: usize,

        /// Training epochs (default: 20)
        #[arg(long, default_value = "20")]
        epochs: usize,

        /// Drop words seen fewer than this many times (default: 1)
        #[arg(long, default_value = "1")]
        min_count: u64,

        /// Training RNG seed (overrides PEAKVEC_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Where to write the model (default: data dir, named after the input)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Score reference spectra against query spectra and rank the pairs
    Score {
        /// Path to the MGF spectra file
        file: PathBuf,

        /// How many top pairs to display (default: 10)
        #[arg(long, default_value = "10")]
        top: usize,

        /// Exponent on peak intensities when weighting embeddings (default: 0.5)
        #[arg(long, default_value = "0.5")]
        weighting_power: f64,

        /// References are documents[0..N] (default: 26)
        #[arg(long, default_value = "26")]
        references: usize,

        /// Queries are documents[M..] (default: 25)
        #[arg(long, default_value = "25")]
        queries_from: usize,

        /// Model file to reuse or create (default: data dir, named after the input)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Retrain even when a cached model file exists
        #[arg(long)]
        retrain: bool,

        /// Dimensionality of the word vectors when training (default: 5)
        #[arg(long, default_value = "5")]
        vector_size: usize,

        /// Training epochs when training (default: 20)
        #[arg(long, default_value = "20")]
        epochs: usize,

        /// Training RNG seed (overrides PEAKVEC_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("peakvec=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file } => {
            println!("Loading spectra from {}...", file.display());
            let spectra = peakvec::importing::load_from_mgf(&file)?;
            let total = spectra.len();

            let params = peakvec::filtering::FilterParams::default();
            let kept = peakvec::filtering::apply_filters_batch(spectra, &params);

            peakvec::output::terminal::display_filter_summary(total, &kept);

            if kept.len() < total {
                println!(
                    "{}",
                    format!(
                        "{} spectra dropped (too few peaks after filtering).",
                        total - kept.len()
                    )
                    .dimmed()
                );
            }
        }

        Commands::Train {
            file,
            vector_size,
            epochs,
            min_count,
            seed,
            model,
        } => {
            let config = config::Config::load()?;
            let model_path = model.unwrap_or_else(|| config.model_path_for(&file));

            println!("Loading spectra from {}...", file.display());
            let spectra = peakvec::importing::load_from_mgf(&file)?;
            let kept = peakvec::filtering::apply_filters_batch(
                spectra,
                &peakvec::filtering::FilterParams::default(),
            );
            println!("  {} spectra passed filtering", kept.len());

            let documents: Vec<_> = kept
                .iter()
                .map(peakvec::document::SpectrumDocument::new)
                .collect();
            let corpus: Vec<Vec<String>> =
                documents.iter().map(|d| d.words.clone()).collect();

            let train_params = peakvec::embedding::TrainParams {
                vector_size,
                epochs,
                min_count,
                seed: seed.unwrap_or(config.seed),
                ..peakvec::embedding::TrainParams::default()
            };

            println!(
                "Training embedding ({} documents, {} dimensions, {} epochs)...",
                documents.len(),
                vector_size,
                epochs
            );
            let pb = epoch_bar(epochs);
            let model = peakvec::embedding::train_with_progress(&corpus, &train_params, |_| {
                pb.inc(1);
            })?;
            pb.finish_and_clear();

            model.save(&model_path)?;

            println!("\n{}", "Training complete.".bold());
            println!("  Vocabulary: {} words", model.vocab_size());
            println!("  Model saved to: {}", model_path.display());
        }

        Commands::Score {
            file,
            top,
            weighting_power,
            references,
            queries_from,
            model,
            retrain,
            vector_size,
            epochs,
            seed,
        } => {
            let config = config::Config::load()?;
            let model_path = model.unwrap_or_else(|| config.model_path_for(&file));

            if retrain && model_path.is_file() {
                info!(path = %model_path.display(), "Removing cached model for retrain");
                std::fs::remove_file(&model_path)?;
            }

            let params = peakvec::pipeline::WorkflowParams {
                train: peakvec::embedding::TrainParams {
                    vector_size,
                    epochs,
                    seed: seed.unwrap_or(config.seed),
                    ..peakvec::embedding::TrainParams::default()
                },
                intensity_weighting_power: weighting_power,
                references_end: references,
                queries_start: queries_from,
                model_path: Some(model_path.clone()),
                ..peakvec::pipeline::WorkflowParams::default()
            };

            println!("Scoring {}...", file.display());
            let pb = epoch_bar(epochs);
            let outcome = peakvec::pipeline::run_with_progress(&file, &params, |_| {
                pb.inc(1);
            })?;
            pb.finish_and_clear();

            peakvec::output::terminal::display_top_pairs(&outcome.documents, &outcome.ranked, top);

            println!("{}", "Scoring complete.".bold());
            println!(
                "  Spectra: {} loaded, {} survived filtering",
                outcome.total_spectra,
                outcome.documents.len()
            );
            println!("  Vocabulary: {} words", outcome.vocab_size);
            if outcome.model_was_cached {
                println!(
                    "  Model: reused cache at {} {}",
                    model_path.display(),
                    "(pass --retrain to rebuild)".dimmed()
                );
            } else {
                println!("  Model: trained and cached at {}", model_path.display());
            }
        }
    }

    Ok(())
}

/// Progress bar over training epochs.
fn epoch_bar(epochs: usize) -> ProgressBar {
    let pb = ProgressBar::new(epochs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Training [{bar:30}] {pos}/{len} epochs ({eta})")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb
}
