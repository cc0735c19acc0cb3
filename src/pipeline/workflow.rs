// The end-to-end scoring workflow.
//
// Load spectra from an MGF file, run the filter chain (dropping spectra that
// don't qualify), tokenize the survivors into documents, train or reload the
// embedding model, then score a reference slice of the documents against a
// query slice and rank the pairs. The CLI and the integration tests both
// drive this one entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::document::{SpectrumDocument, DEFAULT_N_DECIMALS};
use crate::embedding::{self, EmbeddingModel, EpochStats, TrainParams};
use crate::filtering::{apply_filters_batch, FilterParams};
use crate::importing::load_from_mgf;
use crate::similarity::{calculate_scores, rank_scores, EmbeddingSimilarity, ScorePair};

/// Everything the workflow needs beyond the input file.
#[derive(Debug, Clone)]
pub struct WorkflowParams {
    pub filter: FilterParams,
    pub train: TrainParams,
    /// m/z decimals kept when forming document words.
    pub n_decimals: usize,
    /// Exponent on peak intensities when weighting word vectors.
    pub intensity_weighting_power: f64,
    /// References are documents[0..references_end].
    pub references_end: usize,
    /// Queries are documents[queries_start..].
    pub queries_start: usize,
    /// Cache file for the trained model: loaded when present, written after
    /// training otherwise. None trains fresh every run.
    pub model_path: Option<PathBuf>,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            filter: FilterParams::default(),
            train: TrainParams::default(),
            n_decimals: DEFAULT_N_DECIMALS,
            intensity_weighting_power: 0.5,
            references_end: 26,
            queries_start: 25,
            model_path: None,
        }
    }
}

/// What a workflow run produced.
#[derive(Debug)]
pub struct WorkflowOutcome {
    /// Documents for all spectra that survived filtering, input order.
    pub documents: Vec<SpectrumDocument>,
    /// All cross-product pairs minus self-comparisons, best score first.
    pub ranked: Vec<ScorePair>,
    /// Spectrum count before filtering.
    pub total_spectra: usize,
    /// Whether the model came from the cache file instead of training.
    pub model_was_cached: bool,
    pub vocab_size: usize,
}

/// Run the workflow end to end.
pub fn run(mgf_path: &Path, params: &WorkflowParams) -> Result<WorkflowOutcome> {
    run_with_progress(mgf_path, params, |_| {})
}

/// Run the workflow, forwarding training progress to `on_epoch`.
pub fn run_with_progress(
    mgf_path: &Path,
    params: &WorkflowParams,
    on_epoch: impl FnMut(&EpochStats),
) -> Result<WorkflowOutcome> {
    let spectra = load_from_mgf(mgf_path)?;
    let total_spectra = spectra.len();

    let spectra = apply_filters_batch(spectra, &params.filter);
    if spectra.is_empty() {
        anyhow::bail!(
            "No spectra from {} passed the filter chain",
            mgf_path.display()
        );
    }

    let documents: Vec<SpectrumDocument> = spectra
        .iter()
        .map(|s| SpectrumDocument::with_decimals(s, params.n_decimals))
        .collect();

    if params.references_end > documents.len() || params.queries_start >= documents.len() {
        anyhow::bail!(
            "Document slices (references 0..{}, queries {}..) exceed the {} documents \
             that survived filtering",
            params.references_end,
            params.queries_start,
            documents.len()
        );
    }

    let (model, model_was_cached) = train_or_load(&documents, params, on_epoch)?;

    let scorer = EmbeddingSimilarity::new(&model, params.intensity_weighting_power);
    let pairs = calculate_scores(
        &documents,
        0..params.references_end,
        params.queries_start..documents.len(),
        &scorer,
    )?;
    let ranked = rank_scores(pairs);

    info!(
        documents = documents.len(),
        ranked = ranked.len(),
        cached = model_was_cached,
        "Workflow complete"
    );

    Ok(WorkflowOutcome {
        documents,
        ranked,
        total_spectra,
        model_was_cached,
        vocab_size: model.vocab_size(),
    })
}

/// Reuse the cached model file when it exists, train (and cache) otherwise.
fn train_or_load(
    documents: &[SpectrumDocument],
    params: &WorkflowParams,
    on_epoch: impl FnMut(&EpochStats),
) -> Result<(EmbeddingModel, bool)> {
    if let Some(path) = &params.model_path {
        if path.is_file() {
            let model = EmbeddingModel::load(path)
                .with_context(|| format!("Failed to reuse cached model: {}", path.display()))?;
            return Ok((model, true));
        }
    }

    let corpus: Vec<Vec<String>> = documents.iter().map(|d| d.words.clone()).collect();
    let model = embedding::train_with_progress(&corpus, &params.train, on_epoch)?;

    if let Some(path) = &params.model_path {
        model.save(path)?;
    }
    Ok((model, false))
}
