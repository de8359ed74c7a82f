//! Patch pipeline orchestration
//!
//! Loads the layers, builds effective settings, runs the patcher and writes
//! whichever of the patch layer, run summary and effective settings were asked
//! for. The patch itself cannot fail; every error here comes from inputs or the
//! filesystem.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use shift_patcher::run_patch;
use shift_records::{LayerError, LoadOrder, PatchLayer};

use crate::config::{ConfigError, EffectiveConfig};
use crate::summary::RunSummary;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("layer error: {0}")]
    Layer(#[from] LayerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no layers given")]
    NoLayers,
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 1,
            PipelineError::Layer(_) => 1,
            PipelineError::Io(_) => 1,
            PipelineError::Serialization(_) => 1,
            PipelineError::NoLayers => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Inputs for one patch run.
#[derive(Debug, Clone, Default)]
pub struct PatchRequest {
    /// Layer files in load order, lowest priority first
    pub layers: Vec<PathBuf>,

    /// Settings file (TOML or JSON)
    pub settings: Option<PathBuf>,

    /// CLI overrides, merged over the settings file
    pub overrides: Option<Value>,

    /// Where to write the patch layer
    pub output: Option<PathBuf>,

    /// Where to write run_summary.json
    pub summary: Option<PathBuf>,

    /// Where to write effective_config.json
    pub effective_config: Option<PathBuf>,
}

/// Result of a patch run.
#[derive(Debug)]
pub struct PatchRun {
    pub config: EffectiveConfig,
    pub patch: PatchLayer,
    pub summary: RunSummary,
}

/// Run the full pipeline for one request.
pub fn run(request: &PatchRequest) -> PipelineResult<PatchRun> {
    if request.layers.is_empty() {
        return Err(PipelineError::NoLayers);
    }

    let started = Instant::now();
    let run_id = ulid::Ulid::new().to_string().to_lowercase();

    let config = EffectiveConfig::build(request.settings.as_deref(), request.overrides.clone())?
        .with_run_id(run_id.clone());
    let settings = config.patch_settings()?;
    let patch_name = config.patch_name()?;

    let load_order = LoadOrder::from_files(request.layers.as_slice())?;
    info!(
        run_id = %run_id,
        layers = load_order.len(),
        target_key = %settings.target,
        "loaded load order"
    );

    let target = settings.target.to_string();
    let (patch, report) = run_patch(&load_order, settings, patch_name);

    if let Some(path) = &request.output {
        patch.as_layer().write_to_file(path)?;
        info!(path = %path.display(), overrides = patch.len(), "wrote patch layer");
    }

    let summary = RunSummary::new(
        run_id,
        patch.mod_key().to_string(),
        target,
        load_order
            .layers()
            .iter()
            .map(|layer| layer.mod_key().to_string())
            .collect(),
        report,
        patch.len(),
        u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    );

    if let Some(path) = &request.summary {
        summary.write_to_file(path)?;
    }

    if let Some(path) = &request.effective_config {
        config.write_to_file(path)?;
    }

    Ok(PatchRun {
        config,
        patch,
        summary,
    })
}
