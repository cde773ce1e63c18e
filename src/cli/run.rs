//! `pipelyne run` - Execute a pipeline definition locally

use anyhow::{Context, Result};
use pipelyne::executor::Runnable;
use pipelyne::pipeline::{Pipeline, definition};
use std::path::Path;

/// Loads the definition at `file` and runs it with `base_dir` as the
/// working directory of its commands.
///
/// Returns the pipeline status.
pub async fn run_pipeline(file: &Path, base_dir: &Path) -> Result<bool> {
    let pipeline = prepare(file, base_dir)?;
    Ok(execute(pipeline).await)
}

fn prepare(file: &Path, base_dir: &Path) -> Result<Pipeline> {
    let loaded = definition::load_file(file)
        .with_context(|| format!("Failed to load pipeline: {}", file.display()))?;

    let mut pipeline =
        Pipeline::with_base_dir(base_dir).with_allow_failure(loaded.allow_failure());
    pipeline.load(loaded)?;
    Ok(pipeline)
}

async fn execute(mut pipeline: Pipeline) -> bool {
    let status = pipeline.execute().await;
    if status {
        tracing::info!(state = %pipeline.state(), "Pipeline succeeded");
    } else {
        tracing::error!(state = %pipeline.state(), "Pipeline failed");
    }
    status
}
