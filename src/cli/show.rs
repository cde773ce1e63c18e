//! `pipelyne show` - Print a pipeline definition

use anyhow::{Context, Result};
use pipelyne::pipeline::{DumpFormat, definition};
use std::path::Path;

/// Loads the definition at `file` and dumps it in `format`
pub fn render_pipeline(file: &Path, format: DumpFormat) -> Result<String> {
    let pipeline = definition::load_file(file)
        .with_context(|| format!("Failed to load pipeline: {}", file.display()))?;

    pipeline
        .render(format)
        .with_context(|| format!("Failed to render pipeline as {format}"))
}
