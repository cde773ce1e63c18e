//! `pipelyne export` - Convert pipelines to CI provider formats

use anyhow::{Context, Result};
use pipelyne::pipeline::definition;
use std::fs;
use std::path::Path;

/// Loads the definition at `file` and renders it for `provider`
pub fn export_pipeline(file: &Path, provider: &str) -> Result<String> {
    let pipeline = definition::load_file(file)
        .with_context(|| format!("Failed to load pipeline: {}", file.display()))?;

    pipeline
        .export_for(provider)
        .with_context(|| format!("Failed to export pipeline for {provider}"))
}

pub fn save_export(content: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write export to: {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEFINITION: &str = "\
pipelyne:
  stages:
    - name: Test
      allowFailure: true
      jobs:
        - name: Unit
          commands:
            - run: npm test
";

    #[test]
    fn test_export_travis() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("pipelyne.yml");
        fs::write(&file, DEFINITION).unwrap();

        let exported = export_pipeline(&file, "travis").unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&exported).unwrap();
        let script: Vec<_> = value["script"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(serde_yaml::Value::as_str)
            .collect();
        assert_eq!(
            script,
            vec!["printf -- \"STAGE: Test\"", "set +x", "printf -- \"JOB: Unit\"", "npm test"]
        );
    }

    #[test]
    fn test_export_unknown_provider() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("pipelyne.yml");
        fs::write(&file, DEFINITION).unwrap();

        let err = export_pipeline(&file, "circle").unwrap_err();
        assert!(format!("{err:#}").contains("Unknown CI provider \"circle\""));
    }

    #[test]
    fn test_save_export_creates_parent() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ci").join(".travis.yml");
        save_export("language: node_js\n", &output).unwrap();
        assert_eq!(fs::read_to_string(output).unwrap(), "language: node_js\n");
    }
}
