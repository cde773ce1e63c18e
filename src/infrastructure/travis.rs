//! Travis CI exporter
//!
//! Translates pipelines to `.travis.yml` files for the Node.js image.

use super::exporter::{CiProvider, Exporter};
use crate::executor::Runnable;
use crate::pipeline::{CommandKind, Pipeline, PipelineError, Stage};
use serde::Serialize;

/// `.travis.yml` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravisConfig {
    /// Build language
    pub language: String,
    /// Node.js versions
    pub node_js: Vec<String>,
    /// Cached directories
    pub cache: TravisCache,
    /// Shell lines run in order
    pub script: Vec<String>,
}

/// `cache` section of a `.travis.yml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravisCache {
    /// Directories kept between builds
    pub directories: Vec<String>,
}

/// Exporter for Travis CI
#[derive(Debug, Clone, Default)]
pub struct TravisExporter;

impl TravisExporter {
    /// Creates a new Travis exporter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the `.travis.yml` document for a pipeline
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn translate(&self, pipeline: &Pipeline) -> TravisConfig {
        TravisConfig {
            language: "node_js".to_string(),
            node_js: vec!["8".to_string()],
            cache: TravisCache {
                directories: vec!["node_modules".to_string()],
            },
            script: pipeline.stages().iter().flat_map(stage_script).collect(),
        }
    }
}

fn stage_script(stage: &Stage) -> Vec<String> {
    let mut lines = vec![
        format!("printf -- \"STAGE: {}\"", stage.name()),
        if stage.allow_failure() { "set +x" } else { "set -x" }.to_string(),
    ];

    for job in stage.jobs() {
        lines.push(format!("printf -- \"JOB: {}\"", job.name()));
        lines.extend(job.commands().iter().filter_map(|command| match command.kind() {
            CommandKind::Run { script, .. } => Some(script.clone()),
            CommandKind::File { .. } | CommandKind::Print { .. } => None,
        }));
    }

    lines
}

impl Exporter for TravisExporter {
    fn provider(&self) -> CiProvider {
        CiProvider::Travis
    }

    fn export(&self, pipeline: &Pipeline) -> Result<String, PipelineError> {
        let config = self.translate(pipeline);
        tracing::debug!(lines = config.script.len(), "Exporting Travis configuration");
        Ok(serde_yaml::to_string(&config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Pipeline {
        let mut pipeline = Pipeline::with_base_dir("/repo");
        pipeline
            .stage("Build")
            .job("Install")
            .npm()
            .install(false)
            .read_file("VERSION", "version", false)
            .unwrap()
            .print(["built"])
            .run("npm run build")
            .stage("Lint")
            .allow_failure()
            .job("ESLint")
            .run("npm run lint");
        pipeline
    }

    #[test]
    fn test_translate() {
        let config = TravisExporter::new().translate(&sample());

        assert_eq!(config.language, "node_js");
        assert_eq!(config.node_js, vec!["8"]);
        assert_eq!(config.cache.directories, vec!["node_modules"]);
        assert_eq!(
            config.script,
            vec![
                "printf -- \"STAGE: Build\"",
                "set -x",
                "printf -- \"JOB: Install\"",
                "npm install",
                "npm run build",
                "printf -- \"STAGE: Lint\"",
                "set +x",
                "printf -- \"JOB: ESLint\"",
                "npm run lint",
            ]
        );
    }

    #[test]
    fn test_export_is_valid_yaml() {
        let yaml = sample().export_for("travis").unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["language"].as_str(), Some("node_js"));
        assert_eq!(value["node_js"][0].as_str(), Some("8"));
        assert_eq!(value["cache"]["directories"][0].as_str(), Some("node_modules"));
        assert_eq!(value["script"][0].as_str(), Some("printf -- \"STAGE: Build\""));
        assert_eq!(value["script"].as_sequence().map(Vec::len), Some(9));
    }

    #[test]
    fn test_export_empty_pipeline() {
        let config = TravisExporter::new().translate(&Pipeline::new());
        assert!(config.script.is_empty());
    }
}
