//! Pipeline definition files
//!
//! A definition file is a YAML (or JSON) document whose top-level
//! `pipelyne` entry describes the pipeline:
//!
//! ```yaml
//! pipelyne:
//!   stages:
//!     - name: build
//!       jobs:
//!         - name: compile
//!           commands:
//!             - run: cargo build
//!             - readFile: { path: VERSION, variable: version }
//!             - print: ["version =", { ref: version }]
//!               allowFailure: true
//!     - load: deploy.yml
//! ```
//!
//! Relative `readFile` paths and `load` entries resolve against the directory
//! of the file that contains them.

use super::command::{Command, PrintParam};
use super::errors::PipelineError;
use super::pipeline_def::Pipeline;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level key a definition file must expose
pub const ROOT_KEY: &str = "pipelyne";

/// What [`Pipeline::load`] appends stages from
#[derive(Debug, Clone)]
pub enum PipelineSource {
    /// An already built pipeline
    Instance(Pipeline),
    /// A definition file, relative to the loading pipeline's base directory
    Path(PathBuf),
}

impl From<Pipeline> for PipelineSource {
    fn from(pipeline: Pipeline) -> Self {
        Self::Instance(pipeline)
    }
}

impl From<&Pipeline> for PipelineSource {
    fn from(pipeline: &Pipeline) -> Self {
        Self::Instance(pipeline.clone())
    }
}

impl From<PathBuf> for PipelineSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for PipelineSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for PipelineSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for PipelineSource {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Contents of the `pipelyne` entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineDefinition {
    /// Pipeline allow-failure flag, ignored when the file is loaded into
    /// another pipeline
    #[serde(default)]
    pub allow_failure: bool,

    /// Stages and nested loads in order
    #[serde(default)]
    pub stages: Vec<StageEntry>,
}

/// Entry of the `stages` list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StageEntry {
    /// Stages of another definition file
    Load(LoadDefinition),
    /// A stage
    Stage(StageDefinition),
}

/// A `load` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadDefinition {
    /// Path of the file, relative to the file containing the entry
    pub load: PathBuf,
}

/// A stage and its jobs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StageDefinition {
    /// Stage name
    pub name: String,
    /// Allow-failure flag
    #[serde(default)]
    pub allow_failure: bool,
    /// Jobs in order
    #[serde(default)]
    pub jobs: Vec<JobDefinition>,
}

/// A job and its commands
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobDefinition {
    /// Job name
    pub name: String,
    /// Allow-failure flag
    #[serde(default)]
    pub allow_failure: bool,
    /// Commands in order
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
}

/// A command with its allow-failure flag
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawCommandDefinition")]
pub struct CommandDefinition {
    /// What the command does
    pub action: ActionDefinition,
    /// Allow-failure flag
    pub allow_failure: bool,
}

/// Command entry as written; exactly one action key must be present
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawCommandDefinition {
    run: Option<String>,
    read_file: Option<ReadFileDefinition>,
    print: Option<Vec<PrintParam>>,
    #[serde(default)]
    allow_failure: bool,
}

impl TryFrom<RawCommandDefinition> for CommandDefinition {
    type Error = String;

    fn try_from(raw: RawCommandDefinition) -> Result<Self, Self::Error> {
        let mut actions = [
            raw.run.map(ActionDefinition::Run),
            raw.read_file.map(ActionDefinition::ReadFile),
            raw.print.map(ActionDefinition::Print),
        ]
        .into_iter()
        .flatten();

        match (actions.next(), actions.next()) {
            (Some(action), None) => Ok(Self {
                action,
                allow_failure: raw.allow_failure,
            }),
            (None, _) => Err("command needs one of `run`, `readFile` or `print`".to_string()),
            (Some(_), Some(_)) => {
                Err("command must have exactly one of `run`, `readFile` or `print`".to_string())
            }
        }
    }
}

/// Kind specific part of a command
#[derive(Debug, Clone)]
pub enum ActionDefinition {
    /// Script to spawn
    Run(String),
    /// File to read into a variable
    ReadFile(ReadFileDefinition),
    /// Values to print
    Print(Vec<PrintParam>),
}

/// Parameters of a `readFile` command
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReadFileDefinition {
    /// File path
    pub path: PathBuf,
    /// Variable receiving the contents
    pub variable: String,
}

/// Parses the `pipelyne` entry of a definition document.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidExport`] if the document is not valid
/// YAML, has no `pipelyne` entry or the entry is not a valid pipeline.
pub fn parse_definition(content: &str, path: &Path) -> Result<PipelineDefinition, PipelineError> {
    let invalid = |reason: String| PipelineError::InvalidExport {
        path: path.to_path_buf(),
        reason,
    };

    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let entry = document
        .get(ROOT_KEY)
        .cloned()
        .ok_or_else(|| invalid(format!("missing top-level `{ROOT_KEY}` entry")))?;

    serde_yaml::from_value(entry).map_err(|e| invalid(e.to_string()))
}

/// Reads a definition file and builds the pipeline it describes.
///
/// The pipeline's base directory is the directory of the file.
///
/// # Errors
///
/// Returns [`PipelineError::NotFound`] if `path` does not exist and
/// [`PipelineError::InvalidExport`] if it is not a file or does not define a
/// pipeline.
pub fn load_file(path: &Path) -> Result<Pipeline, PipelineError> {
    load_nested(path, &mut Vec::new())
}

fn load_nested(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Pipeline, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if !path.is_file() {
        return Err(PipelineError::InvalidExport {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }

    let canonical = path.canonicalize()?;
    if chain.contains(&canonical) {
        return Err(PipelineError::InvalidExport {
            path: path.to_path_buf(),
            reason: "the file loads itself".to_string(),
        });
    }

    tracing::debug!(path = %path.display(), "Reading pipeline definition");
    let content = std::fs::read_to_string(path)?;
    let definition = parse_definition(&content, path)?;
    let base_dir = canonical
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    chain.push(canonical);
    let pipeline = build(definition, base_dir, chain);
    chain.pop();
    pipeline
}

fn build(
    definition: PipelineDefinition,
    base_dir: PathBuf,
    chain: &mut Vec<PathBuf>,
) -> Result<Pipeline, PipelineError> {
    let mut pipeline = Pipeline::with_base_dir(base_dir).with_allow_failure(definition.allow_failure);

    for entry in definition.stages {
        match entry {
            StageEntry::Load(LoadDefinition { load }) => {
                let nested = load_nested(&pipeline.base_dir().join(load), chain)?;
                pipeline.load(nested)?;
            }
            StageEntry::Stage(stage) => add_stage(&mut pipeline, stage)?,
        }
    }

    Ok(pipeline)
}

fn add_stage(pipeline: &mut Pipeline, stage: StageDefinition) -> Result<(), PipelineError> {
    let handle = pipeline.stage(stage.name);
    if stage.allow_failure {
        handle.allow_failure();
    }

    for job in stage.jobs {
        let commands = job
            .commands
            .into_iter()
            .map(|command| build_command(pipeline, command))
            .collect::<Result<Vec<_>, _>>()?;

        let mut handle = pipeline.job(job.name)?;
        if job.allow_failure {
            handle = handle.allow_failure();
        }
        for command in commands {
            handle = handle.command(command);
        }
    }

    Ok(())
}

fn build_command(
    pipeline: &Pipeline,
    definition: CommandDefinition,
) -> Result<Command, PipelineError> {
    let command = match definition.action {
        ActionDefinition::Run(script) => Command::run(script),
        ActionDefinition::ReadFile(read) => {
            pipeline.read_file_command(&read.path, read.variable, true)?
        }
        ActionDefinition::Print(params) => Command::print(params),
    };
    Ok(command.with_allow_failure(definition.allow_failure))
}
