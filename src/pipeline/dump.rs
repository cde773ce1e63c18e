//! Text dumps of a pipeline tree

use super::command::{Command, CommandKind};
use super::errors::PipelineError;
use super::pipeline_def::Pipeline;
use crate::executor::Runnable;
use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// Output format of [`Pipeline::render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    /// Pretty printed JSON of the whole tree
    Json,
    /// Indented outline of ids and scripts
    #[default]
    Overview,
}

impl FromStr for DumpFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "overview" => Ok(Self::Overview),
            other => Err(PipelineError::Serialization(format!(
                "unknown dump format \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Overview => write!(f, "overview"),
        }
    }
}

#[derive(Serialize)]
struct PipelineDump<'a> {
    stages: Vec<StageDump<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageDump<'a> {
    allow_failure: bool,
    id: &'a str,
    name: &'a str,
    jobs: Vec<JobDump<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobDump<'a> {
    allow_failure: bool,
    id: &'a str,
    name: &'a str,
    commands: Vec<CommandDump<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandDump<'a> {
    allow_failure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> CommandDump<'a> {
    fn new(command: &'a Command) -> Result<Self, PipelineError> {
        let (operation, params) = match command.kind() {
            CommandKind::Run { program, args, .. } => {
                (Some(program.clone()), Some(serde_json::to_value(args)?))
            }
            CommandKind::File {
                operation,
                path,
                variable,
            } => (
                Some(operation.to_string()),
                Some(serde_json::json!([path.display().to_string(), variable])),
            ),
            CommandKind::Print { params } => (None, Some(serde_json::to_value(params)?)),
        };

        Ok(Self {
            allow_failure: command.allow_failure(),
            command: operation,
            id: command.id(),
            params,
            script: command.script(),
            kind: command.kind().name(),
        })
    }
}

/// Serializes the tree as pretty printed JSON
pub(crate) fn to_json(pipeline: &Pipeline) -> Result<String, PipelineError> {
    let mut stages = Vec::with_capacity(pipeline.stages().len());
    for stage in pipeline.stages() {
        let mut jobs = Vec::with_capacity(stage.jobs().len());
        for job in stage.jobs() {
            jobs.push(JobDump {
                allow_failure: job.allow_failure(),
                id: job.id(),
                name: job.name(),
                commands: job
                    .commands()
                    .iter()
                    .map(CommandDump::new)
                    .collect::<Result<_, _>>()?,
            });
        }
        stages.push(StageDump {
            allow_failure: stage.allow_failure(),
            id: stage.id(),
            name: stage.name(),
            jobs,
        });
    }

    Ok(serde_json::to_string_pretty(&PipelineDump { stages })?)
}

/// Renders one line per stage, job and command
pub(crate) fn overview(pipeline: &Pipeline) -> String {
    let mut out = String::new();
    for stage in pipeline.stages() {
        let _ = writeln!(out, "STAGE: {}", stage.id());
        for job in stage.jobs() {
            let _ = writeln!(out, "  JOB: {}", job.id());
            for command in job.commands() {
                let _ = writeln!(out, "    CMD: {}", command.kind());
            }
        }
    }
    out
}
