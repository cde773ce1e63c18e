//! Builder handles
//!
//! [`StageBuilder`] and [`JobBuilder`] borrow the pipeline mutably and act on
//! the stage or job appended last. Every method consumes the handle and
//! returns a new one so calls can be chained across jobs and stages:
//!
//! ```
//! use pipelyne::pipeline::{Pipeline, PrintParam};
//!
//! let mut pipeline = Pipeline::new();
//! pipeline
//!     .stage("test")
//!     .job("unit")
//!     .run("cargo test")
//!     .job("lint")
//!     .allow_failure()
//!     .run("cargo clippy")
//!     .stage("report")
//!     .job("summary")
//!     .print(["result =", "ok"]);
//!
//! assert_eq!(pipeline.stages().len(), 2);
//! assert_eq!(pipeline.stages()[0].jobs().len(), 2);
//! ```

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::command::{Command, PrintParam};
use super::errors::PipelineError;
use super::job::Job;
use super::pipeline_def::Pipeline;
use super::stage::Stage;
use std::path::Path;

/// Handle on the last stage of a pipeline
#[derive(Debug)]
pub struct StageBuilder<'a> {
    pipeline: &'a mut Pipeline,
}

impl<'a> StageBuilder<'a> {
    pub(crate) fn new(pipeline: &'a mut Pipeline) -> Self {
        Self { pipeline }
    }

    /// Lets the pipeline continue when this stage fails
    pub fn allow_failure(self) -> Self {
        self.pipeline.set_last_stage_allow_failure();
        self
    }

    /// Appends a job to this stage
    pub fn job(self, name: impl Into<String>) -> JobBuilder<'a> {
        if let Some(stage) = self.pipeline.last_stage_mut() {
            stage.push(Job::new(name));
        }
        JobBuilder::new(self.pipeline)
    }

    /// Appends a sibling stage
    pub fn stage(self, name: impl Into<String>) -> StageBuilder<'a> {
        self.pipeline.stage(name)
    }
}

/// Handle on the last job of the last stage of a pipeline
#[derive(Debug)]
pub struct JobBuilder<'a> {
    pipeline: &'a mut Pipeline,
}

impl<'a> JobBuilder<'a> {
    pub(crate) fn new(pipeline: &'a mut Pipeline) -> Self {
        Self { pipeline }
    }

    fn last_job_mut(&mut self) -> Option<&mut Job> {
        self.pipeline.last_stage_mut().and_then(Stage::last_job_mut)
    }

    /// Lets the stage continue when this job fails
    pub fn allow_failure(mut self) -> Self {
        if let Some(job) = self.last_job_mut() {
            job.set_allow_failure(true);
        }
        self
    }

    /// Appends a prepared command to this job
    pub fn command(mut self, command: Command) -> Self {
        if let Some(job) = self.last_job_mut() {
            job.push(command);
        }
        self
    }

    /// Appends a `run` command
    pub fn run(self, script: impl Into<String>) -> Self {
        self.command(Command::run(script))
    }

    /// Appends a command reading `path` into `variable`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateVariable`] if `variable` already
    /// holds a value and `overwrite` is false.
    pub fn read_file(
        self,
        path: impl AsRef<Path>,
        variable: impl Into<String>,
        overwrite: bool,
    ) -> Result<Self, PipelineError> {
        let command = self
            .pipeline
            .read_file_command(path.as_ref(), variable.into(), overwrite)?;
        Ok(self.command(command))
    }

    /// Appends a `print` command
    pub fn print<I, P>(self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PrintParam>,
    {
        self.command(Command::print(params))
    }

    /// NPM helpers appending to this job
    pub fn npm(self) -> Npm<'a> {
        Npm { job: self }
    }

    /// Appends a sibling job to the current stage
    pub fn job(self, name: impl Into<String>) -> JobBuilder<'a> {
        StageBuilder::new(self.pipeline).job(name)
    }

    /// Appends a stage
    pub fn stage(self, name: impl Into<String>) -> StageBuilder<'a> {
        self.pipeline.stage(name)
    }
}

/// `run` commands for the npm package manager
#[derive(Debug)]
pub struct Npm<'a> {
    job: JobBuilder<'a>,
}

impl<'a> Npm<'a> {
    /// `npm install`, with `--production` when requested
    pub fn install(self, production: bool) -> JobBuilder<'a> {
        let script = if production {
            "npm install --production"
        } else {
            "npm install"
        };
        self.job.run(script)
    }

    /// `npm publish`
    pub fn publish(self) -> JobBuilder<'a> {
        self.job.run("npm publish")
    }

    /// `npm run <script>`, forwarding `args` after `--`
    pub fn run(self, script: &str, args: Option<&str>) -> JobBuilder<'a> {
        let script = match args {
            Some(args) => format!("npm run {script} -- {args}"),
            None => format!("npm run {script}"),
        };
        self.job.run(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Runnable;

    fn scripts(pipeline: &Pipeline) -> Vec<&str> {
        pipeline
            .stages()
            .iter()
            .flat_map(Stage::jobs)
            .flat_map(Job::commands)
            .filter_map(Command::script)
            .collect()
    }

    #[test]
    fn test_handles_chain_across_jobs_and_stages() {
        let mut pipeline = Pipeline::new();
        pipeline
            .stage("Build")
            .job("compile")
            .run("cargo build")
            .job("docs")
            .run("cargo doc")
            .stage("Test")
            .allow_failure()
            .job("unit")
            .allow_failure()
            .run("cargo test");

        let stages = pipeline.stages();
        assert_eq!(stages.len(), 2);
        assert!(!stages[0].allow_failure());
        assert!(stages[1].allow_failure());
        assert!(stages[1].jobs()[0].allow_failure());
        assert!(!stages[0].jobs()[0].allow_failure());
        assert_eq!(scripts(&pipeline), vec!["cargo build", "cargo doc", "cargo test"]);
    }

    #[test]
    fn test_command_keeps_allow_failure() {
        let mut pipeline = Pipeline::new();
        pipeline
            .stage("s")
            .job("j")
            .command(Command::run("false").with_allow_failure(true));

        let command = &pipeline.stages()[0].jobs()[0].commands()[0];
        assert!(command.allow_failure());
    }

    #[test]
    fn test_handle_read_file_checks_store() {
        let mut pipeline = Pipeline::with_base_dir("/repo");
        pipeline.set_variable("version", "0.1.0", false).unwrap();

        let err = pipeline
            .stage("s")
            .job("j")
            .read_file("VERSION", "version", false)
            .unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateVariable { .. }));

        pipeline
            .stage("t")
            .job("k")
            .read_file("VERSION", "other", false)
            .unwrap()
            .print([PrintParam::reference("other")]);
        assert_eq!(pipeline.stages()[1].jobs()[0].commands().len(), 2);
    }

    #[test]
    fn test_npm_helpers() {
        let mut pipeline = Pipeline::new();
        pipeline
            .stage("release")
            .job("npm")
            .npm()
            .install(false)
            .npm()
            .install(true)
            .npm()
            .run("build", None)
            .npm()
            .run("test", Some("--coverage --ci"))
            .npm()
            .publish();

        assert_eq!(
            scripts(&pipeline),
            vec![
                "npm install",
                "npm install --production",
                "npm run build",
                "npm run test -- --coverage --ci",
                "npm publish",
            ]
        );
    }
}
