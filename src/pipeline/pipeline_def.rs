//! Pipeline definition and builder entry points

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::builder::{JobBuilder, StageBuilder};
use super::command::{Command, PrintParam};
use super::definition::{self, PipelineSource};
use super::dump::{self, DumpFormat};
use super::errors::PipelineError;
use super::job::Job;
use super::stage::Stage;
use super::store::{StoreValue, VariableStore};
use super::types::State;
use crate::executor::{ExecutionContext, Runnable, run_in_order};
use crate::infrastructure::{CiProvider, Exporter, exporter_for};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Root of the pipeline tree.
///
/// A pipeline owns its stages and the [`ExecutionContext`] every command
/// runs against. Builder calls append to the last stage and the last job of
/// that stage.
///
/// # Example
///
/// ```
/// use pipelyne::pipeline::Pipeline;
///
/// let mut pipeline = Pipeline::new();
/// pipeline
///     .stage("build")
///     .job("compile")
///     .run("cargo build")
///     .print(["done"]);
///
/// assert_eq!(pipeline.stages().len(), 1);
/// assert_eq!(pipeline.to_string(), "Pipeline: 1 stages");
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
    allow_failure: bool,
    state: State,
    context: ExecutionContext,
}

impl Pipeline {
    /// Creates an empty pipeline rooted at the current directory
    pub fn new() -> Self {
        Self::from_context(ExecutionContext::new())
    }

    /// Creates an empty pipeline rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self::from_context(ExecutionContext::with_base_dir(base_dir))
    }

    fn from_context(context: ExecutionContext) -> Self {
        Self {
            stages: Vec::new(),
            allow_failure: false,
            state: State::Unstarted,
            context,
        }
    }

    /// Sets whether a failed run still reports a successful status
    pub fn with_allow_failure(mut self, allow_failure: bool) -> Self {
        self.allow_failure = allow_failure;
        self
    }

    /// Stages in insertion order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Directory processes run in and relative paths resolve against
    pub fn base_dir(&self) -> &Path {
        &self.context.base_dir
    }

    /// Appends a stage and returns a handle on it
    pub fn stage(&mut self, name: impl Into<String>) -> StageBuilder<'_> {
        self.stages.push(Stage::new(name));
        StageBuilder::new(self)
    }

    /// Appends a job to the last stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoStageDefined`] if no stage exists yet.
    pub fn job(&mut self, name: impl Into<String>) -> Result<JobBuilder<'_>, PipelineError> {
        self.last_stage_mut()
            .ok_or_else(|| PipelineError::NoStageDefined {
                reason: "to add a job".to_string(),
            })?
            .push(Job::new(name));
        Ok(JobBuilder::new(self))
    }

    /// Appends a `run` command to the last job.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoStageDefined`] or
    /// [`PipelineError::NoJobDefined`] if there is no job to append to.
    pub fn run(&mut self, script: impl Into<String>) -> Result<JobBuilder<'_>, PipelineError> {
        self.push_command(Command::run(script), "to add a command")
    }

    /// Appends a command reading `path` into `variable` to the last job.
    ///
    /// `path` is resolved against the base directory now, not when the
    /// command runs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoStageDefined`] or
    /// [`PipelineError::NoJobDefined`] if there is no job to append to, and
    /// [`PipelineError::DuplicateVariable`] if `variable` already holds a
    /// value and `overwrite` is false.
    pub fn read_file(
        &mut self,
        path: impl AsRef<Path>,
        variable: impl Into<String>,
        overwrite: bool,
    ) -> Result<JobBuilder<'_>, PipelineError> {
        const REASON: &str = "to open a file";

        self.current_job(REASON)?;
        let command = self.read_file_command(path.as_ref(), variable.into(), overwrite)?;
        self.push_command(command, REASON)
    }

    /// Appends a `print` command to the last job.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoStageDefined`] or
    /// [`PipelineError::NoJobDefined`] if there is no job to append to.
    pub fn print<I, P>(&mut self, params: I) -> Result<JobBuilder<'_>, PipelineError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PrintParam>,
    {
        self.push_command(Command::print(params), "to print something")
    }

    /// Creates a reference to a store variable, resolved when a `print` runs
    #[allow(clippy::unused_self)]
    pub fn reference(&self, name: impl Into<String>) -> PrintParam {
        PrintParam::reference(name)
    }

    /// Appends the stages of another pipeline.
    ///
    /// A path is resolved against the base directory and must point to a
    /// pipeline definition file with a top-level `pipelyne` entry.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] if the path does not exist and
    /// [`PipelineError::InvalidExport`] if the file does not define a
    /// pipeline.
    pub fn load(&mut self, source: impl Into<PipelineSource>) -> Result<&mut Self, PipelineError> {
        let loaded = match source.into() {
            PipelineSource::Instance(pipeline) => pipeline,
            PipelineSource::Path(path) => definition::load_file(&self.context.resolve(path))?,
        };

        tracing::debug!(stages = loaded.stages.len(), "Loaded pipeline");
        self.stages.extend(loaded.stages);
        Ok(self)
    }

    /// Sets a store variable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateVariable`] if `name` already holds a
    /// value and `overwrite` is false.
    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<StoreValue>,
        overwrite: bool,
    ) -> Result<(), PipelineError> {
        self.context.store.set(name, value, overwrite)
    }

    /// Current value of a store variable
    pub fn get_variable(&self, name: &str) -> Option<&StoreValue> {
        self.context.store.get(name)
    }

    /// The variable store
    pub fn variables(&self) -> &VariableStore {
        &self.context.store
    }

    /// Runs every stage in order and returns the pipeline status.
    ///
    /// States and results of a previous run are cleared first, so nodes
    /// skipped by this run report [`State::Unstarted`]. The variable store is
    /// kept.
    pub async fn execute(&mut self) -> bool {
        tracing::info!(
            run_id = %self.context.run_id,
            stages = self.stages.len(),
            base_dir = %self.context.base_dir.display(),
            "Starting pipeline"
        );
        let start = Instant::now();

        self.stages.iter_mut().for_each(Stage::reset);
        self.state = run_in_order(&mut self.stages, &mut self.context).await;

        tracing::info!(
            run_id = %self.context.run_id,
            result = %self.state,
            status = self.status(),
            duration_ms = start.elapsed().as_millis(),
            "Pipeline completed"
        );
        self.status()
    }

    /// Renders the configuration of a CI provider.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownProvider`] if `provider` is not a
    /// supported provider identifier.
    pub fn export_for(&self, provider: &str) -> Result<String, PipelineError> {
        let provider: CiProvider = provider.parse()?;
        exporter_for(provider).export(self)
    }

    /// Dumps the pipeline tree as pretty printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PipelineError> {
        dump::to_json(self)
    }

    /// Dumps the pipeline tree as an indented outline
    pub fn overview(&self) -> String {
        dump::overview(self)
    }

    /// Dumps the pipeline tree in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Serialization`] if a JSON dump fails.
    pub fn render(&self, format: DumpFormat) -> Result<String, PipelineError> {
        match format {
            DumpFormat::Json => self.to_json(),
            DumpFormat::Overview => Ok(self.overview()),
        }
    }

    pub(crate) fn last_stage_mut(&mut self) -> Option<&mut Stage> {
        self.stages.last_mut()
    }

    pub(crate) fn set_last_stage_allow_failure(&mut self) {
        if let Some(stage) = self.last_stage_mut() {
            stage.set_allow_failure(true);
        }
    }

    pub(crate) fn read_file_command(
        &self,
        path: &Path,
        variable: String,
        overwrite: bool,
    ) -> Result<Command, PipelineError> {
        if !overwrite && let Some(existing) = self.context.store.get(&variable) {
            return Err(PipelineError::DuplicateVariable {
                existing: existing.clone(),
                name: variable,
            });
        }
        Ok(Command::read_file(self.context.resolve(path), variable))
    }

    fn current_job(&mut self, reason: &str) -> Result<&mut Job, PipelineError> {
        self.last_stage_mut()
            .ok_or_else(|| PipelineError::NoStageDefined {
                reason: reason.to_string(),
            })?
            .last_job_mut()
            .ok_or_else(|| PipelineError::NoJobDefined {
                reason: reason.to_string(),
            })
    }

    fn push_command(
        &mut self,
        command: Command,
        reason: &str,
    ) -> Result<JobBuilder<'_>, PipelineError> {
        self.current_job(reason)?.push(command);
        Ok(JobBuilder::new(self))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pipeline: {} stages", self.stages.len())
    }
}

impl Runnable for Pipeline {
    fn id(&self) -> &str {
        &self.context.run_id
    }

    fn allow_failure(&self) -> bool {
        self.allow_failure
    }

    fn state(&self) -> State {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_pipeline() {
        let pipeline = Pipeline::with_base_dir("/work");
        assert!(pipeline.stages().is_empty());
        assert_eq!(pipeline.base_dir(), Path::new("/work"));
        assert!(pipeline.state().is_unstarted());
        assert_eq!(pipeline.to_string(), "Pipeline: 0 stages");
    }

    #[test]
    fn test_job_requires_stage() {
        let mut pipeline = Pipeline::new();
        let err = pipeline.job("lint").unwrap_err();
        assert_eq!(
            err,
            PipelineError::NoStageDefined {
                reason: "to add a job".to_string()
            }
        );
        assert_eq!(err.to_string(), "You need a stage to add a job (run .stage(...)).");
    }

    #[test]
    fn test_commands_require_stage_and_job() {
        let mut pipeline = Pipeline::new();
        assert!(matches!(
            pipeline.run("pwd"),
            Err(PipelineError::NoStageDefined { .. })
        ));
        assert!(matches!(
            pipeline.print(["x"]),
            Err(PipelineError::NoStageDefined { .. })
        ));

        pipeline.stage("build");
        assert!(matches!(
            pipeline.run("pwd"),
            Err(PipelineError::NoJobDefined { .. })
        ));
        assert!(matches!(
            pipeline.read_file("VERSION", "version", false),
            Err(PipelineError::NoJobDefined { .. })
        ));
    }

    #[test]
    fn test_root_calls_target_last_job() {
        let mut pipeline = Pipeline::new();
        pipeline.stage("first").job("a");
        pipeline.stage("second").job("b").job("c");
        pipeline.run("npm test").unwrap();

        let last = &pipeline.stages()[1];
        assert!(last.jobs()[0].commands().is_empty());
        assert_eq!(last.jobs()[1].commands()[0].script(), Some("npm test"));
    }

    #[test]
    fn test_read_file_resolves_path_at_build_time() {
        let mut pipeline = Pipeline::with_base_dir("/work");
        pipeline.stage("s").job("j");
        pipeline.read_file("VERSION", "version", false).unwrap();

        let command = &pipeline.stages()[0].jobs()[0].commands()[0];
        assert_eq!(command.kind().to_string(), "file read /work/VERSION -> version");
    }

    #[test]
    fn test_read_file_duplicate_variable() {
        let mut pipeline = Pipeline::new();
        pipeline.set_variable("version", "1.0", false).unwrap();
        pipeline.stage("s").job("j");

        let err = pipeline.read_file("VERSION", "version", false).unwrap_err();
        assert_eq!(
            err,
            PipelineError::DuplicateVariable {
                name: "version".to_string(),
                existing: StoreValue::from("1.0"),
            }
        );
        assert!(pipeline.stages()[0].jobs()[0].commands().is_empty());

        pipeline.read_file("VERSION", "version", true).unwrap();
        assert_eq!(pipeline.stages()[0].jobs()[0].commands().len(), 1);
    }

    #[test]
    fn test_variables_proxy_store() {
        let mut pipeline = Pipeline::new();
        pipeline.set_variable("b", 2, false).unwrap();
        pipeline.set_variable("a", true, false).unwrap();

        assert_eq!(pipeline.get_variable("b"), Some(&StoreValue::Number(2.0)));
        assert_eq!(pipeline.variables().list(), vec!["a", "b"]);
        assert!(pipeline.set_variable("a", false, false).is_err());
    }

    #[test]
    fn test_load_instance_appends_stages() {
        let mut other = Pipeline::new();
        other.stage("deploy").job("publish").run("npm publish");

        let mut pipeline = Pipeline::new();
        pipeline.stage("build");
        pipeline.load(other).unwrap().run("echo after-load").unwrap();

        let ids: Vec<_> = pipeline.stages().iter().map(Runnable::id).collect();
        assert_eq!(ids, vec!["build", "deploy"]);
        assert_eq!(pipeline.stages()[1].jobs()[0].commands().len(), 2);
    }

    #[test]
    fn test_export_unknown_provider() {
        let pipeline = Pipeline::new();
        assert_eq!(
            pipeline.export_for("jenkins").unwrap_err(),
            PipelineError::UnknownProvider("jenkins".to_string())
        );
    }

    #[tokio::test]
    async fn test_execute_empty_pipeline_passes() {
        let mut pipeline = Pipeline::new();
        assert!(pipeline.execute().await);
        assert!(pipeline.state().is_passed());
    }
}
