//! Stage types for pipeline definition
//!
//! A stage is an ordered list of jobs. Stages run one after another and a
//! stage runs its jobs one after another.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::job::Job;
use super::types::{State, slugify};
use crate::executor::{Execute, ExecutionContext, Runnable, run_in_order};
use async_trait::async_trait;
use std::fmt;
use std::time::Instant;

/// A stage in a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    id: String,
    name: String,
    allow_failure: bool,
    jobs: Vec<Job>,
    state: State,
}

impl Stage {
    /// Creates an empty stage; its id is the slug of `name`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: slugify(&name),
            name,
            allow_failure: false,
            jobs: Vec::new(),
            state: State::Unstarted,
        }
    }

    /// Sets whether this stage may fail without halting the pipeline
    pub fn with_allow_failure(mut self, allow_failure: bool) -> Self {
        self.allow_failure = allow_failure;
        self
    }

    /// Adds a job to the stage
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Human readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Jobs in insertion order
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub(crate) fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub(crate) fn last_job_mut(&mut self) -> Option<&mut Job> {
        self.jobs.last_mut()
    }

    pub(crate) fn set_allow_failure(&mut self, allow_failure: bool) {
        self.allow_failure = allow_failure;
    }

    pub(crate) fn reset(&mut self) {
        self.state = State::Unstarted;
        self.jobs.iter_mut().for_each(Job::reset);
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage({}): {} jobs", self.id, self.jobs.len())
    }
}

impl Runnable for Stage {
    fn id(&self) -> &str {
        &self.id
    }

    fn allow_failure(&self) -> bool {
        self.allow_failure
    }

    fn state(&self) -> State {
        self.state
    }
}

#[async_trait]
impl Execute for Stage {
    async fn execute(&mut self, context: &mut ExecutionContext) -> State {
        tracing::info!(stage = %self.id, jobs = self.jobs.len(), "Executing stage");
        let start = Instant::now();

        self.state = run_in_order(&mut self.jobs, context).await;

        tracing::info!(
            stage = %self.id,
            result = %self.state,
            status = self.status(),
            duration_ms = start.elapsed().as_millis(),
            "Stage completed"
        );
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Command;

    #[test]
    fn test_stage_creation() {
        let stage = Stage::new("Build & Package");

        assert_eq!(stage.id(), "build-package");
        assert_eq!(stage.name(), "Build & Package");
        assert!(stage.jobs().is_empty());
        assert!(!stage.allow_failure());
    }

    #[test]
    fn test_stage_display() {
        let stage = Stage::new("Build").with_job(Job::new("compile"));
        assert_eq!(stage.to_string(), "Stage(build): 1 jobs");
    }

    #[test]
    fn test_stage_with_allow_failure() {
        let stage = Stage::new("Deploy").with_allow_failure(true);
        assert!(stage.allow_failure());
        assert!(stage.status());
    }

    #[tokio::test]
    async fn test_failed_job_halts_stage() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut context = ExecutionContext::with_base_dir(dir.path());
        let mut stage = Stage::new("verify")
            .with_job(Job::new("read").with_command(Command::read_file("missing", "x")))
            .with_job(Job::new("after").with_command(Command::print(["after"])));

        assert_eq!(stage.execute(&mut context).await, State::Failed);
        assert!(stage.jobs()[0].state().is_failed());
        assert!(stage.jobs()[1].state().is_unstarted());
    }

    #[tokio::test]
    async fn test_allowed_job_failure_lets_stage_continue() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut context = ExecutionContext::with_base_dir(dir.path());
        let mut stage = Stage::new("verify")
            .with_job(
                Job::new("read")
                    .with_allow_failure(true)
                    .with_command(Command::read_file("missing", "x")),
            )
            .with_job(Job::new("after").with_command(Command::print(["after"])));

        assert_eq!(stage.execute(&mut context).await, State::Failed);
        assert!(!stage.status());
        assert!(stage.jobs()[1].state().is_passed());
    }
}
