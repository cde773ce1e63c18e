//! Jobs, ordered sequences of commands

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::command::Command;
use super::types::{State, slugify};
use crate::executor::{Execute, ExecutionContext, Runnable, run_in_order};
use async_trait::async_trait;
use std::fmt;
use std::time::Instant;

/// A job in a stage
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: String,
    name: String,
    allow_failure: bool,
    commands: Vec<Command>,
    state: State,
}

impl Job {
    /// Creates an empty job; its id is the slug of `name`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: slugify(&name),
            name,
            allow_failure: false,
            commands: Vec::new(),
            state: State::Unstarted,
        }
    }

    /// Sets whether this job may fail without halting its stage
    pub fn with_allow_failure(mut self, allow_failure: bool) -> Self {
        self.allow_failure = allow_failure;
        self
    }

    /// Adds a command to the job
    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Human readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commands in insertion order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub(crate) fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub(crate) fn set_allow_failure(&mut self, allow_failure: bool) {
        self.allow_failure = allow_failure;
    }

    pub(crate) fn reset(&mut self) {
        self.state = State::Unstarted;
        self.commands.iter_mut().for_each(Command::reset);
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({}): {} commands", self.id, self.commands.len())
    }
}

impl Runnable for Job {
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
impl Execute for Job {
    async fn execute(&mut self, context: &mut ExecutionContext) -> State {
        tracing::debug!(job = %self.id, commands = self.commands.len(), "Executing job");
        let start = Instant::now();

        self.state = run_in_order(&mut self.commands, context).await;

        tracing::debug!(
            job = %self.id,
            state = %self.state,
            status = self.status(),
            duration_ms = start.elapsed().as_millis(),
            "Job completed"
        );
        self.state
    }
}
