//! Pipeline execution traits
//!
//! This module defines the contract shared by every node of the pipeline
//! tree and the context handed down the tree while it runs.

use crate::pipeline::{State, VariableStore};
use async_trait::async_trait;
use std::path::PathBuf;

/// Node of the pipeline tree that carries an execution outcome.
///
/// `status` is what a parent looks at to decide whether to keep going: it is
/// true when the node passed or when its failure is allowed.
pub trait Runnable {
    /// Identifier of the node
    fn id(&self) -> &str;

    /// Whether a failure of this node may be ignored by its parent
    fn allow_failure(&self) -> bool;

    /// Outcome of the node's own execution
    fn state(&self) -> State;

    /// Whether iteration may continue past this node
    fn status(&self) -> bool {
        self.state().is_passed() || self.allow_failure()
    }
}

/// Node that can be executed against an [`ExecutionContext`]
#[async_trait]
pub trait Execute: Runnable + Send {
    /// Runs the node, records and returns its state
    async fn execute(&mut self, context: &mut ExecutionContext) -> State;
}

/// Context for pipeline execution
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Variables shared by every command of the run
    pub store: VariableStore,

    /// Working directory for spawned processes and relative file paths
    pub base_dir: PathBuf,

    /// Identifier of the current run, used to correlate log events
    pub run_id: String,
}

impl ExecutionContext {
    /// Creates a context rooted at the current directory
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_dir(std::env::current_dir().unwrap_or_default())
    }

    /// Creates a context rooted at `base_dir`
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: VariableStore::new(),
            base_dir: base_dir.into(),
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Resolves a path against the base directory
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<std::path::Path>) -> PathBuf {
        self.base_dir.join(path)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
