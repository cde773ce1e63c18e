//! # Pipelyne - CI/CD pipelines as code
//!
//! Pipelyne describes a linear pipeline as a tree of stages, jobs and
//! commands. The same tree can be executed locally, one process at a time,
//! or exported as the configuration file of a CI provider.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pipelyne::prelude::*;
//!
//! # async fn demo() -> Result<(), PipelineError> {
//! let mut pipeline = Pipeline::new();
//! pipeline
//!     .stage("build")
//!     .job("compile")
//!     .npm()
//!     .install(false)
//!     .read_file("VERSION", "version", false)?
//!     .print(params!["version =", ref "version"]);
//!
//! let passed = pipeline.execute().await;
//! let travis = pipeline.export_for("travis")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Sequential engine**: commands, jobs and stages run in order and a
//!   failure halts its level unless the node allows failure
//! - **Variable store**: `readFile` commands load files into variables that
//!   `print` commands reference when they run
//! - **Definition files**: YAML or JSON documents with a `pipelyne` entry
//! - **Export**: Travis CI configuration, JSON and outline dumps

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod macros;

pub mod executor;
pub mod infrastructure;
pub mod pipeline;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use executor::{Execute, ExecutionContext, Runnable, run_in_order};
pub use infrastructure::{CiProvider, Config, Exporter, TravisExporter, init_logging};
pub use pipeline::{
    Command, CommandKind, CommandResult, DumpFormat, Job, JobBuilder, Pipeline, PipelineError,
    PipelineSource, PrintParam, Stage, StageBuilder, State, StoreValue, VariableStore,
};

/// Version of the pipelyne crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
