//! Pipeline domain types and logic
//!
//! A pipeline is a tree of stages, jobs and commands. It is assembled with
//! the builder handles returned by [`Pipeline::stage`] and [`Pipeline::job`],
//! or loaded from a definition file, then executed sequentially.

pub mod builder;
pub mod command;
pub mod definition;
pub mod dump;
pub mod errors;
pub mod job;
pub mod pipeline_def;
pub mod stage;
pub mod store;
pub mod types;


pub use builder::{JobBuilder, Npm, StageBuilder};
pub use command::{Command, CommandKind, CommandResult, FileOperation, PrintParam};
pub use definition::{PipelineDefinition, PipelineSource};
pub use dump::DumpFormat;
pub use errors::{CommandError, PipelineError, status_code};
pub use job::Job;
pub use pipeline_def::Pipeline;
pub use stage::Stage;
pub use store::{StoreValue, VariableStore};
pub use types::{State, slugify};
