//! Prelude module for common imports

// Re-export macros
pub use crate::params;

// Re-export pipeline types
pub use crate::pipeline::builder::{JobBuilder, Npm, StageBuilder};
pub use crate::pipeline::command::{Command, CommandKind, FileOperation, PrintParam};
pub use crate::pipeline::dump::DumpFormat;
pub use crate::pipeline::errors::{CommandError, PipelineError, status_code};
pub use crate::pipeline::pipeline_def::Pipeline;
pub use crate::pipeline::store::{StoreValue, VariableStore};
pub use crate::pipeline::types::State;

// Re-export executor types
pub use crate::executor::{Execute, ExecutionContext, Runnable};
