//! Error types for pipeline domain

use super::command::FileOperation;
use super::store::StoreValue;
use std::path::PathBuf;
use thiserror::Error;

/// Structural errors raised while building, loading or exporting a pipeline.
///
/// These are always returned to the caller of the builder or export call that
/// raised them. Failures that happen while a pipeline runs are recorded on the
/// failing command as a [`CommandError`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A job or command was added before any stage exists
    #[error("You need a stage {reason} (run .stage(...)).")]
    NoStageDefined {
        /// What the caller was trying to do.
        reason: String,
    },

    /// A command was added before the current stage has a job
    #[error("You need a job {reason} (run .job(...)).")]
    NoJobDefined {
        /// What the caller was trying to do.
        reason: String,
    },

    /// A variable was assigned twice without asking for an overwrite
    #[error(
        "The variable name \"{name}\" was already assigned the value {existing}. \
         Specify overwrite to replace it."
    )]
    DuplicateVariable {
        /// Name of the variable.
        name: String,
        /// Value it currently holds.
        existing: StoreValue,
    },

    /// A pipeline definition file could not be found
    #[error("The pipeline definition to import at \"{}\" could not be found.", path.display())]
    NotFound {
        /// Path that was resolved.
        path: PathBuf,
    },

    /// A file was found but does not expose a pipeline
    #[error("The file at \"{}\" does not define a `pipelyne` pipeline: {reason}", path.display())]
    InvalidExport {
        /// Path of the file.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// No exporter exists for the requested CI provider
    #[error("Unknown CI provider \"{0}\".")]
    UnknownProvider(String),

    /// Dumping or exporting the pipeline failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result codes recorded on a command after it runs.
pub mod status_code {
    /// The command completed successfully.
    pub const SUCCESS: i32 = 0;
    /// The command has not been executed yet.
    pub const UNSTARTED: i32 = -1;
    /// The requested file operation is not supported.
    pub const UNSUPPORTED_OPERATION: i32 = -2;
    /// The file to read does not exist.
    pub const FILE_NOT_FOUND: i32 = -3;
    /// Any other failure.
    pub const GENERIC: i32 = -10_000;
}

/// Execution-time failure of a single command.
///
/// Never returned from [`Pipeline::execute`](super::Pipeline::execute); it is
/// stored on the command's [`CommandResult`](super::CommandResult) and the
/// command's state becomes failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Only `read` is supported for file commands
    #[error("Unsupported file operation \"{operation}\"")]
    UnsupportedFileOperation {
        /// The requested operation.
        operation: FileOperation,
    },

    /// The file to read does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The process could not be started
    #[error("Failed to spawn '{program}': {reason}")]
    Spawn {
        /// Program name.
        program: String,
        /// OS error message.
        reason: String,
    },

    /// The process exited without an exit code
    #[error("'{program}' was terminated by a signal")]
    Terminated {
        /// Program name.
        program: String,
    },

    /// IO error while reading a file or writing output
    #[error("IO error: {0}")]
    Io(String),
}

impl CommandError {
    /// Result code recorded for this failure
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::UnsupportedFileOperation { .. } => status_code::UNSUPPORTED_OPERATION,
            Self::FileNotFound { .. } => status_code::FILE_NOT_FOUND,
            Self::Spawn { .. } | Self::Terminated { .. } | Self::Io(_) => status_code::GENERIC,
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
