//! Commands, the unit of work of a pipeline
//!
//! A command is one of three kinds: `run` spawns a process, `file` loads a
//! file into the variable store and `print` writes a line built from
//! literals and variable references resolved when the command runs.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::errors::{CommandError, status_code};
use super::store::{StoreValue, VariableStore};
use super::types::State;
use crate::executor::{Execute, ExecutionContext, Runnable, spawn_inherited, split_script};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Parameter of a `print` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrintParam {
    /// Value of a store variable, looked up when the command runs
    Reference {
        /// Variable name
        #[serde(rename = "ref")]
        name: String,
    },
    /// Value printed as is
    Literal(StoreValue),
}

impl PrintParam {
    /// Creates a deferred reference to a store variable
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference { name: name.into() }
    }

    /// Resolves the parameter against the store as it is now
    pub fn resolve(&self, store: &VariableStore) -> Option<StoreValue> {
        match self {
            Self::Reference { name } => store.get(name).cloned(),
            Self::Literal(value) => Some(value.clone()),
        }
    }
}

impl fmt::Display for PrintParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference { name } => write!(f, "${{{name}}}"),
            Self::Literal(value) => write!(f, "{value}"),
        }
    }
}

impl From<StoreValue> for PrintParam {
    fn from(value: StoreValue) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for PrintParam {
    fn from(value: &str) -> Self {
        Self::Literal(value.into())
    }
}

impl From<String> for PrintParam {
    fn from(value: String) -> Self {
        Self::Literal(value.into())
    }
}

impl From<bool> for PrintParam {
    fn from(value: bool) -> Self {
        Self::Literal(value.into())
    }
}

impl From<f64> for PrintParam {
    fn from(value: f64) -> Self {
        Self::Literal(value.into())
    }
}

impl From<i32> for PrintParam {
    fn from(value: i32) -> Self {
        Self::Literal(value.into())
    }
}

/// Sub-operation of a file command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    /// Read the whole file into a variable
    #[default]
    Read,
    /// Write a variable to a file, not supported by the local executor
    Write,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Kind of a command with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CommandKind {
    /// Spawn a process
    Run {
        /// Script as written by the pipeline author
        script: String,
        /// Program, the first word of the script
        program: String,
        /// Remaining words of the script
        args: Vec<String>,
    },

    /// Operate on a file
    File {
        /// Sub-operation
        operation: FileOperation,
        /// Path of the file
        path: PathBuf,
        /// Variable receiving the contents
        variable: String,
    },

    /// Print values
    Print {
        /// Literals and references joined by a space
        params: Vec<PrintParam>,
    },
}

impl CommandKind {
    /// Short name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run { .. } => "run",
            Self::File { .. } => "file",
            Self::Print { .. } => "print",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run { script, .. } => f.write_str(script),
            Self::File {
                operation,
                path,
                variable,
            } => write!(f, "file {operation} {} -> {variable}", path.display()),
            Self::Print { params } => {
                let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
                write!(f, "print {}", rendered.join(" "))
            }
        }
    }
}

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code for `run`, one of [`status_code`] otherwise
    pub code: i32,
    /// Payload, the file contents for a successful read
    pub data: Option<String>,
    /// Line written by a `print`
    pub output: Option<String>,
    /// Failure that prevented the command from completing
    pub error: Option<CommandError>,
}

impl CommandResult {
    fn code(code: i32) -> Self {
        Self {
            code,
            data: None,
            output: None,
            error: None,
        }
    }

    fn failure(error: CommandError) -> Self {
        Self {
            code: error.code(),
            data: None,
            output: None,
            error: Some(error),
        }
    }
}

impl Default for CommandResult {
    fn default() -> Self {
        Self::code(status_code::UNSTARTED)
    }
}

/// A single command in a job
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    id: String,
    kind: CommandKind,
    allow_failure: bool,
    state: State,
    result: CommandResult,
}

impl Command {
    /// Creates a command of the given kind
    pub fn new(kind: CommandKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            allow_failure: false,
            state: State::Unstarted,
            result: CommandResult::default(),
        }
    }

    /// Creates a `run` command.
    ///
    /// The script is split on whitespace into program and arguments; quoting
    /// is not supported.
    pub fn run(script: impl Into<String>) -> Self {
        let script = script.into();
        let (program, args) = split_script(&script);
        Self::new(CommandKind::Run {
            script,
            program,
            args,
        })
    }

    /// Creates a command reading `path` into `variable`
    pub fn read_file(path: impl Into<PathBuf>, variable: impl Into<String>) -> Self {
        Self::file(FileOperation::Read, path, variable)
    }

    /// Creates a file command with an explicit sub-operation
    pub fn file(
        operation: FileOperation,
        path: impl Into<PathBuf>,
        variable: impl Into<String>,
    ) -> Self {
        Self::new(CommandKind::File {
            operation,
            path: path.into(),
            variable: variable.into(),
        })
    }

    /// Creates a `print` command
    pub fn print<I, P>(params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PrintParam>,
    {
        Self::new(CommandKind::Print {
            params: params.into_iter().map(Into::into).collect(),
        })
    }

    /// Sets whether this command may fail without halting its job
    pub fn with_allow_failure(mut self, allow_failure: bool) -> Self {
        self.allow_failure = allow_failure;
        self
    }

    /// Kind and parameters
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Raw script of a `run` command
    pub fn script(&self) -> Option<&str> {
        match &self.kind {
            CommandKind::Run { script, .. } => Some(script),
            _ => None,
        }
    }

    /// Result of the last execution
    pub fn result(&self) -> &CommandResult {
        &self.result
    }

    /// Result code of the last execution
    pub fn exit_code(&self) -> i32 {
        self.result.code
    }

    pub(crate) fn reset(&mut self) {
        self.state = State::Unstarted;
        self.result = CommandResult::default();
    }

    async fn dispatch(&self, context: &mut ExecutionContext) -> CommandResult {
        match &self.kind {
            CommandKind::Run { program, args, .. } => {
                Self::run_process(program, args, context).await
            }
            CommandKind::File {
                operation,
                path,
                variable,
            } => Self::run_file(*operation, path, variable, context).await,
            CommandKind::Print { params } => Self::run_print(params, &context.store),
        }
    }

    async fn run_process(
        program: &str,
        args: &[String],
        context: &ExecutionContext,
    ) -> CommandResult {
        match spawn_inherited(program, args, &context.base_dir).await {
            Ok(exit) => {
                tracing::debug!(
                    program = %program,
                    code = ?exit.code,
                    success = exit.is_success(),
                    duration_ms = exit.duration.as_millis(),
                    "Process exited"
                );
                match exit.code {
                    Some(code) => CommandResult::code(code),
                    None => CommandResult::failure(CommandError::Terminated {
                        program: program.to_string(),
                    }),
                }
            }
            Err(error) => {
                tracing::error!(program = %program, error = %error, "Could not start process");
                CommandResult::failure(error)
            }
        }
    }

    async fn run_file(
        operation: FileOperation,
        path: &Path,
        variable: &str,
        context: &mut ExecutionContext,
    ) -> CommandResult {
        if operation != FileOperation::Read {
            return CommandResult::failure(CommandError::UnsupportedFileOperation { operation });
        }

        let path = context.resolve(path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return CommandResult::failure(CommandError::FileNotFound { path });
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                context.store.replace(variable, contents.as_str());
                tracing::debug!(path = %path.display(), variable = %variable, bytes = contents.len(), "File loaded");
                CommandResult {
                    data: Some(contents),
                    ..CommandResult::code(status_code::SUCCESS)
                }
            }
            Err(e) => CommandResult::failure(e.into()),
        }
    }

    fn run_print(params: &[PrintParam], store: &VariableStore) -> CommandResult {
        let line = params
            .iter()
            .map(|param| {
                param
                    .resolve(store)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(" ");

        let mut stdout = std::io::stdout().lock();
        match writeln!(stdout, "{line}").and_then(|()| stdout.flush()) {
            Ok(()) => CommandResult {
                output: Some(line),
                ..CommandResult::code(status_code::SUCCESS)
            },
            Err(e) => CommandResult::failure(e.into()),
        }
    }
}

impl Runnable for Command {
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
impl Execute for Command {
    async fn execute(&mut self, context: &mut ExecutionContext) -> State {
        tracing::debug!(command = %self.id, kind = self.kind.name(), "Executing command: {}", self.kind);

        self.result = self.dispatch(context).await;
        self.state = if self.result.code == status_code::SUCCESS {
            State::Passed
        } else {
            State::Failed
        };

        tracing::debug!(
            command = %self.id,
            code = self.result.code,
            state = %self.state,
            "Command completed"
        );
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> ExecutionContext {
        ExecutionContext::with_base_dir(dir.path())
    }

    #[test]
    fn test_run_command_splits_script() {
        let command = Command::run("npm run build");
        assert_eq!(command.script(), Some("npm run build"));
        assert!(matches!(
            command.kind(),
            CommandKind::Run { program, args, .. } if program == "npm" && args == &["run", "build"]
        ));
        assert_eq!(command.exit_code(), status_code::UNSTARTED);
        assert!(command.state().is_unstarted());
    }

    #[test]
    fn test_command_ids_are_unique() {
        let a = Command::run("pwd");
        let b = Command::run("pwd");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_allow_failure_flag() {
        assert!(!Command::run("pwd").allow_failure);
        assert!(Command::run("pwd").with_allow_failure(true).allow_failure);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Command::run("cargo test").kind().to_string(), "cargo test");
        assert_eq!(
            Command::read_file("VERSION", "version").kind().to_string(),
            "file read VERSION -> version"
        );
        assert_eq!(
            Command::print(vec![PrintParam::from("v ="), PrintParam::reference("version")])
                .kind()
                .to_string(),
            "print v = ${version}"
        );
    }

    #[test]
    fn test_reference_is_late_bound() {
        let mut store = VariableStore::new();
        let reference = PrintParam::reference("x");
        assert!(reference.resolve(&store).is_none());

        store.set("x", "later", false).unwrap();
        assert_eq!(reference.resolve(&store), Some(StoreValue::from("later")));
    }

    #[test]
    fn test_print_param_serde() {
        let params = vec![PrintParam::from("x ="), PrintParam::reference("x")];
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"["x =",{"ref":"x"}]"#);

        let back: Vec<PrintParam> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[tokio::test]
    async fn test_print_resolves_at_execution_time() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        let mut command = Command::print(vec![
            PrintParam::from("count ="),
            PrintParam::reference("count"),
            PrintParam::from(true),
        ]);

        context.store.set("count", 3, false).unwrap();
        assert_eq!(command.execute(&mut context).await, State::Passed);
        assert_eq!(command.result().output.as_deref(), Some("count = 3 true"));
        assert_eq!(command.exit_code(), status_code::SUCCESS);
    }

    #[tokio::test]
    async fn test_print_absent_reference_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        let mut command = Command::print(vec![PrintParam::from("x ="), PrintParam::reference("x")]);

        command.execute(&mut context).await;
        assert!(command.state().is_passed());
        assert_eq!(command.result().output.as_deref(), Some("x = "));
    }

    #[tokio::test]
    async fn test_file_read_stores_contents() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("VERSION"), "__abcd").unwrap();
        let mut context = context(&dir);
        context.store.set("version", "stale", false).unwrap();

        let mut command = Command::read_file("VERSION", "version");
        assert_eq!(command.execute(&mut context).await, State::Passed);
        assert_eq!(command.result().data.as_deref(), Some("__abcd"));
        assert_eq!(context.store.get("version"), Some(&StoreValue::from("__abcd")));
    }

    #[tokio::test]
    async fn test_file_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        let mut command = Command::read_file("missing.txt", "missing");

        assert_eq!(command.execute(&mut context).await, State::Failed);
        assert_eq!(command.exit_code(), status_code::FILE_NOT_FOUND);
        assert!(matches!(
            command.result().error,
            Some(CommandError::FileNotFound { .. })
        ));
        assert!(!context.store.contains("missing"));
    }

    #[tokio::test]
    async fn test_file_unsupported_operation() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        let mut command = Command::file(FileOperation::Write, "out.txt", "out");

        assert_eq!(command.execute(&mut context).await, State::Failed);
        assert_eq!(command.exit_code(), status_code::UNSUPPORTED_OPERATION);
        assert!(!dir.path().join("out.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_records_exit_code() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let mut ok = Command::run("true");
        assert_eq!(ok.execute(&mut context).await, State::Passed);
        assert_eq!(ok.exit_code(), 0);

        let mut failed = Command::run("false");
        assert_eq!(failed.execute(&mut context).await, State::Failed);
        assert_eq!(failed.exit_code(), 1);
        assert!(!failed.status());
        assert!(failed.clone().with_allow_failure(true).status());
    }

    #[tokio::test]
    async fn test_run_missing_program_fails() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        let mut command = Command::run("pipelyne-no-such-program --flag");

        assert_eq!(command.execute(&mut context).await, State::Failed);
        assert_eq!(command.exit_code(), status_code::GENERIC);
        assert!(matches!(command.result().error, Some(CommandError::Spawn { .. })));
    }
}
