//! CLI for pipelyne
//!
//! Subcommands:
//! - `run`: Execute a pipeline definition locally
//! - `export`: Render a pipeline for a CI provider
//! - `show`: Print a pipeline as JSON or as an outline
//! - `completions`: Generate shell completions

pub mod completions;
pub mod export;
pub mod run;
pub mod show;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use pipelyne::infrastructure::{Config, debug_requested, init_logging};
use pipelyne::pipeline::DumpFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// CLI arguments for pipelyne
#[derive(Parser, Debug)]
#[command(name = "pipelyne")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./.pipelyne.yml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a pipeline definition
    Run {
        /// Pipeline definition (defaults to the configured definition)
        file: Option<PathBuf>,
        /// Working directory for commands
        #[arg(short, long)]
        base_dir: Option<PathBuf>,
    },

    /// Export a pipeline to a CI provider configuration
    Export {
        /// Pipeline definition (defaults to the configured definition)
        file: Option<PathBuf>,
        /// CI provider (defaults to the configured provider)
        #[arg(short, long, value_enum)]
        provider: Option<ProviderArg>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a pipeline
    Show {
        /// Pipeline definition (defaults to the configured definition)
        file: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Overview)]
        format: FormatArg,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    Travis,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Json,
    Overview,
}

impl From<FormatArg> for DumpFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => DumpFormat::Json,
            FormatArg::Overview => DumpFormat::Overview,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).context("Failed to load configuration"),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Config::discover(&cwd).context("Failed to load configuration")
        }
    }
}

/// Parse and execute CLI arguments
pub async fn run() -> Result<ExitCode> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let level = if args.verbose || debug_requested() {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(level);

    match args.command {
        Command::Run { file, base_dir } => {
            let file = file.unwrap_or_else(|| config.definition.clone());
            let base_dir = match base_dir.or_else(|| config.base_dir.clone()) {
                Some(dir) => dir,
                None => std::env::current_dir().context("Failed to read current directory")?,
            };

            if run::run_pipeline(&file, &base_dir).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
        Command::Export {
            file,
            provider,
            output,
        } => {
            let file = file.unwrap_or_else(|| config.definition.clone());
            let provider = match provider {
                Some(ProviderArg::Travis) => "travis",
                None => config.default_provider.as_str(),
            };

            let exported = export::export_pipeline(&file, provider)?;

            if let Some(output_path) = output {
                export::save_export(&exported, &output_path)?;
            } else {
                print!("{exported}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { file, format } => {
            let file = file.unwrap_or_else(|| config.definition.clone());
            let rendered = show::render_pipeline(&file, format.into())?;
            if rendered.ends_with('\n') {
                print!("{rendered}");
            } else {
                println!("{rendered}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let completions = completions::generate_completions(shell_enum)?;

            if let Some(output_path) = output {
                completions::save_completions(&completions, &output_path)?;
            } else {
                println!("{completions}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let args = Args::try_parse_from(["pipelyne", "run", "ci.yml", "--base-dir", "/work"]).unwrap();
        assert!(!args.verbose);
        match args.command {
            Command::Run { file, base_dir } => {
                assert_eq!(file, Some(PathBuf::from("ci.yml")));
                assert_eq!(base_dir, Some(PathBuf::from("/work")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["pipelyne", "show", "--format", "json", "-v", "--config", "c.yml"])
                .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("c.yml")));
        assert!(matches!(
            args.command,
            Command::Show {
                file: None,
                format: FormatArg::Json
            }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_provider() {
        assert!(Args::try_parse_from(["pipelyne", "export", "--provider", "jenkins"]).is_err());
    }

    #[test]
    fn test_format_arg_into_dump_format() {
        assert_eq!(DumpFormat::from(FormatArg::Json), DumpFormat::Json);
        assert_eq!(DumpFormat::from(FormatArg::Overview), DumpFormat::Overview);
    }
}
