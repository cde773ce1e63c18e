//! pipelyne - run and export CI/CD pipelines
//!
//! Command-line front end for pipeline definition files.
//!
//! ## Commands
//!
//! - `pipelyne run` - Execute a pipeline locally
//! - `pipelyne export` - Render a pipeline for a CI provider
//! - `pipelyne show` - Print a pipeline as JSON or as an outline
//! - `pipelyne completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Run ./pipelyne.yml in the current directory
//! pipelyne run
//!
//! # Export to Travis CI
//! pipelyne export ci/pipelyne.yml --provider travis -o .travis.yml
//!
//! # Inspect the tree
//! pipelyne show --format json
//!
//! # Generate shell completions
//! pipelyne completions bash > /etc/bash_completion.d/pipelyne
//! ```
//!
//! Set `PIPELYNE_DEBUG=1` (or pass `--verbose`) for debug logs on stderr.

use pipelyne::infrastructure::debug_requested;
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if debug_requested() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
