//! CI provider exporters
//!
//! An exporter renders a pipeline as the configuration file of an external
//! CI service. Only the `run` commands are exported; the rest of the tree is
//! reduced to echo markers so the provider's log shows where each stage and
//! job starts.

use super::travis::TravisExporter;
use crate::pipeline::{Pipeline, PipelineError};
use std::fmt;
use std::str::FromStr;

/// Supported CI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiProvider {
    /// Travis CI (`.travis.yml`)
    Travis,
}

impl CiProvider {
    /// Identifier accepted by [`Pipeline::export_for`]
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Travis => "travis",
        }
    }
}

impl FromStr for CiProvider {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "travis" => Ok(Self::Travis),
            other => Err(PipelineError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for CiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Renders a pipeline for a CI provider
pub trait Exporter {
    /// Provider this exporter targets
    fn provider(&self) -> CiProvider;

    /// Renders the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Serialization`] if the configuration cannot
    /// be serialized.
    fn export(&self, pipeline: &Pipeline) -> Result<String, PipelineError>;
}

/// Returns the exporter for `provider`
#[must_use]
pub fn exporter_for(provider: CiProvider) -> Box<dyn Exporter> {
    match provider {
        CiProvider::Travis => Box::new(TravisExporter::new()),
    }
}
