//! Core types for pipeline domain
//!
//! This module contains the execution state shared by every node of the
//! pipeline tree and the identifier rule for named nodes.

#![allow(clippy::must_use_candidate)]

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a node's own execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// The node has not run yet
    #[default]
    Unstarted,
    /// The node and everything it ran passed
    Passed,
    /// The node, or one of its children, failed
    Failed,
}

impl State {
    /// Returns true if the node passed
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns true if the node failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns true if the node has not run
    #[must_use]
    pub fn is_unstarted(&self) -> bool {
        matches!(self, Self::Unstarted)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstarted => write!(f, "UNSTARTED"),
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Derives a stage or job identifier from a human readable name.
///
/// The result is lowercase, with every run of characters that are not
/// letters, combining marks or digits replaced by a single hyphen and no
/// hyphen at either end.
///
/// ```rust
/// use pipelyne::pipeline::slugify;
///
/// assert_eq!(slugify("Some d3scrib3d Stage"), "some-d3scrib3d-stage");
/// assert_eq!(slugify("A b C D"), slugify("a b c d"));
/// ```
pub fn slugify(name: &str) -> String {
    static SEPARATORS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}]+").expect("separator pattern is valid"));

    let lowered = name.to_lowercase();
    SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
