//! Pipeline execution layer
//!
//! This module contains the traits every pipeline node implements, the
//! sequential aggregation routine and process spawning.

mod process;
mod sequential;
mod traits;

pub use process::{ProcessExit, spawn_inherited, split_script};
pub use sequential::run_in_order;
pub use traits::{Execute, ExecutionContext, Runnable};
