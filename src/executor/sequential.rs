//! Sequential aggregation shared by jobs, stages and pipelines

use super::traits::{Execute, ExecutionContext};
use crate::pipeline::State;

/// Runs `children` one after another and aggregates their outcome.
///
/// Any failed child marks the aggregate as failed, even when that child's
/// failure is allowed. Iteration stops after the first child whose status is
/// false; the remaining children stay unstarted.
pub async fn run_in_order<R: Execute>(children: &mut [R], context: &mut ExecutionContext) -> State {
    let mut state = State::Passed;

    for child in children.iter_mut() {
        child.execute(context).await;

        if child.state().is_failed() {
            state = State::Failed;
        }

        if !child.status() {
            tracing::warn!(node = %child.id(), "Node failed, skipping remaining siblings");
            break;
        }
    }

    state
}
