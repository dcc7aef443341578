//! Planner (spec.md §4.4).
//!
//! Computes the shortest path between the world's recorded change id and
//! the checked-out revision: a run of revisions to roll back (newest
//! first) followed by a run to commit (oldest first). Pure function over
//! a [`Vcs`] — no I/O of its own, so it is exercised entirely against
//! `vcs::fake::FakeVcs` (grounded in `other_examples/2e665980_yuja-jj__cli-src-commands-rebase.rs.rs`'s
//! approach of turning ancestry queries into an ordered revision set to
//! replay).

use crate::vcs::{RevisionId, Vcs, VcsError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Revisions to roll back, newest first.
    pub rollback: Vec<RevisionId>,
    /// Revisions to commit, oldest first.
    pub commit: Vec<RevisionId>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.rollback.is_empty() && self.commit.is_empty()
    }
}

/// Computes the plan to bring `world_id` to `local_id`.
///
/// Three cases (spec.md §4.4):
/// - `world_id == local_id`: already synced, empty plan.
/// - `world_id` is the empty pre-tracking sentinel: commit the full
///   history of `local_id`, oldest first; nothing to roll back.
/// - otherwise: `world_id` and `local_id` are both real revisions.
///   Roll back everything reachable from `world_id` but not from
///   `local_id` (newest first), then commit everything reachable from
///   `local_id` but not from `world_id` (oldest first).
pub fn plan(world_id: &str, local_id: &str, vcs: &dyn Vcs) -> Result<Plan, VcsError> {
    if world_id == local_id {
        return Ok(Plan {
            rollback: Vec::new(),
            commit: Vec::new(),
        });
    }

    if world_id.is_empty() {
        return Ok(Plan {
            rollback: Vec::new(),
            commit: vcs.full_history_oldest_first()?,
        });
    }

    let rollback = vcs.ancestors_excluding(world_id, local_id)?;
    let commit = vcs.ancestors_excluding_reverse(local_id, world_id)?;
    Ok(Plan { rollback, commit })
}
