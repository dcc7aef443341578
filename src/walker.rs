//! Revision state machine (spec.md §4.5).
//!
//! Drives the hook quintet for a single revision. Doesn't touch the
//! session queues itself — the controller pops a revision, calls
//! [`Walker::step`], and on error pushes the revision back to its queue
//! front before propagating. Grounded in the teacher's
//! `commands/hooks.rs::HookPipeline` (prepare, run, report) and in
//! `other_examples/1766aeb3_mlcui-google-git-branchless__src-commands-hooks.rs.rs`
//! / `other_examples/285175e9_arxanas-git-branchless__...-rewrite_hooks.rs.rs`,
//! which drive a near-identical "rewrite one commit, check out its
//! successor, propagate a structured failure" loop.

use crate::error::{Phase, SyncError};
use crate::hooks::{HookRunner, CHANGE_HOOK_NAMES};
use crate::vcs::Vcs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The phase's hooks ran and the revision is fully applied.
    Applied,
    /// None of the four change-specific hooks exist at this revision
    /// (spec.md §3's "no-op revision").
    Noop,
}

pub struct Walker<'a> {
    vcs: &'a dyn Vcs,
    hooks: &'a HookRunner,
}

impl<'a> Walker<'a> {
    pub fn new(vcs: &'a dyn Vcs, hooks: &'a HookRunner) -> Self {
        Self { vcs, hooks }
    }

    /// Processes `revision` in `phase`. Callers own queue bookkeeping:
    /// on `Err`, `revision` must be pushed back to the front of its queue
    /// before the error is surfaced to the operator.
    pub fn step(&self, revision: &str, phase: Phase) -> Result<StepOutcome, SyncError> {
        let checked_out = self
            .vcs
            .checkout(revision)
            .map_err(|e| SyncError::walk(revision, phase, format!("checkout of {revision} failed: {e}")))?;
        if !checked_out {
            return Err(SyncError::walk(
                revision,
                phase,
                format!("checkout of {revision} failed"),
            ));
        }

        if !CHANGE_HOOK_NAMES.iter().any(|name| self.hooks.exists(name)) {
            return Ok(StepOutcome::Noop);
        }

        let mut hook_names: Vec<&str> = CHANGE_HOOK_NAMES.to_vec();
        hook_names.push("set-change-id");
        self.hooks
            .validate_all(&hook_names)
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;

        match phase {
            Phase::Commit => self.commit_revision(revision)?,
            Phase::Rollback => self.rollback_revision(revision)?,
        }

        Ok(StepOutcome::Applied)
    }

    fn commit_revision(&self, revision: &str) -> Result<(), SyncError> {
        let phase = Phase::Commit;

        let status = self
            .hooks
            .run("commit", &[])
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
        if !status.success() {
            return Err(SyncError::walk(
                revision,
                phase,
                format!("commit failed at {revision}; the system may be dirty"),
            ));
        }

        let status = self
            .hooks
            .run("set-change-id", &[revision])
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
        if !status.success() {
            return Err(SyncError::walk(
                revision,
                phase,
                format!("set-change-id failed at {revision}; commit succeeded but id update did not"),
            ));
        }

        let status = self
            .hooks
            .run("verify-commit", &[])
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
        if !status.success() {
            let world_id_hint = self
                .hooks
                .capture("get-change-id")
                .ok()
                .filter(|(_, status)| status.success())
                .map(|(stdout, _)| stdout)
                .filter(|stdout| !stdout.is_empty());
            return Err(SyncError::walk_with_world_hint(
                revision,
                phase,
                format!("verify-commit failed at {revision}"),
                world_id_hint,
            ));
        }

        Ok(())
    }

    fn rollback_revision(&self, revision: &str) -> Result<(), SyncError> {
        let phase = Phase::Rollback;

        let status = self
            .hooks
            .run("rollback", &[])
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
        if !status.success() {
            return Err(SyncError::walk(
                revision,
                phase,
                format!("rollback failed at {revision}"),
            ));
        }

        let status = self
            .hooks
            .run("verify-rollback", &[])
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
        if !status.success() {
            return Err(SyncError::walk(
                revision,
                phase,
                format!("verify-rollback failed at {revision}"),
            ));
        }

        let is_root = self
            .vcs
            .is_root_commit()
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;

        if is_root {
            let status = self
                .hooks
                .run("set-change-id", &[""])
                .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
            if !status.success() {
                return Err(SyncError::walk(
                    revision,
                    phase,
                    format!("set-change-id failed at {revision}; system may be dirty, rollback succeeded"),
                ));
            }
            return Ok(());
        }

        // Checking out HEAD^'s failure is treated as step completion rather
        // than as an error: the revision is consumed and the next iteration
        // observes whatever HEAD now is. This reproduces the documented
        // edge case rather than fixing it (spec.md §9).
        let advanced = self
            .vcs
            .checkout("HEAD^")
            .map_err(|e| SyncError::walk(revision, phase, format!("checkout of HEAD^ failed: {e}")))?;
        if !advanced {
            return Ok(());
        }

        let new_head = self
            .vcs
            .head_revision()
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
        let status = self
            .hooks
            .run("set-change-id", &[&new_head])
            .map_err(|e| SyncError::walk(revision, phase, e.to_string()))?;
        if !status.success() {
            return Err(SyncError::walk(
                revision,
                phase,
                format!("set-change-id failed at {revision}"),
            ));
        }

        Ok(())
    }
}
