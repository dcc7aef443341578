//! Configuration (spec.md §3).
//!
//! Derived fresh at every invocation, never persisted — the teacher's
//! `config.rs` gates everything downstream through one struct; this keeps
//! that shape but drops the TOML read/write layer entirely, since nothing
//! here is meant to survive between runs.

use std::path::PathBuf;

use crate::error::SyncError;
use crate::hooks::HookRunner;
use crate::vcs::Vcs;

pub struct Config {
    pub root_dir: PathBuf,
    pub session_dir: PathBuf,
    pub user_hooks_dir: PathBuf,
    pub world_id: String,
    pub local_id: String,
}

impl Config {
    /// Builds configuration against `vcs`, enforcing every invariant in
    /// spec.md §3: clean tree, present hooks directory, and a well-behaved
    /// `get-change-id`.
    pub fn derive(vcs: &dyn Vcs) -> Result<Self, SyncError> {
        let clean = vcs.is_clean().map_err(|e| SyncError::config(e.to_string()))?;
        if !clean {
            return Err(SyncError::config("the working tree has uncommitted changes"));
        }

        let root_dir = vcs.root_dir().map_err(|e| SyncError::config(e.to_string()))?;
        let metadata_dir = vcs.metadata_dir().map_err(|e| SyncError::config(e.to_string()))?;
        let user_hooks_dir = root_dir.join("git-sync-world");
        let session_dir = metadata_dir.join("git-sync-world");

        if !user_hooks_dir.is_dir() {
            return Err(SyncError::config(format!(
                "hooks directory {} does not exist",
                user_hooks_dir.display()
            )));
        }

        let hooks = HookRunner::new(&user_hooks_dir, &root_dir);
        hooks
            .validate("get-change-id")
            .map_err(|e| SyncError::config(e.to_string()))?;
        let (stdout, status) = hooks
            .capture("get-change-id")
            .map_err(|e| SyncError::config(e.to_string()))?;
        if !status.success() {
            return Err(SyncError::config("get-change-id exited non-zero"));
        }
        if stdout == "HEAD" {
            return Err(SyncError::config("get-change-id must not return the literal string HEAD"));
        }

        let world_id = if stdout.is_empty() {
            String::new()
        } else {
            match vcs.resolve(&stdout).map_err(|e| SyncError::config(e.to_string()))? {
                Some(id) => id,
                None => {
                    return Err(SyncError::config(format!(
                        "get-change-id returned '{stdout}', which does not resolve to a known revision"
                    )));
                }
            }
        };

        let local_id = vcs.head_revision().map_err(|e| SyncError::config(e.to_string()))?;

        Ok(Config {
            root_dir,
            session_dir,
            user_hooks_dir,
            world_id,
            local_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::fake::FakeVcs;

    // Config::derive shells out through HookRunner to a real `get-change-id`
    // executable, so its happy path is covered by the integration tests
    // under tests/ rather than here. This unit test locks in the dirty-tree
    // short-circuit, which needs no hooks directory at all.
    #[test]
    fn dirty_tree_is_rejected_before_touching_hooks() {
        let vcs = FakeVcs::new(vec!["a"], vec![], "a");
        vcs.set_dirty();
        let err = Config::derive(&vcs).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }
}
