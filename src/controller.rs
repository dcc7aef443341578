//! Session controller (spec.md §4.6).
//!
//! Top-level dispatch for the five commands, mirroring the teacher's
//! `main.rs`/`commands/mod.rs` shape: resolve configuration, hand off to a
//! handler, print through a shared output helper.

use crate::config::Config;
use crate::error::{Phase, SyncError};
use crate::hooks::HookRunner;
use crate::output;
use crate::planner;
use crate::session::{QueueKind, SessionStore};
use crate::vcs::Vcs;
use crate::walker::{StepOutcome, Walker};

pub struct SessionController<'a> {
    vcs: &'a dyn Vcs,
    hooks: HookRunner,
    store: SessionStore,
    config: Config,
}

impl<'a> SessionController<'a> {
    pub fn new(vcs: &'a dyn Vcs, config: Config) -> Self {
        let hooks = HookRunner::new(&config.user_hooks_dir, &config.root_dir);
        let store = SessionStore::new(&config.session_dir);
        Self {
            vcs,
            hooks,
            store,
            config,
        }
    }

    pub fn status(&self) -> Result<(), SyncError> {
        output::announce(&format!("World ID: {}", output::display_id(&self.config.world_id)));
        output::announce(&format!("Git ID: {}", self.config.local_id));

        if self.store.session_exists() {
            output::announce("a sync session is in progress");
            output::announce("resume with --continue, skip the current step with --skip, or give up with --abort");
        } else if self.config.world_id == self.config.local_id {
            output::announce("already synced");
        } else {
            output::announce("a sync is pending; run git-sync-world to start it");
        }
        Ok(())
    }

    pub fn sync(&self) -> Result<(), SyncError> {
        if self.store.session_exists() {
            return Err(SyncError::usage(
                "a sync session is already in progress; use --continue, --skip, or --abort",
            ));
        }

        if self.config.world_id == self.config.local_id {
            output::announce("already synced");
            return Ok(());
        }

        let plan = planner::plan(&self.config.world_id, &self.config.local_id, self.vcs)
            .map_err(|e| SyncError::config(e.to_string()))?;

        let symbolic = self.vcs.symbolic_head().map_err(io_err)?;

        self.store.begin().map_err(io_err)?;
        self.store.save_original_head(&symbolic).map_err(io_err)?;
        self.store
            .write_queue(QueueKind::Rollback, &plan.rollback)
            .map_err(io_err)?;
        self.store
            .write_queue(QueueKind::Commit, &plan.commit)
            .map_err(io_err)?;

        self.drain()
    }

    pub fn continue_session(&self) -> Result<(), SyncError> {
        self.require_session()?;
        self.drain()
    }

    pub fn skip(&self) -> Result<(), SyncError> {
        self.require_session()?;

        let popped = self.store.pop_front(QueueKind::Rollback).map_err(io_err)?;
        if popped.is_none() {
            self.store.pop_front(QueueKind::Commit).map_err(io_err)?;
        }

        let rollback_empty = self.store.is_empty(QueueKind::Rollback).map_err(io_err)?;
        let commit_empty = self.store.is_empty(QueueKind::Commit).map_err(io_err)?;
        if rollback_empty && commit_empty {
            return self.finish();
        }

        self.drain()
    }

    pub fn abort(&self) -> Result<(), SyncError> {
        self.require_session()?;
        self.finish()
    }

    fn require_session(&self) -> Result<(), SyncError> {
        if !self.store.session_exists() {
            return Err(SyncError::usage("no sync session is in progress"));
        }
        Ok(())
    }

    /// Drains `rollback` then `commit`, one revision per iteration. A
    /// failure leaves the failing revision back at the front of its queue
    /// and is propagated without finishing the session.
    fn drain(&self) -> Result<(), SyncError> {
        let walker = Walker::new(self.vcs, &self.hooks);

        loop {
            if let Some(revision) = self.store.pop_front(QueueKind::Rollback).map_err(io_err)? {
                match walker.step(&revision, Phase::Rollback) {
                    Ok(StepOutcome::Applied) => output::announce(&format!("Applied rollback at {revision}")),
                    Ok(StepOutcome::Noop) => output::announce(&format!("nothing to do at {revision}")),
                    Err(e) => {
                        self.store.push_front(QueueKind::Rollback, &revision).map_err(io_err)?;
                        return Err(e);
                    }
                }
                continue;
            }

            if let Some(revision) = self.store.pop_front(QueueKind::Commit).map_err(io_err)? {
                match walker.step(&revision, Phase::Commit) {
                    Ok(StepOutcome::Applied) => output::announce(&format!("Applied commit at {revision}")),
                    Ok(StepOutcome::Noop) => output::announce(&format!("nothing to do at {revision}")),
                    Err(e) => {
                        self.store.push_front(QueueKind::Commit, &revision).map_err(io_err)?;
                        return Err(e);
                    }
                }
                continue;
            }

            break;
        }

        self.finish()
    }

    /// Restores the original symbolic head and tears down the session
    /// directory. On checkout failure, the session directory is left
    /// intact so the operator can retry.
    fn finish(&self) -> Result<(), SyncError> {
        let orig_head = self.store.load_original_head().map_err(io_err)?;
        let restored = self.vcs.checkout(&orig_head).map_err(io_err)?;
        if !restored {
            return Err(SyncError::config(format!(
                "failed to restore original head {orig_head}; session left in place"
            )));
        }
        self.store.destroy().map_err(io_err)?;
        output::announce("Done.");
        Ok(())
    }
}

fn io_err(e: impl std::fmt::Display) -> SyncError {
    SyncError::config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::fake::FakeVcs;
    use std::fs;
    use std::os::unix::fs::OpenOptionsExt;
    use std::path::Path;

    fn write_hook(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        let mut opts = fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true).mode(0o755);
        use std::io::Write;
        opts.open(&path).unwrap().write_all(body.as_bytes()).unwrap();
    }

    fn full_quintet(dir: &Path) {
        for name in ["commit", "rollback", "verify-commit", "verify-rollback", "set-change-id"] {
            write_hook(dir, name, "#!/bin/sh\nexit 0\n");
        }
    }

    fn make_config(root: &Path, session_dir: std::path::PathBuf, world_id: &str, local_id: &str) -> Config {
        Config {
            root_dir: root.to_path_buf(),
            session_dir,
            user_hooks_dir: root.to_path_buf(),
            world_id: world_id.to_string(),
            local_id: local_id.to_string(),
        }
    }

    #[test]
    fn sync_refuses_when_session_already_exists() {
        let root = tempfile::tempdir().unwrap();
        full_quintet(root.path());
        let session_dir = root.path().join("session");
        let vcs = FakeVcs::new(vec!["a", "b"], vec![("b", "a")], "b");
        let config = make_config(root.path(), session_dir.clone(), "a", "b");
        let controller = SessionController::new(&vcs, config);

        controller.store.begin().unwrap();
        controller.store.save_original_head("main").unwrap();

        let err = controller.sync().unwrap_err();
        assert!(matches!(err, SyncError::Usage(_)));
    }

    #[test]
    fn sync_already_synced_is_noop() {
        let root = tempfile::tempdir().unwrap();
        full_quintet(root.path());
        let session_dir = root.path().join("session");
        let vcs = FakeVcs::new(vec!["a"], vec![], "a");
        let config = make_config(root.path(), session_dir, "a", "a");
        let controller = SessionController::new(&vcs, config);

        controller.sync().unwrap();
        assert!(!controller.store.session_exists());
    }

    #[test]
    fn full_sync_drains_and_finishes() {
        let root = tempfile::tempdir().unwrap();
        full_quintet(root.path());
        let session_dir = root.path().join("session");
        let vcs = FakeVcs::new(vec!["a", "b", "c"], vec![("c", "b"), ("b", "a")], "c");
        let config = make_config(root.path(), session_dir, "a", "c");
        let controller = SessionController::new(&vcs, config);

        controller.sync().unwrap();
        assert!(!controller.store.session_exists());
    }

    #[test]
    fn skip_during_rollback_drops_only_rollback_front() {
        let root = tempfile::tempdir().unwrap();
        full_quintet(root.path());
        write_hook(root.path(), "rollback", "#!/bin/sh\nexit 1\n");
        let session_dir = root.path().join("session");
        let vcs = FakeVcs::new(vec!["a", "b", "c"], vec![("c", "b"), ("b", "a")], "c");
        let config = make_config(root.path(), session_dir, "c", "a");
        let controller = SessionController::new(&vcs, config);

        let err = controller.sync().unwrap_err();
        assert!(matches!(err, SyncError::Walk { .. }));
        assert!(controller.store.session_exists());

        // "c" sits at the rollback queue's front after the failed attempt;
        // --skip should discard just that one id.
        controller.skip().unwrap_err(); // rollback hook still fails for "b"
        let remaining = controller
            .store
            .pop_front(QueueKind::Rollback)
            .unwrap()
            .unwrap();
        assert_eq!(remaining, "b");
    }

    #[test]
    fn abort_restores_original_head_without_running_hooks() {
        let root = tempfile::tempdir().unwrap();
        write_hook(root.path(), "commit", "#!/bin/sh\ntouch ran\nexit 1\n");
        full_quintet(root.path());
        write_hook(root.path(), "commit", "#!/bin/sh\ntouch ran\nexit 1\n");
        let session_dir = root.path().join("session");
        let vcs = FakeVcs::new(vec!["a", "b"], vec![("b", "a")], "a");
        let config = make_config(root.path(), session_dir, "a", "b");
        let controller = SessionController::new(&vcs, config);

        controller.store.begin().unwrap();
        controller.store.save_original_head("main").unwrap();
        controller
            .store
            .write_queue(QueueKind::Commit, &["b".to_string()])
            .unwrap();

        controller.abort().unwrap();
        assert!(!controller.store.session_exists());
        assert!(!root.path().join("ran").exists());
    }
}
