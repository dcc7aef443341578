//! VCS adapter (spec.md §4.1).
//!
//! The version-control system is an opaque external service; this module
//! defines the small interface the rest of the engine calls through
//! ([`Vcs`]) and the sole production implementation, [`GitCli`], which
//! shells out to the `git` binary one command at a time — the same
//! one-process-per-call shape as the teacher's `Repository::run_command`
//! (`examples/shaneholloman-worktrunk/src/git/repository/mod.rs`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

/// A revision id is an opaque string (spec.md §3). The empty string is the
/// pre-tracking sentinel; `"HEAD"` is reserved and never produced by `Vcs`.
pub type RevisionId = String;

#[derive(Debug)]
pub enum VcsError {
    CommandFailed { command: String, stderr: String },
    Io(std::io::Error),
}

impl fmt::Display for VcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsError::CommandFailed { command, stderr } => {
                write!(f, "`{command}` failed: {}", stderr.trim())
            }
            VcsError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for VcsError {}

impl From<std::io::Error> for VcsError {
    fn from(e: std::io::Error) -> Self {
        VcsError::Io(e)
    }
}

/// The operations the sync engine needs from the version-control tool
/// (spec.md §4.1). Kept small and VCS-agnostic so the planner and walker
/// can be exercised against an in-memory fake (spec.md §9's "Ambient VCS
/// coupling" note).
pub trait Vcs {
    fn root_dir(&self) -> Result<PathBuf, VcsError>;
    fn metadata_dir(&self) -> Result<PathBuf, VcsError>;
    fn resolve(&self, reference: &str) -> Result<Option<RevisionId>, VcsError>;
    fn head_revision(&self) -> Result<RevisionId, VcsError>;
    fn symbolic_head(&self) -> Result<String, VcsError>;
    /// Non-zero exit is reported to the caller, which decides whether to
    /// abort the walk — this returns `Ok(false)` rather than an error on a
    /// failed checkout, matching spec.md §4.1.
    fn checkout(&self, reference: &str) -> Result<bool, VcsError>;
    fn is_clean(&self) -> Result<bool, VcsError>;
    fn is_root_commit(&self) -> Result<bool, VcsError>;
    fn ancestors_excluding(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<RevisionId>, VcsError>;
    fn ancestors_excluding_reverse(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<RevisionId>, VcsError>;
    fn full_history_oldest_first(&self) -> Result<Vec<RevisionId>, VcsError>;
}

/// Production [`Vcs`] implementation backed by the `git` binary.
pub struct GitCli {
    discovery_path: PathBuf,
}

impl GitCli {
    pub fn at(discovery_path: impl Into<PathBuf>) -> Self {
        Self {
            discovery_path: discovery_path.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, VcsError> {
        let cmd_str = format!("git {}", args.join(" "));
        log::debug!("$ {cmd_str}");
        let t0 = Instant::now();

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.discovery_path)
            .output()?;

        log::debug!(
            "[git-sync-world-trace] cmd=\"{cmd_str}\" dur={:.1}ms ok={}",
            t0.elapsed().as_secs_f64() * 1000.0,
            output.status.success()
        );

        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command: cmd_str,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_check(&self, args: &[&str]) -> Result<bool, VcsError> {
        let cmd_str = format!("git {}", args.join(" "));
        log::debug!("$ {cmd_str}");
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.discovery_path)
            .status()?;
        Ok(status.success())
    }

    /// True iff `reference` names a local branch rather than a raw revision
    /// id — distinguishes the two `checkout` behaviors spec.md §4.1 calls
    /// for: a plain branch checkout restores `HEAD`'s symbolic form, while
    /// everything else (a commit hash, `HEAD^`, the pre-tracking sentinel)
    /// gets a detached checkout.
    fn is_branch(&self, reference: &str) -> bool {
        let ref_name = format!("refs/heads/{reference}");
        self.run_check(&["show-ref", "--verify", "--quiet", &ref_name])
            .unwrap_or(false)
    }
}

impl Vcs for GitCli {
    fn root_dir(&self) -> Result<PathBuf, VcsError> {
        let out = self.run(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(out.trim()))
    }

    fn metadata_dir(&self) -> Result<PathBuf, VcsError> {
        let out = self.run(&["rev-parse", "--git-common-dir"])?;
        let path = PathBuf::from(out.trim());
        if path.is_relative() {
            Ok(self.discovery_path.join(path))
        } else {
            Ok(path)
        }
    }

    fn resolve(&self, reference: &str) -> Result<Option<RevisionId>, VcsError> {
        if reference.is_empty() {
            return Ok(Some(String::new()));
        }
        match self.run(&["rev-parse", "--verify", "--quiet", reference]) {
            Ok(out) => Ok(Some(out.trim().to_string())),
            Err(VcsError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn head_revision(&self) -> Result<RevisionId, VcsError> {
        Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    fn symbolic_head(&self) -> Result<String, VcsError> {
        match self.run(&["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            Ok(branch) if !branch.trim().is_empty() => Ok(branch.trim().to_string()),
            _ => self.head_revision(),
        }
    }

    fn checkout(&self, reference: &str) -> Result<bool, VcsError> {
        if self.is_branch(reference) {
            self.run_check(&["checkout", "--quiet", reference])
        } else {
            self.run_check(&["checkout", "--detach", "--quiet", reference])
        }
    }

    fn is_clean(&self) -> Result<bool, VcsError> {
        let out = self.run(&["status", "--porcelain"])?;
        Ok(out.trim().is_empty())
    }

    fn is_root_commit(&self) -> Result<bool, VcsError> {
        Ok(!self.run_check(&["rev-parse", "--verify", "--quiet", "HEAD^"]))
    }

    fn ancestors_excluding(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<RevisionId>, VcsError> {
        let range = format!("{to}..{from}");
        let out = self.run(&["rev-list", &range])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    fn ancestors_excluding_reverse(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<RevisionId>, VcsError> {
        let range = format!("{to}..{from}");
        let out = self.run(&["rev-list", "--reverse", &range])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    fn full_history_oldest_first(&self) -> Result<Vec<RevisionId>, VcsError> {
        let out = self.run(&["rev-list", "--reverse", "HEAD"])?;
        Ok(out.lines().map(str::to_string).collect())
    }
}
