//! Domain error types.
//!
//! Mirrors the teacher's `git::GitError`: a flat enum of named failure
//! variants with a hand-written `Display`, rather than a derive-macro error
//! type. Each variant maps to one of the three error kinds in spec.md §7.

use std::fmt;

/// Which phase of the revision walk a [`SyncError::Walk`] occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Rollback,
    Commit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Rollback => write!(f, "rollback"),
            Phase::Commit => write!(f, "commit"),
        }
    }
}

/// Top-level error for this crate. Every variant carries exactly the
/// context spec.md §7 says operators need to act on it.
#[derive(Debug)]
pub enum SyncError {
    /// Configuration-class error (spec.md §7.1): dirty tree, missing hook
    /// directory, bad `get-change-id`, unreachable VCS. No state mutation.
    Config(String),

    /// Walk-class error (spec.md §7.2): a hook failed, `set-change-id`
    /// failed, or checkout failed mid-walk. The revision has already been
    /// pushed back to the front of its queue by the caller.
    Walk {
        revision: String,
        phase: Phase,
        message: String,
        /// Set when a commit-phase `verify-commit` failure was able to
        /// recover the world's actual change id (spec.md §4.5 step 4c).
        world_id_hint: Option<String>,
    },

    /// Usage-class error (spec.md §7.3): conflicting flags, or a
    /// mid-session command issued with no session (or vice versa).
    Usage(String),
}

impl SyncError {
    pub fn config(msg: impl Into<String>) -> Self {
        SyncError::Config(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        SyncError::Usage(msg.into())
    }

    pub fn walk(revision: impl Into<String>, phase: Phase, message: impl Into<String>) -> Self {
        SyncError::Walk {
            revision: revision.into(),
            phase,
            message: message.into(),
            world_id_hint: None,
        }
    }

    pub fn walk_with_world_hint(
        revision: impl Into<String>,
        phase: Phase,
        message: impl Into<String>,
        world_id_hint: Option<String>,
    ) -> Self {
        SyncError::Walk {
            revision: revision.into(),
            phase,
            message: message.into(),
            world_id_hint,
        }
    }

    /// Process exit code per spec.md §7: usage errors parsed by the flag
    /// layer exit 2; everything else the tool itself detects exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Config(_) | SyncError::Walk { .. } => 1,
            SyncError::Usage(_) => 1,
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Config(msg) => write!(f, "{msg}"),
            SyncError::Usage(msg) => write!(f, "{msg}"),
            SyncError::Walk {
                revision,
                phase,
                message,
                world_id_hint,
            } => {
                write!(f, "{message} at {revision} ({phase} phase); system may be dirty")?;
                if let Some(world_id) = world_id_hint {
                    write!(f, "; world reports change id {world_id}, not {revision}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SyncError {}
