//! Hook runner (spec.md §4.2).
//!
//! Locates, validates, and invokes the hook quintet plus `get-change-id`.
//! Adapted from the teacher's `HookPipeline`
//! (`examples/shaneholloman-worktrunk/src/commands/hooks.rs`): prepare, log a
//! label line, run, propagate exit status. Unlike the teacher, our hooks are
//! standalone executables at a fixed path (spec.md §6), not shell strings —
//! so we invoke them directly with `Command::new(path)` rather than through
//! a `ShellConfig`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Instant;

pub const HOOK_NAMES: [&str; 6] = [
    "commit",
    "rollback",
    "verify-commit",
    "verify-rollback",
    "set-change-id",
    "get-change-id",
];

/// The four change-specific hooks whose presence triggers the
/// completeness rule (spec.md §3).
pub const CHANGE_HOOK_NAMES: [&str; 4] = ["commit", "rollback", "verify-commit", "verify-rollback"];

#[derive(Debug)]
pub enum HookError {
    Missing(String),
    NotExecutable(String),
    Io { hook: String, source: std::io::Error },
}

impl std::fmt::Display for HookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookError::Missing(name) => write!(f, "hook '{name}' is missing"),
            HookError::NotExecutable(name) => write!(f, "hook '{name}' is not executable"),
            HookError::Io { hook, source } => write!(f, "failed to run hook '{hook}': {source}"),
        }
    }
}

impl std::error::Error for HookError {}

/// Owns the "exists and is executable" precheck and invocation of the
/// user-supplied hook scripts under `<root>/git-sync-world/`.
pub struct HookRunner {
    hooks_dir: PathBuf,
    repo_root: PathBuf,
}

impl HookRunner {
    pub fn new(hooks_dir: impl Into<PathBuf>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            hooks_dir: hooks_dir.into(),
            repo_root: repo_root.into(),
        }
    }

    pub fn hooks_dir(&self) -> &Path {
        &self.hooks_dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.hooks_dir.join(name)
    }

    /// True iff `name` exists under the hooks directory at all (used for the
    /// spec.md §3/§4.5 no-op-revision check, which only cares about
    /// presence, not executability).
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Checks existence and the executable bit. Returns `Ok(())` when the
    /// hook can be invoked.
    pub fn validate(&self, name: &str) -> Result<(), HookError> {
        let path = self.path_for(name);
        let metadata = fs::metadata(&path).map_err(|_| HookError::Missing(name.to_string()))?;
        if !metadata.is_file() {
            return Err(HookError::Missing(name.to_string()));
        }
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(HookError::NotExecutable(name.to_string()));
        }
        Ok(())
    }

    /// Validates every hook in `names`, short-circuiting on the first
    /// problem. Used to enforce the five-hook completeness rule.
    pub fn validate_all(&self, names: &[&str]) -> Result<(), HookError> {
        for name in names {
            self.validate(name)?;
        }
        Ok(())
    }

    fn command(&self, name: &str) -> Command {
        let mut cmd = Command::new(self.path_for(name));
        cmd.current_dir(&self.repo_root);
        cmd
    }

    /// Run a hook with standard out/err inherited (all hooks except
    /// `get-change-id`, per spec.md §4.2).
    pub fn run(&self, name: &str, args: &[&str]) -> Result<ExitStatus, HookError> {
        self.validate(name)?;
        let mut cmd = self.command(name);
        cmd.args(args);

        log::debug!("$ git-sync-world/{name} {}", args.join(" "));
        let t0 = Instant::now();
        let status = cmd
            .status()
            .map_err(|e| HookError::Io { hook: name.to_string(), source: e })?;
        log::debug!(
            "[git-sync-world-trace] hook={name} dur={:.1}ms ok={}",
            t0.elapsed().as_secs_f64() * 1000.0,
            status.success()
        );
        Ok(status)
    }

    /// Run `get-change-id`, capturing and trimming stdout (spec.md §4.2).
    pub fn capture(&self, name: &str) -> Result<(String, ExitStatus), HookError> {
        self.validate(name)?;
        let mut cmd = self.command(name);

        log::debug!("$ git-sync-world/{name}");
        let output = cmd
            .output()
            .map_err(|e| HookError::Io { hook: name.to_string(), source: e })?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        Ok((stdout, output.status))
    }
}
