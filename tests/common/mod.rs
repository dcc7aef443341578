//! Shared fixture for the integration tests: a throwaway git repository
//! plus a side "world" directory that the hook quintet mutates. Scaled
//! down from the teacher's `tests/common/mod.rs::TestRepo` (which builds
//! worktrees from template fixtures) to the much smaller surface this
//! tool needs: a linear or branching commit history, each commit
//! carrying its own `git-sync-world/` hook scripts.

use std::fs;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct TestRepo {
    repo_dir: tempfile::TempDir,
    world_dir: tempfile::TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let repo_dir = tempfile::tempdir().unwrap();
        let world_dir = tempfile::tempdir().unwrap();
        run_git(repo_dir.path(), &["init", "--quiet", "-b", "main"]);
        run_git(repo_dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(repo_dir.path(), &["config", "user.name", "Test"]);
        Self { repo_dir, world_dir }
    }

    pub fn path(&self) -> &Path {
        self.repo_dir.path()
    }

    pub fn world_path(&self) -> &Path {
        self.world_dir.path()
    }

    /// Creates a new commit labeled `label` whose `commit` hook touches
    /// `<world>/<label>.txt` and whose `rollback` hook removes it. Every
    /// commit carries the full hook quintet plus `get-change-id`, so any
    /// revision in the resulting history can serve as the new `HEAD`
    /// after a rollback step.
    pub fn commit_revision(&self, label: &str) {
        let hooks_dir = self.path().join("git-sync-world");
        fs::create_dir_all(&hooks_dir).unwrap();
        let world = self.world_path().display();

        write_executable(
            &hooks_dir.join("commit"),
            &format!("#!/bin/sh\ntouch '{world}/{label}.txt'\n"),
        );
        write_executable(
            &hooks_dir.join("rollback"),
            &format!("#!/bin/sh\nrm -f '{world}/{label}.txt'\n"),
        );
        // The `.fail_<label>` marker lets a test inject a transient
        // verify-commit failure at one specific revision without editing
        // any tracked file (which would dirty the working tree and break
        // the next invocation's configuration check).
        write_executable(
            &hooks_dir.join("verify-commit"),
            &format!(
                "#!/bin/sh\ntest -f '{world}/{label}.txt' && test ! -f '{world}/.fail_{label}'\n"
            ),
        );
        write_executable(
            &hooks_dir.join("verify-rollback"),
            &format!("#!/bin/sh\ntest ! -f '{world}/{label}.txt'\n"),
        );
        write_executable(
            &hooks_dir.join("set-change-id"),
            &format!("#!/bin/sh\nprintf '%s' \"$1\" > '{world}/.change_id'\n"),
        );
        write_executable(
            &hooks_dir.join("get-change-id"),
            &format!("#!/bin/sh\ncat '{world}/.change_id' 2>/dev/null || true\n"),
        );

        run_git(self.path(), &["add", "-A"]);
        run_git(self.path(), &["commit", "--quiet", "-m", label]);
    }

    pub fn rev_parse(&self, reference: &str) -> String {
        String::from_utf8(
            Command::new("git")
                .args(["rev-parse", reference])
                .current_dir(self.path())
                .output()
                .unwrap()
                .stdout,
        )
        .unwrap()
        .trim()
        .to_string()
    }

    pub fn checkout(&self, reference: &str) {
        run_git(self.path(), &["checkout", "--quiet", "--detach", reference]);
    }

    /// The branch `HEAD` currently points to, or `None` if detached.
    pub fn current_branch(&self) -> Option<String> {
        let output = Command::new("git")
            .args(["symbolic-ref", "--quiet", "--short", "HEAD"])
            .current_dir(self.path())
            .output()
            .unwrap();
        if !output.status.success() {
            return None;
        }
        let name = String::from_utf8(output.stdout).unwrap().trim().to_string();
        if name.is_empty() { None } else { Some(name) }
    }

    /// Seeds the world's recorded change id directly (bypassing
    /// `set-change-id`) — used to establish the "world already synced to
    /// some prior revision" precondition a scenario starts from.
    pub fn seed_world_change_id(&self, revision: &str) {
        fs::write(self.world_path().join(".change_id"), revision).unwrap();
    }

    /// Makes `label`'s `verify-commit` fail until [`clear_commit_failure`]
    /// is called, without touching any tracked file.
    ///
    /// [`clear_commit_failure`]: TestRepo::clear_commit_failure
    pub fn inject_commit_failure(&self, label: &str) {
        fs::write(self.world_path().join(format!(".fail_{label}")), "").unwrap();
    }

    pub fn clear_commit_failure(&self, label: &str) {
        let _ = fs::remove_file(self.world_path().join(format!(".fail_{label}")));
    }

    pub fn world_file_exists(&self, label: &str) -> bool {
        self.world_path().join(format!("{label}.txt")).exists()
    }

    pub fn world_change_id(&self) -> String {
        fs::read_to_string(self.world_path().join(".change_id")).unwrap_or_default()
    }

    /// Overwrites and commits `get-change-id` with `body` — used to drive
    /// the configuration-error paths in `Config::derive` (spec.md §3),
    /// which all run before any checkout, so the replacement takes effect
    /// at the currently checked-out revision without needing a rollback.
    pub fn set_get_change_id_hook(&self, body: &str) {
        let hooks_dir = self.path().join("git-sync-world");
        write_executable(&hooks_dir.join("get-change-id"), body);
        run_git(self.path(), &["add", "-A"]);
        run_git(self.path(), &["commit", "--quiet", "-m", "rewrite get-change-id"]);
    }

    pub fn session_dir(&self) -> PathBuf {
        self.path().join(".git").join("git-sync-world")
    }

    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("git-sync-world").unwrap();
        cmd.arg("-C").arg(self.path());
        cmd
    }
}

/// `rstest` fixture handing each test a fresh throwaway repository, mirroring
/// the teacher's `fn repo() -> TestRepo` fixture in `tests/common/mod.rs`.
#[rstest::fixture]
pub fn repo() -> TestRepo {
    TestRepo::new()
}

fn write_executable(path: &Path, body: &str) {
    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true).mode(0o755);
    use std::io::Write;
    opts.open(path).unwrap().write_all(body.as_bytes()).unwrap();
}

fn run_git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed in {dir:?}");
}
