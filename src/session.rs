//! Session store (spec.md §4.3).
//!
//! On-disk representation of an in-progress sync: `ORIG_HEAD`, `rollback`,
//! and `commit`, all living under `<vcs-metadata-dir>/git-sync-world/`.
//! Grounded in the teacher's pattern of reading VCS-internal state files
//! directly off disk (`Repository::worktree_state`'s `rebase-merge`/
//! `rebase-apply` probing in
//! `examples/shaneholloman-worktrunk/src/git/repository/mod.rs`), and in
//! `other_examples/22074c1c_...-session_store.rs.rs`'s pop/push-front queue
//! shape. Atomic rewrite uses a temp-file-then-rename, the same crash-safety
//! idiom as the teacher's config-cache writes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Rollback,
    Commit,
}

impl QueueKind {
    fn filename(self) -> &'static str {
        match self {
            QueueKind::Rollback => "rollback",
            QueueKind::Commit => "commit",
        }
    }
}

pub struct SessionStore {
    session_dir: PathBuf,
}

impl SessionStore {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
        }
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Spec.md §4.3: `session_dir` exists iff a session is in progress.
    pub fn session_exists(&self) -> bool {
        self.session_dir.is_dir()
    }

    pub fn begin(&self) -> io::Result<()> {
        fs::create_dir_all(&self.session_dir)
    }

    fn orig_head_path(&self) -> PathBuf {
        self.session_dir.join("ORIG_HEAD")
    }

    fn queue_path(&self, kind: QueueKind) -> PathBuf {
        self.session_dir.join(kind.filename())
    }

    pub fn save_original_head(&self, symbolic: &str) -> io::Result<()> {
        atomic_write(&self.orig_head_path(), &format!("{symbolic}\n"))
    }

    pub fn load_original_head(&self) -> io::Result<String> {
        Ok(fs::read_to_string(self.orig_head_path())?
            .trim_end()
            .to_string())
    }

    /// Overwrites the queue file with `revs`, one per line.
    pub fn write_queue(&self, kind: QueueKind, revs: &[String]) -> io::Result<()> {
        let mut contents = revs.join("\n");
        if !revs.is_empty() {
            contents.push('\n');
        }
        atomic_write(&self.queue_path(kind), &contents)
    }

    /// True iff `kind`'s queue is empty or absent, without mutating it.
    pub fn is_empty(&self, kind: QueueKind) -> io::Result<bool> {
        Ok(self.read_queue(kind)?.is_empty())
    }

    fn read_queue(&self, kind: QueueKind) -> io::Result<Vec<String>> {
        let path = self.queue_path(kind);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Atomically removes and returns the first line of `kind`'s queue.
    /// Returns `None` if the file is empty or absent. A failure before the
    /// rewrite completes leaves the file unchanged (the rewrite goes
    /// through a temp file that is renamed into place only on success).
    pub fn pop_front(&self, kind: QueueKind) -> io::Result<Option<String>> {
        let mut revs = self.read_queue(kind)?;
        if revs.is_empty() {
            return Ok(None);
        }
        let front = revs.remove(0);
        self.write_queue(kind, &revs)?;
        Ok(Some(front))
    }

    /// Re-prepends `rev` to the front of `kind`'s queue — used to restore a
    /// failing revision so a later `--continue` re-processes it.
    pub fn push_front(&self, kind: QueueKind, rev: &str) -> io::Result<()> {
        let mut revs = self.read_queue(kind)?;
        revs.insert(0, rev.to_string());
        self.write_queue(kind, &revs)
    }

    /// Removes `ORIG_HEAD`, `rollback`, `commit`, and then the now-empty
    /// session directory.
    pub fn destroy(&self) -> io::Result<()> {
        for path in [
            self.orig_head_path(),
            self.queue_path(QueueKind::Rollback),
            self.queue_path(QueueKind::Commit),
        ] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        fs::remove_dir(&self.session_dir)
    }
}

fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    use std::io::Write;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
