//! CLI shell (spec.md §6).
//!
//! Subcommand-free: behavior is selected by at most one flag. Grounded in
//! the teacher's derive-based `Cli` struct shape
//! (`examples/shaneholloman-worktrunk/src/cli.rs`), stripped down to the
//! handful of flags this tool actually has — no shell completion, no help
//! pager, no rich terminal help template.

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "git-sync-world",
    version,
    about = "Synchronize an external world with the revision checked out here",
    disable_help_flag = true,
    group(ArgGroup::new("mode").args(["status", "continue_flag", "skip", "abort"]).multiple(false)),
)]
pub struct Cli {
    /// Print help (spec.md §6 also reserves `-?` for this).
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
    help: Option<bool>,

    /// Run as if started in PATH rather than the current directory.
    #[arg(short = 'C', value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Raise log verbosity to info (debug tracing is always available via RUST_LOG).
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print status and exit; never mutates state.
    #[arg(long)]
    pub status: bool,

    /// Resume a mid-session sync.
    #[arg(long = "continue")]
    pub continue_flag: bool,

    /// Drop the current front revision and resume.
    #[arg(long)]
    pub skip: bool,

    /// End the session without further hook execution.
    #[arg(long)]
    pub abort: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Sync,
    Status,
    Continue,
    Skip,
    Abort,
}

impl Cli {
    pub fn command(&self) -> Command {
        if self.status {
            Command::Status
        } else if self.continue_flag {
            Command::Continue
        } else if self.skip {
            Command::Skip
        } else if self.abort {
            Command::Abort
        } else {
            Command::Sync
        }
    }
}
