//! Synchronizes an external world with the git revision checked out in a
//! repository, via a per-revision hook quintet and a resumable,
//! rebase-like walk.
//!
//! The library API is not stable; `git-sync-world` the binary is the
//! supported surface.

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod hooks;
pub mod output;
pub mod planner;
pub mod session;
pub mod vcs;
pub mod walker;
