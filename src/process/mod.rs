pub mod controller;
pub mod locate;
pub mod matcher;
pub mod table;

pub use controller::{Controller, Options, Outcome};
pub use locate::{ProgramReference, resolve};
pub use matcher::{MatchMode, MatchResult, Matcher, SelfIdentity};
pub use table::{ProcessTable, SystemTable};

use nix::errno::Errno;
use std::{io, path::PathBuf};
use thiserror::Error;

/// One line of the OS process table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessTableEntry {
    pub pid: i32,
    pub command_line: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot resolve path '{path}': {reason}")]
    PathResolution { path: String, reason: String },

    #[error("program not found: {}", .0.display())]
    ProgramNotFound(PathBuf),

    #[error("failed to query process table: {0}")]
    ProcessQuery(String),

    #[error("failed to start {}: {source}", .path.display())]
    Spawn { path: PathBuf, source: io::Error },

    #[error("failed to signal pid {pid}: {source}")]
    Signal { pid: i32, source: Errno },
}
