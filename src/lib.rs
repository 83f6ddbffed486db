pub mod config;
pub mod file;
pub mod helpers;
pub mod log;
pub mod process;

pub use process::{Controller, Error, Options, Outcome, ProcessTable, SystemTable};
