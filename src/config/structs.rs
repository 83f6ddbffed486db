use crate::process::MatchMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod prelude {
    pub use super::{Config, Log, Matcher, Stop};
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub matcher: Matcher,
    #[serde(default)]
    pub stop: Stop,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Log {
    /// Append-only log file. Unset means `ecctl.log` in the base directory,
    /// empty disables the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Echo log lines to stderr.
    #[serde(default)]
    pub console: bool,
}

impl Log {
    pub const FILE_NAME: &'static str = "ecctl.log";

    pub fn under(base: &Path) -> Self {
        Self {
            path: Some(base.join(Self::FILE_NAME).display().to_string()),
            console: false,
        }
    }

    /// Log file to open, `None` when disabled.
    pub fn file(&self) -> Option<&str> { self.path.as_deref().filter(|path| !path.is_empty()) }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Matcher {
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default = "default_identifier")]
    pub identifier: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Stop {
    #[serde(default = "default_signal")]
    pub signal: String,
}

fn default_identifier() -> String { env!("CARGO_PKG_NAME").to_string() }
fn default_signal() -> String { "SIGTERM".to_string() }

impl Default for Matcher {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            identifier: default_identifier(),
        }
    }
}

impl Default for Stop {
    fn default() -> Self { Self { signal: default_signal() } }
}
