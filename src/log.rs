//! Logging sinks handed to the controller.
//!
//! A sink receives the controller's informational and error lines and
//! decides where the output of started programs goes. The CLI builds a
//! [`FileSink`]; tests use [`MemorySink`] to inspect what was reported.

use chrono::Local;
use log::Level;

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    process::Stdio,
    sync::Mutex,
};

pub trait Sink: Send + Sync {
    fn write(&self, level: Level, message: &str);

    /// Handles for a started program's stdout and stderr.
    fn child_output(&self) -> io::Result<(Stdio, Stdio)>;

    fn info(&self, message: &str) { self.write(Level::Info, message) }
    fn warn(&self, message: &str) { self.write(Level::Warn, message) }
    fn error(&self, message: &str) { self.write(Level::Error, message) }
    fn debug(&self, message: &str) { self.write(Level::Debug, message) }
}

pub fn format_line(level: Level, message: &str) -> String { format!("{} [{level}] {message}", Local::now().format("%Y-%m-%dT%H:%M:%S%:z")) }

/// Append-only log file, optionally echoed to stderr.
pub struct FileSink {
    file: Option<Mutex<File>>,
    console: bool,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>, console: bool) -> io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Some(Mutex::new(file)),
            console,
        })
    }

    /// Sink without a file. Lines go to stderr; started programs write to `/dev/null`
    /// so they never hold the controller's output open.
    pub fn console_only() -> Self {
        Self {
            file: None,
            console: true,
        }
    }
}

impl Sink for FileSink {
    fn write(&self, level: Level, message: &str) {
        let line = format_line(level, message);

        if let Some(file) = &self.file {
            match file.lock() {
                Ok(mut file) => {
                    if let Err(err) = writeln!(file, "{line}") {
                        log::warn!("failed to write log line: {err}");
                    }
                }
                Err(err) => log::warn!("log file lock poisoned: {err}"),
            }
        }

        if self.console {
            eprintln!("{line}");
        }
    }

    fn child_output(&self) -> io::Result<(Stdio, Stdio)> {
        match &self.file {
            Some(file) => {
                let file = file.lock().map_err(|err| io::Error::other(err.to_string()))?;
                Ok((Stdio::from(file.try_clone()?), Stdio::from(file.try_clone()?)))
            }
            None => Ok((Stdio::null(), Stdio::null())),
        }
    }
}

/// Sink that keeps lines in memory. Started programs write to `/dev/null`.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> Vec<(Level, String)> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool { self.lines().iter().any(|(l, message)| *l == level && message.contains(needle)) }
}

impl Sink for MemorySink {
    fn write(&self, level: Level, message: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push((level, message.to_string())),
            Err(poisoned) => poisoned.into_inner().push((level, message.to_string())),
        }
    }

    fn child_output(&self) -> io::Result<(Stdio, Stdio)> { Ok((Stdio::null(), Stdio::null())) }
}
