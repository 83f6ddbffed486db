use super::{Error, ProcessTableEntry};

use nix::{
    errno::Errno,
    sys::signal::{Signal, kill},
    unistd::Pid,
};

use std::process::{Command, Stdio};

/// Access to the live OS process table.
pub trait ProcessTable {
    /// Every entry whose command line contains `needle`, read fresh.
    fn find(&self, needle: &str) -> Result<Vec<ProcessTableEntry>, Error>;

    /// Deliver `signal` to `pid`. Returns `false` when the process was already gone.
    fn signal(&self, pid: i32, signal: Signal) -> Result<bool, Error>;
}

/// Process table backed by POSIX `ps` and `kill(2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTable;

const PS_ARGS: [&str; 6] = ["-A", "-ww", "-o", "pid=", "-o", "args="];

impl ProcessTable for SystemTable {
    fn find(&self, needle: &str) -> Result<Vec<ProcessTableEntry>, Error> {
        let child = Command::new("ps")
            .args(PS_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::ProcessQuery(format!("failed to run ps: {err}")))?;

        let ps_pid = child.id() as i32;
        let output = child
            .wait_with_output()
            .map_err(|err| Error::ProcessQuery(format!("failed to read ps output: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ProcessQuery(format!("ps exited with {}: {}", output.status, stderr.trim())));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let entries: Vec<ProcessTableEntry> = parse_listing(&listing)
            .into_iter()
            .filter(|entry| entry.pid != ps_pid && entry.command_line.contains(needle))
            .collect();

        log::debug!("ps found {} candidate(s) for {needle}", entries.len());
        Ok(entries)
    }

    fn signal(&self, pid: i32, signal: Signal) -> Result<bool, Error> {
        match kill(Pid::from_raw(pid), signal) {
            Ok(_) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(source) => Err(Error::Signal { pid, source }),
        }
    }
}

/// Parse `pid args` lines as printed by `ps -o pid= -o args=`.
pub fn parse_listing(listing: &str) -> Vec<ProcessTableEntry> {
    listing
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (pid, command) = line.split_once(char::is_whitespace)?;
            let pid = pid.parse::<i32>().ok()?;
            let command_line = command.trim();

            match command_line.is_empty() {
                true => None,
                false => Some(ProcessTableEntry {
                    pid,
                    command_line: command_line.to_string(),
                }),
            }
        })
        .collect()
}
