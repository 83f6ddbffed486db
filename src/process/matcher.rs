use super::{Error, ProcessTableEntry, table::ProcessTable};
use serde::{Deserialize, Serialize};

/// How a candidate's command line must relate to the program name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Any command line containing the name. Also matches superstrings such
    /// as `myapp-test` for `myapp`.
    #[default]
    Substring,
    /// One argument must be the name itself or a path ending in it.
    Argument,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub running: bool,
    pub entries: Vec<ProcessTableEntry>,
}

impl MatchResult {
    pub fn pids(&self) -> Vec<i32> { self.entries.iter().map(|entry| entry.pid).collect() }
}

/// Identity of the invoking controller, used to drop its own entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfIdentity {
    pub pid: i32,
    pub identifier: String,
}

impl SelfIdentity {
    pub fn current(identifier: &str) -> Self {
        Self {
            pid: std::process::id() as i32,
            identifier: identifier.to_string(),
        }
    }

    pub fn excludes(&self, entry: &ProcessTableEntry) -> bool {
        if entry.pid == self.pid {
            return true;
        }

        entry.command_line.contains(&self.identifier) && entry.command_line.contains("status")
    }
}

pub struct Matcher<'t, T: ProcessTable> {
    table: &'t T,
    identity: SelfIdentity,
    mode: MatchMode,
}

impl<'t, T: ProcessTable> Matcher<'t, T> {
    pub fn new(table: &'t T, identity: SelfIdentity, mode: MatchMode) -> Self { Self { table, identity, mode } }

    pub fn is_running(&self, program_name: &str) -> Result<MatchResult, Error> {
        log::debug!("checking whether {program_name} is running");

        let entries: Vec<ProcessTableEntry> = self
            .table
            .find(program_name)?
            .into_iter()
            .filter(|entry| {
                if self.identity.excludes(entry) {
                    log::debug!("skipping own entry {} {}", entry.pid, entry.command_line);
                    return false;
                }
                self.mode.accepts(&entry.command_line, program_name)
            })
            .collect();

        for entry in &entries {
            log::debug!("matched {} {}", entry.pid, entry.command_line);
        }

        Ok(MatchResult {
            running: !entries.is_empty(),
            entries,
        })
    }
}

impl MatchMode {
    pub fn accepts(&self, command_line: &str, program_name: &str) -> bool {
        match self {
            MatchMode::Substring => command_line.contains(program_name),
            MatchMode::Argument => command_line
                .split_whitespace()
                .any(|arg| arg == program_name || arg.rsplit('/').next() == Some(program_name)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use std::cell::RefCell;

    /// In-memory process table; `signal` removes the entry.
    #[derive(Default)]
    pub(crate) struct FakeTable {
        pub entries: RefCell<Vec<ProcessTableEntry>>,
        pub signals: RefCell<Vec<(i32, Signal)>>,
        pub broken: bool,
        /// Pids whose signal fails with `EPERM`.
        pub denied: Vec<i32>,
    }

    impl FakeTable {
        pub fn with(entries: &[(i32, &str)]) -> Self {
            let table = FakeTable::default();
            for (pid, command_line) in entries {
                table.push(*pid, command_line);
            }
            table
        }

        pub fn push(&self, pid: i32, command_line: &str) {
            self.entries.borrow_mut().push(ProcessTableEntry {
                pid,
                command_line: command_line.to_string(),
            });
        }
    }

    impl ProcessTable for FakeTable {
        fn find(&self, needle: &str) -> Result<Vec<ProcessTableEntry>, Error> {
            if self.broken {
                return Err(Error::ProcessQuery("table unavailable".to_string()));
            }
            Ok(self.entries.borrow().iter().filter(|entry| entry.command_line.contains(needle)).cloned().collect())
        }

        fn signal(&self, pid: i32, signal: Signal) -> Result<bool, Error> {
            self.signals.borrow_mut().push((pid, signal));
            if self.denied.contains(&pid) {
                return Err(Error::Signal {
                    pid,
                    source: nix::errno::Errno::EPERM,
                });
            }
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|entry| entry.pid != pid);
            Ok(entries.len() != before)
        }
    }

    fn identity() -> SelfIdentity {
        SelfIdentity {
            pid: 4242,
            identifier: "ecctl".to_string(),
        }
    }

    #[test]
    fn test_empty_table_is_not_running() {
        let table = FakeTable::default();
        let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("worker").unwrap();

        assert!(!result.running);
        assert!(result.entries.is_empty());
    }

    #[test]
    fn test_matching_entry_is_running() {
        let table = FakeTable::with(&[(1, "/sbin/init"), (812, "/opt/app/tools/worker --port 80")]);
        let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("worker").unwrap();

        assert!(result.running);
        assert_eq!(result.pids(), vec![812]);
    }

    #[test]
    fn test_status_invocation_is_excluded() {
        let table = FakeTable::with(&[(12345, "/usr/bin/ecctl status worker")]);
        let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("worker").unwrap();

        assert!(!result.running);
    }

    #[test]
    fn test_own_pid_is_excluded() {
        let table = FakeTable::with(&[(4242, "/usr/bin/ecctl stop worker"), (900, "./worker")]);
        let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("worker").unwrap();

        assert_eq!(result.pids(), vec![900]);
    }

    #[test]
    fn test_own_pid_compares_numerically() {
        let identity = SelfIdentity {
            pid: 42,
            identifier: "ecctl".to_string(),
        };

        assert!(identity.excludes(&ProcessTableEntry { pid: 42, command_line: "x".to_string() }));
        assert!(!identity.excludes(&ProcessTableEntry { pid: 420, command_line: "x".to_string() }));
        assert!(!identity.excludes(&ProcessTableEntry { pid: 4, command_line: "x".to_string() }));
    }

    #[test]
    fn test_other_controller_commands_still_match() {
        let table = FakeTable::with(&[(77, "/usr/bin/ecctl start ./worker")]);
        let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("worker").unwrap();

        assert!(result.running);
    }

    #[test]
    fn test_substring_matches_superstrings() {
        let table = FakeTable::with(&[(10, "/opt/myapp-test --fast")]);
        let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("myapp").unwrap();

        assert!(result.running);
    }

    #[test]
    fn test_argument_mode_rejects_superstrings() {
        let table = FakeTable::with(&[(10, "/opt/myapp-test --fast"), (11, "/opt/bin/myapp --config a.toml"), (12, "sh myapp")]);
        let result = Matcher::new(&table, identity(), MatchMode::Argument).is_running("myapp").unwrap();

        assert_eq!(result.pids(), vec![11, 12]);
    }

    #[test]
    fn test_query_failure_propagates() {
        let table = FakeTable {
            broken: true,
            ..Default::default()
        };

        let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("worker");
        assert!(matches!(result, Err(Error::ProcessQuery(_))));
    }

    #[test]
    fn test_running_iff_surviving_entry_contains_name() {
        let tables: [&[(i32, &str)]; 4] = [
            &[],
            &[(4242, "worker")],
            &[(1, "ecctl status worker"), (2, "bash")],
            &[(1, "ecctl status worker"), (3, "worker -d")],
        ];

        for entries in tables {
            let table = FakeTable::with(entries);
            let expected = entries.iter().any(|(pid, cmd)| *pid != 4242 && cmd.contains("worker") && !(cmd.contains("ecctl") && cmd.contains("status")));
            let result = Matcher::new(&table, identity(), MatchMode::Substring).is_running("worker").unwrap();

            assert_eq!(result.running, expected);
        }
    }
}
