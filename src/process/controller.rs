use super::{
    Error,
    locate::{self, ProgramReference},
    matcher::{MatchMode, MatchResult, Matcher, SelfIdentity},
    table::ProcessTable,
};

use crate::log::Sink;
use nix::sys::signal::Signal;

use std::{
    fmt,
    os::unix::process::CommandExt,
    process::{Child, Command, Stdio},
    sync::Arc,
    thread,
};

#[derive(Clone, Debug)]
pub struct Options {
    /// Identifier of this controller as it appears in its own command line.
    pub identifier: String,
    pub mode: MatchMode,
    pub signal: Signal,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            identifier: env!("CARGO_PKG_NAME").to_string(),
            mode: MatchMode::Substring,
            signal: Signal::SIGTERM,
        }
    }
}

/// Normal result of a controller operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    AlreadyRunning { name: String, pids: Vec<i32> },
    Started { name: String, pid: i32 },
    NotRunning { name: String },
    Stopped { name: String, pids: Vec<i32> },
    Running { name: String, pids: Vec<i32> },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AlreadyRunning { name, .. } => write!(f, "program '{name}' already running"),
            Outcome::Started { name, pid } => write!(f, "program '{name}' started successfully (pid {pid})"),
            Outcome::NotRunning { name } => write!(f, "program '{name}' not running"),
            Outcome::Stopped { name, .. } => write!(f, "program '{name}' stopped"),
            Outcome::Running { name, pids } => {
                let pids: Vec<String> = pids.iter().map(|pid| pid.to_string()).collect();
                write!(f, "program '{name}' running (pid {})", pids.join(", "))
            }
        }
    }
}

pub struct Controller<T: ProcessTable> {
    table: T,
    sink: Arc<dyn Sink>,
    options: Options,
    identity: SelfIdentity,
}

impl<T: ProcessTable> Controller<T> {
    pub fn new(table: T, sink: Arc<dyn Sink>, options: Options) -> Self {
        let identity = SelfIdentity::current(&options.identifier);
        Self { table, sink, options, identity }
    }

    pub fn with_identity(mut self, identity: SelfIdentity) -> Self {
        self.identity = identity;
        self
    }

    fn check(&self, name: &str) -> Result<MatchResult, Error> { Matcher::new(&self.table, self.identity.clone(), self.options.mode).is_running(name) }

    fn report<R>(&self, result: Result<R, Error>) -> Result<R, Error> {
        if let Err(err) = &result {
            self.sink.error(&err.to_string());
        }
        result
    }

    /// Start the program at `path` unless something matching its name is already running.
    pub fn start(&self, path: &str) -> Result<Outcome, Error> {
        self.sink.info(&format!("starting program: {path}"));
        let result = self.try_start(path);
        self.report(result)
    }

    fn try_start(&self, path: &str) -> Result<Outcome, Error> {
        let program = locate::resolve(path)?;
        program.ensure_exists()?;

        let name = program.program_name.clone();
        let matched = self.check(&name)?;

        if matched.running {
            self.sink.warn(&format!("program '{name}' is already running"));
            return Ok(Outcome::AlreadyRunning { name, pids: matched.pids() });
        }

        let child = self.spawn(&program)?;
        let pid = child.id() as i32;

        self.sink.info(&format!("program '{name}' started successfully (pid {pid})"));
        self.reap(child, name.clone());

        Ok(Outcome::Started { name, pid })
    }

    fn spawn(&self, program: &ProgramReference) -> Result<Child, Error> {
        let spawn_error = |source| Error::Spawn {
            path: program.absolute_path.clone(),
            source,
        };

        let (stdout, stderr) = self.sink.child_output().map_err(spawn_error)?;
        self.sink.debug(&format!("working directory: {}", program.working_dir().display()));

        Command::new(&program.absolute_path)
            .current_dir(program.working_dir())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .process_group(0)
            .spawn()
            .map_err(spawn_error)
    }

    /// Wait for the child on a detached thread. Only reaps and logs; the
    /// caller never sees the result and the thread is never joined.
    fn reap(&self, mut child: Child, name: String) {
        let sink = Arc::clone(&self.sink);

        let spawned = thread::Builder::new().name(format!("reap-{}", child.id())).spawn(move || match child.wait() {
            Ok(status) => sink.info(&format!("program '{name}' exited ({status})")),
            Err(err) => log::debug!("failed to wait on '{name}': {err}"),
        });

        if let Err(err) = spawned {
            log::warn!("unable to start reaper thread: {err}");
        }
    }

    /// Signal every process matching `name`.
    pub fn stop(&self, name: &str) -> Result<Outcome, Error> {
        self.sink.info(&format!("stopping program: {name}"));
        let result = self.try_stop(name);
        self.report(result)
    }

    fn try_stop(&self, name: &str) -> Result<Outcome, Error> {
        let matched = self.check(name)?;

        if !matched.running {
            self.sink.warn(&format!("program '{name}' is not running"));
            return Ok(Outcome::NotRunning { name: name.to_string() });
        }

        let mut pids = Vec::with_capacity(matched.entries.len());
        let mut failures = Vec::new();

        for entry in &matched.entries {
            match self.table.signal(entry.pid, self.options.signal) {
                Ok(true) => log::debug!("sent {} to {}", self.options.signal, entry.pid),
                Ok(false) => log::debug!("pid {} exited before {}", entry.pid, self.options.signal),
                Err(err) => {
                    failures.push(err);
                    continue;
                }
            }
            pids.push(entry.pid);
        }

        // every match has been tried; the first failure is returned, the rest logged here
        let mut failures = failures.into_iter();
        if let Some(first) = failures.next() {
            failures.for_each(|err| self.sink.error(&err.to_string()));
            return Err(first);
        }

        self.sink.info(&format!("program '{name}' stopped"));
        Ok(Outcome::Stopped { name: name.to_string(), pids })
    }

    /// Report whether anything matching `name` is running. Never changes OS state.
    pub fn status(&self, name: &str) -> Result<Outcome, Error> {
        let result = self.check(name).map(|matched| match matched.running {
            true => Outcome::Running {
                name: name.to_string(),
                pids: matched.pids(),
            },
            false => Outcome::NotRunning { name: name.to_string() },
        });

        if let Ok(outcome) = &result {
            self.sink.info(&outcome.to_string());
        }

        self.report(result)
    }
}
