use colored::Colorize;
use ecctl::{
    config::structs::Config,
    helpers,
    log::{FileSink, Sink},
    process::{Controller, Error, Outcome, SystemTable},
};
use global_placeholders::global;
use macros_rs::{crashln, string};
use std::sync::Arc;

pub fn get_version(short: bool) -> String {
    return match short {
        true => format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        false => match env!("GIT_HASH") {
            "" => format!("{} ({}) [{}]", env!("CARGO_PKG_VERSION"), env!("BUILD_DATE"), env!("PROFILE")),
            hash => format!("{} ({} {hash}) [{}]", env!("CARGO_PKG_VERSION"), env!("BUILD_DATE"), env!("PROFILE")),
        },
    };
}

fn sink(config: &Config) -> Arc<dyn Sink> {
    let Some(path) = config.log.file() else {
        return Arc::new(FileSink::console_only());
    };

    match FileSink::open(path, config.log.console) {
        Ok(sink) => Arc::new(sink),
        Err(err) => {
            println!("{} Cannot open log file {path}: {}", *helpers::WARN, string!(err).white());
            Arc::new(FileSink::console_only())
        }
    }
}

pub(crate) fn controller(config: &Config) -> Controller<SystemTable> {
    let options = match config.options() {
        Ok(options) => options,
        Err(err) => crashln!("{} Invalid config {}\n{}", *helpers::FAIL, global!("ecctl.config"), string!(err).white()),
    };

    Controller::new(SystemTable, sink(config), options)
}

fn print(result: Result<Outcome, Error>) {
    match result {
        Ok(outcome @ (Outcome::AlreadyRunning { .. } | Outcome::NotRunning { .. })) => println!("{} {outcome}", *helpers::WARN),
        Ok(outcome) => println!("{} {outcome}", *helpers::SUCCESS),
        Err(err) => crashln!("{} {}", *helpers::FAIL, string!(err).white()),
    }
}

pub fn start(controller: &Controller<SystemTable>, path: &String) { print(controller.start(path)) }

pub fn stop(controller: &Controller<SystemTable>, name: &String) { print(controller.stop(name)) }

pub fn status(controller: &Controller<SystemTable>, name: &String) { print(controller.status(name)) }
