mod cli;
mod globals;

use clap::{CommandFactory, Parser, Subcommand};
use clap_verbosity_flag::{LogLevel, Verbosity};
use colored::Colorize;
use ecctl::{config, helpers};
use macros_rs::{crashln, str, string};

#[derive(Copy, Clone, Debug, Default)]
struct NoneLevel;
impl LogLevel for NoneLevel {
    fn default() -> Option<log::Level> { None }
}

/// A command-line tool to monitor, start, and stop programs
#[derive(Parser)]
#[command(name = "ecctl", version = str!(cli::get_version(false)))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[clap(flatten)]
    verbose: Verbosity<NoneLevel>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a program
    Start {
        /// Path of the program to start
        path: String,
    },
    /// Stop a program
    Stop {
        /// Program name
        name: String,
    },
    /// Check status of a program
    Status {
        /// Program name
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let mut env = env_logger::Builder::new();
    env.filter_level(cli.verbose.log_level_filter()).init();

    let Some(command) = &cli.command else {
        if let Err(err) = Cli::command().print_help() {
            crashln!("{} {}", *helpers::FAIL, string!(err).white());
        }
        return;
    };

    let base = globals::init();
    let config = match config::read(&base) {
        Ok(config) => config,
        Err(err) => crashln!("{} Cannot load config.\n{}", *helpers::FAIL, format!("{err:#}").white()),
    };

    let controller = cli::controller(&config);

    match command {
        Commands::Start { path } => cli::start(&controller, path),
        Commands::Stop { name } => cli::stop(&controller, name),
        Commands::Status { name } => cli::status(&controller, name),
    };
}
