pub mod structs;

use crate::{
    file::{self, Exists},
    process::Options,
};

use anyhow::{Context, Result, anyhow};
use nix::sys::signal::Signal;
use structs::prelude::*;

use std::{fs::write, path::Path, str::FromStr};

pub const FILE_NAME: &str = "config.toml";

/// Read `config.toml` from `base`, writing the defaults first if it does not exist.
pub fn read(base: &Path) -> Result<Config> {
    let config_path = base.join(FILE_NAME);

    if !Exists::check(&config_path).file() {
        let config = Config::defaults(base);
        config.save(base)?;
        log::info!("created config file");
        return Ok(config);
    }

    let mut config: Config = file::read(config_path)?;
    if config.log.path.is_none() {
        config.log.path = Log::under(base).path;
    }

    Ok(config)
}

impl Config {
    pub fn defaults(base: &Path) -> Self {
        Config {
            log: Log::under(base),
            matcher: Matcher::default(),
            stop: Stop::default(),
        }
    }

    pub fn save(&self, base: &Path) -> Result<()> {
        let contents = toml::to_string(&self).context("cannot serialize config")?;
        let config_path = base.join(FILE_NAME);

        write(&config_path, contents).with_context(|| format!("error writing {}", config_path.display()))
    }

    /// Signal sent by `stop`. Accepts `SIGTERM`, `TERM` or `term`.
    pub fn signal(&self) -> Result<Signal> {
        let name = self.stop.signal.trim().to_uppercase();
        let name = match name.starts_with("SIG") {
            true => name,
            false => format!("SIG{name}"),
        };

        Signal::from_str(&name).map_err(|_| anyhow!("unknown stop signal '{}'", self.stop.signal))
    }

    pub fn options(&self) -> Result<Options> {
        Ok(Options {
            identifier: self.matcher.identifier.clone(),
            mode: self.matcher.mode,
            signal: self.signal()?,
        })
    }
}
