use ecctl::{file::Exists, helpers};
use global_placeholders::init;
use macros_rs::crashln;
use std::{env, fs, path::PathBuf};

/// Overrides the base directory (default `~/.ecctl`).
pub(crate) const HOME_ENV: &str = "ECCTL_HOME";

fn base_dir() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV).filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }

    match home::home_dir() {
        Some(path) => path.join(".ecctl"),
        None => crashln!("{} Impossible to get your home directory", *helpers::FAIL),
    }
}

pub(crate) fn init() -> PathBuf {
    let base = base_dir();

    if !Exists::check(&base).folder() {
        if let Err(err) = fs::create_dir_all(&base) {
            crashln!("{} Cannot create {}: {err}", *helpers::FAIL, base.display());
        }
        log::info!("created ecctl base dir");
    }

    let path = base.display();
    init!("ecctl.config", format!("{path}/config.toml"));

    base
}
