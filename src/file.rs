use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{fs, path::Path};

pub struct Exists<'p> {
    path: &'p Path,
}

impl<'p> Exists<'p> {
    pub fn check(path: &'p impl AsRef<Path>) -> Self { Self { path: path.as_ref() } }
    pub fn file(&self) -> bool { self.path.is_file() }
    pub fn folder(&self) -> bool { self.path.is_dir() }
}

/// Read and parse a TOML file.
pub fn read<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;

    toml::from_str(&contents).with_context(|| format!("cannot parse {}", path.display()))
}
