use super::Error;
use std::{
    env,
    path::{Component, Path, PathBuf},
};

/// A program as requested on the command line, resolved once per invocation.
///
/// `program_name` is taken from `absolute_path` at resolution time and is the
/// key used against the process table for the rest of the operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramReference {
    pub requested_path: String,
    pub absolute_path: PathBuf,
    pub program_name: String,
}

impl ProgramReference {
    /// Directory the program is started from.
    pub fn working_dir(&self) -> &Path { self.absolute_path.parent().unwrap_or_else(|| Path::new("/")) }

    pub fn ensure_exists(&self) -> Result<(), Error> {
        match self.absolute_path.is_file() {
            true => Ok(()),
            false => Err(Error::ProgramNotFound(self.absolute_path.clone())),
        }
    }
}

/// Resolve `path` against the current working directory.
pub fn resolve(path: &str) -> Result<ProgramReference, Error> {
    let cwd = env::current_dir().map_err(|err| Error::PathResolution {
        path: path.to_string(),
        reason: format!("cannot read current directory: {err}"),
    })?;

    resolve_from(&cwd, path)
}

/// Resolve `path` against `base` without touching the filesystem.
pub fn resolve_from(base: &Path, path: &str) -> Result<ProgramReference, Error> {
    let fail = |reason: &str| Error::PathResolution {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.trim().is_empty() {
        return Err(fail("path is empty"));
    }

    if path.contains('\0') {
        return Err(fail("path contains a NUL byte"));
    }

    let joined = match Path::new(path).is_absolute() {
        true => PathBuf::from(path),
        false => base.join(path),
    };

    let absolute_path = normalize(&joined);
    log::debug!("resolved {path} to {}", absolute_path.display());

    let program_name = match absolute_path.file_name() {
        Some(name) => name.to_str().ok_or_else(|| fail("program name is not valid UTF-8"))?.to_string(),
        None => return Err(fail("path has no program name")),
    };

    Ok(ProgramReference {
        requested_path: path.to_string(),
        absolute_path,
        program_name,
    })
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");

    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_resolves_under_base() {
        let program = resolve_from(Path::new("/opt/app"), "./tools/worker").unwrap();

        assert_eq!(program.requested_path, "./tools/worker");
        assert_eq!(program.absolute_path, PathBuf::from("/opt/app/tools/worker"));
        assert_eq!(program.program_name, "worker");
        assert_eq!(program.working_dir(), Path::new("/opt/app/tools"));
    }

    #[test]
    fn test_absolute_path_ignores_base() {
        let program = resolve_from(Path::new("/opt/app"), "/usr/local/bin/server").unwrap();
        assert_eq!(program.absolute_path, PathBuf::from("/usr/local/bin/server"));
        assert_eq!(program.program_name, "server");
    }

    #[test]
    fn test_parent_components_are_collapsed() {
        let program = resolve_from(Path::new("/opt/app/bin"), "../tools/./worker").unwrap();
        assert_eq!(program.absolute_path, PathBuf::from("/opt/app/tools/worker"));
    }

    #[test]
    fn test_bare_name_resolves_in_base() {
        let program = resolve_from(Path::new("/srv"), "worker").unwrap();
        assert_eq!(program.absolute_path, PathBuf::from("/srv/worker"));
        assert_eq!(program.working_dir(), Path::new("/srv"));
    }

    #[test]
    fn test_missing_file_still_resolves() {
        let program = resolve_from(Path::new("/definitely/not/here"), "ghost").unwrap();
        assert_eq!(program.program_name, "ghost");
        assert!(matches!(program.ensure_exists(), Err(Error::ProgramNotFound(_))));
    }

    #[test]
    fn test_existing_file_passes_check() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("worker"), "").unwrap();

        let program = resolve_from(dir.path(), "worker").unwrap();
        assert!(program.ensure_exists().is_ok());
    }

    #[test]
    fn test_directory_is_not_a_program() {
        let dir = tempfile::tempdir().unwrap();
        let program = resolve_from(Path::new("/"), dir.path().to_str().unwrap()).unwrap();
        assert!(matches!(program.ensure_exists(), Err(Error::ProgramNotFound(_))));
    }

    #[test]
    fn test_invalid_paths_fail() {
        assert!(matches!(resolve_from(Path::new("/"), ""), Err(Error::PathResolution { .. })));
        assert!(matches!(resolve_from(Path::new("/"), "/"), Err(Error::PathResolution { .. })));
        assert!(matches!(resolve_from(Path::new("/"), ".."), Err(Error::PathResolution { .. })));
        assert!(matches!(resolve_from(Path::new("/"), "bad\0name"), Err(Error::PathResolution { .. })));
    }
}
