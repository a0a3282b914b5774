use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;

/// How an include target was spelled in the source
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    /// `#include "file"`
    Quoted,
    /// `#include <file>`
    System,
}
impl fmt::Display for IncludeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quoted => f.write_str("quoted"),
            Self::System => f.write_str("system"),
        }
    }
}

/// Hooks an embedder can install to take over include handling.
///
/// Both hooks have defaults, so an implementation only overrides what it needs.
pub trait Callbacks: Send + Sync {
    /// Resolves an include target to the file that should be read.
    ///
    /// `parent` is the file containing the directive, `None` when reading stdin.
    fn lookup(&self, name: &str, kind: IncludeKind, parent: Option<&Path>) -> Option<PathBuf> {
        default_lookup(name, kind, parent)
    }

    /// Opens a file previously returned by `lookup`
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// The hooks used when the caller has not registered any
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultCallbacks;
impl Callbacks for DefaultCallbacks {}

/// Quoted includes are resolved next to the including file, or the working
/// directory when there is none. System includes have no search path here.
fn default_lookup(name: &str, kind: IncludeKind, parent: Option<&Path>) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    if kind == IncludeKind::System {
        debug!("no search path for system include <{}>", name);
        return None;
    }
    let dir = parent
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let path = dir.join(candidate);
    if path.is_file() {
        Some(path)
    } else {
        debug!("include \"{}\" not found in {}", name, dir.display());
        None
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::io::Read;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn quoted_includes_resolve_next_to_parent() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("main.c");
        let header = dir.path().join("defs.h");
        fs::write(&parent, "").unwrap();
        fs::write(&header, "#define X 1\n").unwrap();

        let callbacks = DefaultCallbacks;
        let found = callbacks.lookup("defs.h", IncludeKind::Quoted, Some(&parent));
        assert_eq!(found, Some(header.clone()));

        let mut contents = String::new();
        callbacks
            .open(&header)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "#define X 1\n");
    }

    #[test]
    fn system_includes_are_not_resolved_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("main.c");
        fs::write(dir.path().join("stdio.h"), "").unwrap();

        let callbacks = DefaultCallbacks;
        assert_eq!(
            callbacks.lookup("stdio.h", IncludeKind::System, Some(&parent)),
            None
        );
        assert_eq!(
            callbacks.lookup("missing.h", IncludeKind::Quoted, Some(&parent)),
            None
        );
    }
}
