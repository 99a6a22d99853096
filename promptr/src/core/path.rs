//! Lexical path containment for operation targets.

use std::path::{Component, Path, PathBuf};

/// Resolve `relative` against `root`, refusing anything that would land
/// outside `root`.
///
/// Purely lexical: `.` components are dropped, `..` pops a previously seen
/// component and fails if it would climb past `root`. Absolute paths and
/// Windows prefixes are refused outright. The file system is never consulted,
/// so this is safe to call before any target exists.
pub fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    if relative.is_empty() {
        return None;
    }
    let mut depth: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => depth.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                depth.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if depth.is_empty() {
        return None;
    }
    let mut resolved = root.to_path_buf();
    resolved.extend(&depth);
    Some(resolved)
}
