//! Read-only questions about the parent repository and the output path.

use super::git::GitRepo;
use crate::error::GitResult;
use std::path::{Component, Path, PathBuf};

/// Lexically clean a path: drop `.`, fold `..`, strip trailing separators
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, symlink-resolved form of `path`, relative paths taken against `base`.
///
/// Paths that do not exist yet resolve their deepest existing ancestor and
/// keep the remaining components as written.
pub fn normalize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let cleaned = clean(&joined);

    let mut existing = cleaned.as_path();
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            for part in rest.iter().rev() {
                resolved.push(part);
            }
            return resolved;
        }
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return cleaned,
        }
    }
}

/// True iff `path` is the working tree path of a submodule registered in `parent`
pub fn is_submodule(parent: &GitRepo, path: &Path) -> GitResult<bool> {
    let wanted = normalize(path, parent.root());
    let found = parent
        .submodules()?
        .iter()
        .any(|sm| normalize(&sm.path, parent.root()) == wanted);
    Ok(found)
}

/// True iff a git repository is checked out at `path`
pub fn exists(path: &Path) -> bool {
    GitRepo::is_repository(path)
}
