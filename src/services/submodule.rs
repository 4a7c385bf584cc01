//! Keeping the output submodule registered, current, and recorded in the parent.

use super::git::GitRepo;
use super::inspector;
use crate::domain::PublishTarget;
use crate::error::GitResult;
use std::path::Path;

/// Result of [`ensure_exists`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureAction {
    /// Submodule was added to the parent's registrations
    Registered,
    /// Submodule was already registered and has been checked out
    Updated,
}

/// Result of [`sync_from_remote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// False when the remote branch does not exist yet
    pub pulled: bool,
    /// Commit id of the pointer commit made in the parent, if any
    pub pointer_commit: Option<String>,
}

/// Make sure the output submodule is registered and checked out.
///
/// Registers it against `target.remote_url` when it is neither registered
/// nor checked out, then initializes it at the recorded commit.
pub fn ensure_exists(parent_root: &Path, target: &PublishTarget) -> GitResult<EnsureAction> {
    let parent = GitRepo::open(parent_root)?;
    let path = &target.output_path;

    let registered = inspector::is_submodule(&parent, path)?;
    let action = if !registered && !inspector::exists(path) {
        tracing::warn!(
            "Output submodule {} doesn't exist, creating it at {}.",
            target.submodule_name,
            path.display()
        );
        // A reset leaves an empty directory behind; git refuses to add over it
        if path.is_dir() && std::fs::read_dir(path)?.next().is_none() {
            std::fs::remove_dir(path)?;
        }
        parent.submodule_add(
            &target.submodule_name,
            &target.remote_url,
            path,
            &target.branch,
        )?;
        EnsureAction::Registered
    } else {
        EnsureAction::Updated
    };

    parent.submodule_update_init(path)?;
    Ok(action)
}

/// Pull the publish branch into the output repository, then record a moved
/// submodule pointer in the parent with a single commit.
///
/// Running it again without a remote change commits nothing.
pub fn sync_from_remote(parent_root: &Path, target: &PublishTarget) -> GitResult<SyncOutcome> {
    let output = GitRepo::open(&target.output_path)?;

    let pulled = if output.remote_branch_exists(&target.remote, &target.branch)? {
        output.pull(&target.remote, &target.branch)?;
        true
    } else {
        tracing::info!(
            "Remote branch {}/{} does not exist yet, nothing to pull",
            target.remote,
            target.branch
        );
        false
    };
    drop(output);

    let parent = GitRepo::open(parent_root)?;
    let pointer_commit = if parent.changed_in_worktree(&target.output_path)? {
        tracing::warn!("Updating submodule to latest version");
        let rel = parent.relative(&target.output_path)?;
        parent.add(&[rel])?;
        parent.commit(Some(&target.pointer_message))?;
        Some(parent.head()?)
    } else {
        None
    };

    Ok(SyncOutcome {
        pulled,
        pointer_commit,
    })
}
