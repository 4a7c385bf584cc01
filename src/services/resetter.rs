//! Clearing previously generated output before a rebuild.
//!
//! Resetting is destructive on purpose: every uncommitted change under the
//! output path (edits, new files, half-finished builds) is discarded. Never
//! point the output path at anything you edit by hand.

use super::git::GitRepo;
use super::inspector;
use crate::error::GitResult;
use std::fs;
use std::path::Path;

/// What a reset did to the output path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetAction {
    /// Submodule working tree reset to HEAD and untracked files removed
    HardReset,
    /// Submodule was never checked out; directory created and populated
    InitializedSubmodule,
    /// Plain directory deleted and recreated empty
    RecreatedDirectory,
    /// Plain directory did not exist
    Nothing,
}

/// Reset the output path of the parent repository at `parent_root`
pub fn reset(parent_root: &Path, output_path: &Path) -> GitResult<ResetAction> {
    let parent = GitRepo::open(parent_root)?;

    if inspector::is_submodule(&parent, output_path)? {
        tracing::warn!("Output directory is a git submodule, resetting it.");

        if inspector::exists(output_path) {
            let output = GitRepo::open(output_path)?;
            output.reset_hard()?;
            output.clean_untracked()?;
            Ok(ResetAction::HardReset)
        } else {
            fs::create_dir_all(output_path)?;
            parent.submodule_update_init(output_path)?;
            Ok(ResetAction::InitializedSubmodule)
        }
    } else {
        tracing::warn!("Output path is not a git submodule, deleting it.");
        reset_plain_directory(output_path)
    }
}

/// Delete a plain output directory, leaving an empty one in its place
pub fn reset_plain_directory(output_path: &Path) -> GitResult<ResetAction> {
    if !output_path.is_dir() {
        return Ok(ResetAction::Nothing);
    }
    fs::remove_dir_all(output_path)?;
    fs::create_dir_all(output_path)?;
    Ok(ResetAction::RecreatedDirectory)
}
