//! Snapshotting the output tree onto a branch of the parent repository.
//!
//! The snapshot is staged through a throwaway index file, so the parent's
//! own index and working tree are never touched.

use super::git::GitRepo;
use crate::error::GitResult;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Commit the contents of `output` as the new tip of `branch`.
///
/// Writes `CNAME` first when `cname` is given. Returns the new commit id,
/// or `None` when the tree is identical to the current branch tip.
pub fn import_tree(
    parent_root: &Path,
    output: &Path,
    branch: &str,
    message: &str,
    cname: Option<&str>,
) -> GitResult<Option<String>> {
    let repo = GitRepo::open(parent_root)?;

    if let Some(domain) = cname {
        fs::write(output.join("CNAME"), format!("{}\n", domain.trim()))?;
    }

    let git_dir = repo.run_with_env(["rev-parse", "--absolute-git-dir"], &[])?;
    let git_dir = git_dir.trim();

    let scratch = tempfile::tempdir()?;
    let index = scratch.path().join("index");
    let envs = [("GIT_INDEX_FILE", index.as_os_str())];

    repo.run_with_env(
        [
            OsStr::new("-C"),
            output.as_os_str(),
            OsStr::new("--git-dir"),
            OsStr::new(git_dir),
            OsStr::new("--work-tree"),
            OsStr::new("."),
            OsStr::new("add"),
            OsStr::new("--all"),
            OsStr::new("--force"),
            OsStr::new("."),
        ],
        &envs,
    )?;
    let tree = repo.run_with_env(["write-tree"], &envs)?;
    let tree = tree.trim();

    let refname = format!("refs/heads/{}", branch);
    let tip = repo.resolve(&refname)?;
    if let Some(tip) = &tip {
        let tip_tree = repo.resolve(&format!("{}^{{tree}}", tip))?;
        if tip_tree.as_deref() == Some(tree) {
            tracing::info!("Branch {} already holds this output", branch);
            return Ok(None);
        }
    }

    let mut args = vec!["commit-tree", tree];
    if let Some(tip) = &tip {
        args.push("-p");
        args.push(tip);
    }
    args.push("-m");
    args.push(message);
    let commit = repo.run_with_env(args, &[])?;
    let commit = commit.trim().to_string();

    repo.run_with_env(["update-ref", &refname, &commit], &[])?;
    tracing::info!("Recorded output as {} on {}", &commit[..commit.len().min(10)], branch);

    Ok(Some(commit))
}
