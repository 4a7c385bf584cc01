//! Git repository handle.
//!
//! Shells out to the `git` CLI via std::process::Command.
//! All operations are blocking and should be wrapped with spawn_blocking.

use crate::domain::OutputStatus;
use crate::error::{GitError, GitResult};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// A registered submodule, as read from `.gitmodules`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodule {
    pub name: String,
    /// Path relative to the repository root
    pub path: PathBuf,
}

/// Handle on one git working tree.
///
/// Handles are cheap and hold no open resources; operations open one,
/// use it, and drop it.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the repository whose working tree is `path`
    pub fn open(path: &Path) -> GitResult<Self> {
        if !Self::is_repository(path) {
            return Err(GitError::NotARepository(path.to_path_buf()));
        }

        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// True when `path` has its own `.git` directory or gitfile
    pub fn is_repository(path: &Path) -> bool {
        path.join(".git").exists()
    }

    /// Get the repository path
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command<I, S>(&self, args: I) -> (Command, String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let label = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new("git");
        cmd.args(&args).current_dir(&self.root);
        (cmd, label)
    }

    fn output_of(mut cmd: Command, label: &str) -> GitResult<Output> {
        tracing::trace!("git {}", label);
        cmd.output().map_err(|source| GitError::Spawn {
            command: label.to_string(),
            source,
        })
    }

    fn check(output: Output, label: &str) -> GitResult<String> {
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: label.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run git and return stdout, failing on non-zero exit
    fn run<I, S>(&self, args: I) -> GitResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (cmd, label) = self.command(args);
        let output = Self::output_of(cmd, &label)?;
        Self::check(output, &label)
    }

    /// Run git with extra environment variables
    pub(crate) fn run_with_env<I, S>(&self, args: I, envs: &[(&str, &OsStr)]) -> GitResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (mut cmd, label) = self.command(args);
        cmd.envs(envs.iter().map(|(k, v)| (*k, *v)));
        let output = Self::output_of(cmd, &label)?;
        Self::check(output, &label)
    }

    /// Path of `path` relative to this working tree, for use as a pathspec
    pub fn relative(&self, path: &Path) -> GitResult<PathBuf> {
        let root = super::inspector::normalize(&self.root, &self.root);
        let target = super::inspector::normalize(path, &self.root);
        target
            .strip_prefix(&root)
            .map(Path::to_path_buf)
            .map_err(|_| GitError::OutsideRepository(path.to_path_buf()))
    }

    /// List submodules registered in `.gitmodules`
    pub fn submodules(&self) -> GitResult<Vec<Submodule>> {
        if !self.root.join(".gitmodules").exists() {
            return Ok(Vec::new());
        }

        let (cmd, label) = self.command([
            "config",
            "-z",
            "--file",
            ".gitmodules",
            "--get-regexp",
            r"^submodule\..*\.path$",
        ]);
        let output = Self::output_of(cmd, &label)?;

        // Exit code 1 means no matching keys
        if output.status.code() == Some(1) {
            return Ok(Vec::new());
        }
        let stdout = Self::check(output, &label)?;

        // With -z each entry is `key\nvalue\0`; names and paths may hold spaces
        let submodules = stdout
            .split('\0')
            .filter_map(|entry| {
                let (key, value) = entry.split_once('\n')?;
                let name = key.strip_prefix("submodule.")?.strip_suffix(".path")?;
                Some(Submodule {
                    name: name.to_string(),
                    path: PathBuf::from(value),
                })
            })
            .collect();

        Ok(submodules)
    }

    /// Working tree status including every untracked file
    pub fn status(&self) -> GitResult<OutputStatus> {
        let stdout = self.run(["status", "--porcelain", "-z", "--untracked-files=all"])?;
        Ok(OutputStatus::parse_porcelain_z(&stdout))
    }

    /// Discard working tree and index changes back to HEAD
    pub fn reset_hard(&self) -> GitResult<()> {
        self.run(["reset", "--hard", "HEAD"])?;
        Ok(())
    }

    /// Remove untracked files and directories (ignored files are kept)
    pub fn clean_untracked(&self) -> GitResult<()> {
        self.run(["clean", "-f", "-d"])?;
        Ok(())
    }

    /// Register a new submodule tracking `branch` of `url`.
    ///
    /// Forced, so an output path listed in `.gitignore` can be added and a
    /// git directory left in `.git/modules` by an earlier failed add is reused.
    pub fn submodule_add(&self, name: &str, url: &str, path: &Path, branch: &str) -> GitResult<()> {
        let rel = self.relative(path)?;
        self.run([
            OsStr::new("submodule"),
            OsStr::new("add"),
            OsStr::new("--force"),
            OsStr::new("-b"),
            OsStr::new(branch),
            OsStr::new("--name"),
            OsStr::new(name),
            OsStr::new("--"),
            OsStr::new(url),
            rel.as_os_str(),
        ])?;
        Ok(())
    }

    /// Initialize and check out a submodule at its recorded commit
    pub fn submodule_update_init(&self, path: &Path) -> GitResult<()> {
        let rel = self.relative(path)?;
        self.run([
            OsStr::new("submodule"),
            OsStr::new("update"),
            OsStr::new("--init"),
            OsStr::new("--"),
            rel.as_os_str(),
        ])?;
        Ok(())
    }

    /// Whether `branch` exists on `remote` (a name or URL)
    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> GitResult<bool> {
        let refname = format!("refs/heads/{}", branch);
        let (cmd, label) = self.command(["ls-remote", "--exit-code", "--heads", remote, &refname]);
        let output = Self::output_of(cmd, &label)?;

        // ls-remote --exit-code uses 2 for "no matching refs"
        if output.status.code() == Some(2) {
            return Ok(false);
        }
        Self::check(output, &label)?;
        Ok(true)
    }

    /// Merge `branch` from `remote` into HEAD
    pub fn pull(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.run(["pull", "--no-rebase", "--no-edit", remote, branch])?;
        Ok(())
    }

    /// Push HEAD to `branch` on `remote`; works from a detached submodule HEAD
    pub fn push(&self, remote: &str, branch: &str) -> GitResult<()> {
        let refspec = format!("HEAD:refs/heads/{}", branch);
        self.run(["push", remote, &refspec])?;
        Ok(())
    }

    /// Force-push a local branch onto a remote branch
    pub fn force_push(&self, remote: &str, local: &str, remote_branch: &str) -> GitResult<()> {
        let refspec = format!("refs/heads/{}:refs/heads/{}", local, remote_branch);
        self.run(["push", "--force", remote, &refspec])?;
        Ok(())
    }

    /// Stage the given paths (relative to the working tree)
    pub fn add(&self, paths: &[PathBuf]) -> GitResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args: Vec<&OsStr> = vec![OsStr::new("add"), OsStr::new("--")];
        args.extend(paths.iter().map(|p| p.as_os_str()));
        self.run(args)?;
        Ok(())
    }

    /// Whether the index differs from HEAD
    pub fn has_staged_changes(&self) -> GitResult<bool> {
        let (cmd, label) = self.command(["diff", "--cached", "--quiet"]);
        let output = Self::output_of(cmd, &label)?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Self::check(output, &label).map(|_| true),
        }
    }

    /// Commit the index. With no message git opens the user's editor.
    pub fn commit(&self, message: Option<&str>) -> GitResult<()> {
        match message {
            Some(message) => {
                self.run(["commit", "-m", message])?;
            }
            None => {
                let (mut cmd, label) = self.command(["commit"]);
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|source| GitError::Spawn {
                        command: label.clone(),
                        source,
                    })?;
                if !status.success() {
                    return Err(GitError::CommandFailed {
                        command: label,
                        stderr: format!("exited with {}", status),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether `path` differs between working tree and index.
    ///
    /// For a submodule this is true only when its checked-out commit has
    /// moved; uncommitted content inside the submodule is ignored.
    pub fn changed_in_worktree(&self, path: &Path) -> GitResult<bool> {
        let rel = self.relative(path)?;
        let stdout = self.run([
            OsStr::new("diff"),
            OsStr::new("--name-only"),
            OsStr::new("--ignore-submodules=dirty"),
            OsStr::new("--"),
            rel.as_os_str(),
        ])?;
        let wanted = super::inspector::clean(&rel);
        Ok(stdout
            .lines()
            .any(|line| super::inspector::clean(Path::new(line)) == wanted))
    }

    /// Current HEAD commit id
    pub fn head(&self) -> GitResult<String> {
        Ok(self.run(["rev-parse", "HEAD"])?.trim().to_string())
    }

    /// Resolve a ref to a commit id, `None` if it does not exist
    pub fn resolve(&self, refname: &str) -> GitResult<Option<String>> {
        let (cmd, label) = self.command(["rev-parse", "--verify", "--quiet", refname]);
        let output = Self::output_of(cmd, &label)?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    /// Number of commits reachable from HEAD
    pub fn commit_count(&self) -> GitResult<u32> {
        let stdout = self.run(["rev-list", "--count", "HEAD"])?;
        stdout
            .trim()
            .parse()
            .map_err(|_| GitError::CommandFailed {
                command: "rev-list --count HEAD".to_string(),
                stderr: format!("unexpected output {:?}", stdout.trim()),
            })
    }
}
