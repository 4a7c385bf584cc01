//! The publish workflow: reset, sync, build, commit, push, record.

use super::builder::SiteBuilder;
use super::git::GitRepo;
use super::{pages, resetter, submodule};
use crate::config::{ProjectConfig, PublishConfig, ResolvedProfile};
use crate::domain::{
    BuildProfile, Project, PublishOutcome, PublishReport, PublishRun, PublishStep, PublishTarget,
};
use crate::error::{CommitError, GitResult, PublishError, PublishFailure};
use std::path::{Path, PathBuf};

/// Expand `{date}` in a commit message to today's date (YYYY-MM-DD)
pub fn expand_message(message: &str) -> String {
    if !message.contains("{date}") {
        return message.to_string();
    }
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    message.replace("{date}", &today)
}

/// Publishes the production build into the output submodule
pub struct Publisher<'a, B: SiteBuilder + ?Sized> {
    parent_root: PathBuf,
    target: PublishTarget,
    profile: ResolvedProfile,
    builder: &'a B,
}

impl<'a, B: SiteBuilder + ?Sized> Publisher<'a, B> {
    pub fn new(
        parent_root: PathBuf,
        target: PublishTarget,
        profile: ResolvedProfile,
        builder: &'a B,
    ) -> Self {
        Self {
            parent_root,
            target,
            profile,
            builder,
        }
    }

    /// Publisher for a project's production profile and submodule target
    pub fn for_project(project: &Project, builder: &'a B) -> Self {
        let mut profile = project.profile(BuildProfile::Production);
        let target = project.publish_target();
        // The build must land in the submodule that gets committed
        profile.output = target.output_path.clone();
        Self::new(project.root_path.clone(), target, profile, builder)
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Nothing is rolled back on failure; each step is safe to re-run, so
    /// the remedy for any failure is to fix the cause and publish again.
    pub fn publish(&self) -> Result<PublishReport, PublishFailure> {
        let mut run = PublishRun::new();
        let result = self.run_steps(&mut run);

        match &result {
            Ok(_) => tracing::info!("Publish finished in {:.1?}", run.elapsed()),
            Err(failure) => tracing::error!("{}", failure),
        }
        result
    }

    fn run_steps(&self, run: &mut PublishRun) -> Result<PublishReport, PublishFailure> {
        let parent = self.parent_root.as_path();
        let target = &self.target;
        let mut pointer_commits = 0;

        step(run, PublishStep::Resetting, || {
            resetter::reset(parent, &target.output_path).map_err(PublishError::Reset)
        })?;

        step(run, PublishStep::EnsuringSubmodule, || {
            submodule::ensure_exists(parent, target).map_err(PublishError::SubmoduleRegistration)
        })?;

        let synced = step(run, PublishStep::Syncing, || {
            submodule::sync_from_remote(parent, target).map_err(PublishError::Sync)
        })?;
        pointer_commits += u32::from(synced.pointer_commit.is_some());

        step(run, PublishStep::Building, || {
            self.builder.build(&self.profile).map_err(PublishError::Build)
        })?;

        let outcome = self.commit_and_push(run)?;

        let synced = step(run, PublishStep::SyncingAgain, || {
            submodule::sync_from_remote(parent, target).map_err(PublishError::Sync)
        })?;
        pointer_commits += u32::from(synced.pointer_commit.is_some());

        Ok(PublishReport {
            outcome,
            steps: run.visited().to_vec(),
            pointer_commits,
        })
    }

    /// Commit untracked and modified output files and push them.
    ///
    /// Deleted files are never staged, so a build that drops a page leaves
    /// the old copy published until it is removed by hand.
    fn commit_and_push(&self, run: &mut PublishRun) -> Result<PublishOutcome, PublishFailure> {
        let commit_failure = |e: CommitError| PublishFailure {
            step: PublishStep::Committing,
            cause: PublishError::Commit(e),
        };

        let output = GitRepo::open(&self.target.output_path)
            .map_err(|e| commit_failure(e.into()))?;
        let status = output.status().map_err(|e| commit_failure(e.into()))?;

        if !status.is_dirty() {
            tracing::info!("No changes made to the blog!");
            return Ok(PublishOutcome::NoChanges);
        }

        let commit = step(run, PublishStep::Committing, || {
            if !status.deleted.is_empty() {
                tracing::warn!(
                    "Not staging {} deleted file(s): {}",
                    status.deleted.len(),
                    join_paths(&status.deleted)
                );
            }
            stage_and_commit(&output, &status.publishable(), self.commit_message().as_deref())
                .map_err(PublishError::Commit)
        })?;

        step(run, PublishStep::Pushing, || {
            output
                .push(&self.target.remote, &self.target.branch)
                .map_err(PublishError::Sync)
        })?;

        Ok(PublishOutcome::Published { commit })
    }

    fn commit_message(&self) -> Option<String> {
        self.target.commit_message.as_deref().map(expand_message)
    }
}

fn stage_and_commit(
    output: &GitRepo,
    files: &[PathBuf],
    message: Option<&str>,
) -> Result<String, CommitError> {
    output.add(files)?;
    if !output.has_staged_changes()? {
        return Err(CommitError::NothingStaged);
    }
    output.commit(message)?;
    Ok(output.head()?)
}

/// Publishes the production build by force-pushing a snapshot branch
pub struct BranchPublisher<'a, B: SiteBuilder + ?Sized> {
    parent_root: PathBuf,
    profile: ResolvedProfile,
    config: &'a ProjectConfig,
    builder: &'a B,
}

impl<'a, B: SiteBuilder + ?Sized> BranchPublisher<'a, B> {
    pub fn for_project(project: &'a Project, builder: &'a B) -> Self {
        Self {
            parent_root: project.root_path.clone(),
            profile: project.profile(BuildProfile::Production),
            config: &project.config,
            builder,
        }
    }

    pub fn publish(&self) -> Result<PublishReport, PublishFailure> {
        let mut run = PublishRun::new();
        let result = self.run_steps(&mut run);
        if let Err(failure) = &result {
            tracing::error!("{}", failure);
        }
        result
    }

    fn run_steps(&self, run: &mut PublishRun) -> Result<PublishReport, PublishFailure> {
        let publish = &self.config.publish;
        let output = self.profile.output.as_path();

        step(run, PublishStep::Resetting, || {
            resetter::reset_plain_directory(output).map_err(PublishError::Reset)
        })?;

        step(run, PublishStep::Building, || {
            self.builder.build(&self.profile).map_err(PublishError::Build)
        })?;

        let message = publish
            .commit_message
            .as_deref()
            .map(expand_message)
            .unwrap_or_else(|| expand_message("Publish site on {date}"));
        let parent = self.parent_root.as_path();

        let created = step(run, PublishStep::Committing, || {
            pages::import_tree(
                parent,
                output,
                &publish.github_pages_branch,
                &message,
                publish.site_domain.as_deref(),
            )
            .map_err(|e| PublishError::Commit(e.into()))
        })?;

        step(run, PublishStep::Pushing, || {
            push_branch(parent, publish).map_err(PublishError::Sync)
        })?;

        let outcome = match created {
            Some(commit) => PublishOutcome::Published { commit },
            None => {
                tracing::info!("No changes made to the blog!");
                PublishOutcome::NoChanges
            }
        };

        Ok(PublishReport {
            outcome,
            steps: run.visited().to_vec(),
            pointer_commits: 0,
        })
    }
}

fn push_branch(parent: &Path, publish: &PublishConfig) -> GitResult<()> {
    GitRepo::open(parent)?.force_push(
        &publish.github_pages_repo,
        &publish.github_pages_branch,
        &publish.github_pages_remote_branch,
    )
}

/// Enter `which`, run `f`, and tag any error with the step
fn step<T>(
    run: &mut PublishRun,
    which: PublishStep,
    f: impl FnOnce() -> Result<T, PublishError>,
) -> Result<T, PublishFailure> {
    run.enter(which);
    f().map_err(|cause| PublishFailure { step: which, cause })
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
