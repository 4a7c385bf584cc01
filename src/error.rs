//! Unified error types for pagesync.

use crate::domain::PublishStep;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Serve error: {0}")]
    Serve(#[from] ServeError),

    #[error(transparent)]
    Publish(#[from] PublishFailure),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Git operation errors
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("Failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Path is outside the repository: {0}")]
    OutsideRepository(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the external site generator
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to launch generator {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator {program} exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("Generator settings file not found: {0}")]
    SettingsNotFound(PathBuf),
}

/// Preview server errors
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Nothing to serve, directory does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("Cannot resolve listen address {0}")]
    Address(String),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors committing the output repository
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Nothing staged for commit")]
    NothingStaged,

    #[error(transparent)]
    Rejected(#[from] GitError),
}

/// Failure classes of the publish workflow
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("reset failed: {0}")]
    Reset(#[source] GitError),

    #[error("submodule registration failed: {0}")]
    SubmoduleRegistration(#[source] GitError),

    #[error("sync failed: {0}")]
    Sync(#[source] GitError),

    #[error("build failed: {0}")]
    Build(#[source] BuildError),

    #[error("commit failed: {0}")]
    Commit(#[source] CommitError),
}

/// A publish error tagged with the step that raised it
#[derive(Debug, Error)]
#[error("publish failed while {step}: {cause}")]
pub struct PublishFailure {
    pub step: PublishStep,
    #[source]
    pub cause: PublishError,
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for Git operations
pub type GitResult<T> = std::result::Result<T, GitError>;
