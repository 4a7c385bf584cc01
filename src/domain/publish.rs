//! Publish workflow steps and run state.

use std::time::{Duration, Instant};

/// One step of the publish sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStep {
    Resetting,
    EnsuringSubmodule,
    Syncing,
    Building,
    Committing,
    Pushing,
    SyncingAgain,
}

impl PublishStep {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Resetting => "resetting output",
            Self::EnsuringSubmodule => "ensuring output submodule",
            Self::Syncing => "syncing output from remote",
            Self::Building => "building production site",
            Self::Committing => "committing output",
            Self::Pushing => "pushing output",
            Self::SyncingAgain => "recording published output in parent",
        }
    }

    /// Position in the fixed sequence
    fn ordinal(&self) -> u8 {
        match self {
            Self::Resetting => 0,
            Self::EnsuringSubmodule => 1,
            Self::Syncing => 2,
            Self::Building => 3,
            Self::Committing => 4,
            Self::Pushing => 5,
            Self::SyncingAgain => 6,
        }
    }
}

impl std::fmt::Display for PublishStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// What a finished publish achieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new output commit was pushed
    Published { commit: String },
    /// The rebuilt output matched what was already published
    NoChanges,
}

/// Tracks one publish run through the step sequence.
///
/// The terminal states are carried by the result of the run: a
/// [`PublishReport`] when it finished, a `PublishFailure` naming the step
/// when it did not.
#[derive(Debug, Clone)]
pub struct PublishRun {
    visited: Vec<PublishStep>,
    started_at: Instant,
}

impl Default for PublishRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishRun {
    pub fn new() -> Self {
        Self {
            visited: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn visited(&self) -> &[PublishStep] {
        &self.visited
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Enter `step`. Steps only move forward.
    pub fn enter(&mut self, step: PublishStep) {
        debug_assert!(
            self.visited
                .last()
                .map_or(true, |last| last.ordinal() < step.ordinal()),
            "step {step:?} out of order"
        );
        tracing::debug!("publish: {}", step);
        self.visited.push(step);
    }
}

/// Summary returned by a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub outcome: PublishOutcome,
    pub steps: Vec<PublishStep>,
    /// Submodule pointer commits created in the parent repository
    pub pointer_commits: u32,
}
