//! Infrastructure services for pagesync.
//!
//! This module contains:
//! - GitRepo: Per-operation git repository handle
//! - inspector: Submodule and repository detection
//! - resetter: Clearing generated output
//! - submodule: Registering and syncing the output submodule
//! - publisher: The publish workflows (submodule and branch)
//! - builder / server: External generator and preview server seams

pub mod builder;
mod git;
pub mod inspector;
mod pages;
pub mod publisher;
pub mod resetter;
pub mod server;
pub mod submodule;

pub use builder::{GeneratorCommand, SiteBuilder};
pub use git::{GitRepo, Submodule};
pub use publisher::{BranchPublisher, Publisher};
pub use resetter::ResetAction;
pub use server::{PreviewServer, StaticServer};
pub use submodule::{EnsureAction, SyncOutcome};
