//! Domain entities for pagesync.
//!
//! This module contains the core entities:
//! - Project: The content repository and its resolved configuration
//! - BuildProfile: Development vs. production generator settings
//! - OutputStatus: Working tree status of the output repository
//! - Publish: Publish steps, run tracking and report

mod profile;
mod project;
mod publish;
mod status;

pub use profile::BuildProfile;
pub use project::{Project, PublishTarget};
pub use publish::{PublishOutcome, PublishReport, PublishRun, PublishStep};
pub use status::OutputStatus;
