//! pagesync: build, preview and publish a static blog
//!
//! This crate drives an external static-site generator and keeps a
//! separately versioned output repository, nested as a git submodule of
//! the content repository, in step with its hosting remote.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

#[cfg(test)]
mod test_helpers;

pub use app::App;
pub use config::ProjectConfig;
pub use error::{AppError, Result};
