//! Task dispatch: one method per command the tool offers.

use crate::config::PublishMode;
use crate::domain::{BuildProfile, Project, PublishReport};
use crate::error::{ConfigError, Result};
use crate::services::{
    resetter, BranchPublisher, GeneratorCommand, PreviewServer, Publisher, ResetAction,
    SiteBuilder, StaticServer,
};

/// Application state: the project plus its external collaborators
pub struct App<B = GeneratorCommand, S = StaticServer> {
    pub project: Project,
    builder: B,
    server: S,
}

impl App {
    /// App using the configured generator and the built-in static server
    pub fn with_defaults(project: Project) -> Self {
        let builder = GeneratorCommand::new(&project.config.generator, project.root_path.clone());
        Self::new(project, builder, StaticServer::new())
    }
}

impl<B: SiteBuilder, S: PreviewServer> App<B, S> {
    pub fn new(project: Project, builder: B, server: S) -> Self {
        Self {
            project,
            builder,
            server,
        }
    }

    /// Remove generated development output
    pub fn clean(&self) -> Result<ResetAction> {
        let output = self.project.output_path(BuildProfile::Development);
        Ok(resetter::reset(&self.project.root_path, &output)?)
    }

    /// Build the local version of the site
    pub fn build(&self) -> Result<()> {
        let profile = self.project.profile(BuildProfile::Development);
        self.builder.build(&profile)?;
        tracing::info!("Site built in {}", profile.output.display());
        Ok(())
    }

    /// `clean` then `build`
    pub fn rebuild(&self) -> Result<()> {
        self.clean()?;
        self.build()
    }

    /// Rebuild on every content change; the generator does the watching
    pub fn regenerate(&self) -> Result<()> {
        let profile = self.project.profile(BuildProfile::Development);
        self.builder.regenerate(&profile)?;
        Ok(())
    }

    /// Build the production version of the site
    pub fn preview(&self) -> Result<()> {
        let profile = self.project.profile(BuildProfile::Production);
        self.builder.build(&profile)?;
        tracing::info!("Production site built in {}", profile.output.display());
        Ok(())
    }

    /// Publish the production site using the configured mode
    pub fn publish(&self, message: Option<String>) -> Result<PublishReport> {
        let mut project = self.project.clone();
        if message.is_some() {
            project.config.publish.commit_message = message;
        }
        if project.config.publish.github_pages_repo.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "publish.github_pages_repo must name the remote to publish to".into(),
            )
            .into());
        }

        let report = match project.config.publish.mode {
            PublishMode::Submodule => Publisher::for_project(&project, &self.builder).publish()?,
            PublishMode::Branch => BranchPublisher::for_project(&project, &self.builder).publish()?,
        };
        Ok(report)
    }

    /// Serve the development output over HTTP
    pub async fn serve(&self, host: &str, port: u16) -> Result<()> {
        let root = self.project.output_path(BuildProfile::Development);
        self.server.serve(&root, host, port).await?;
        Ok(())
    }

    /// `build`, then `serve`
    pub async fn reserve(&self, host: &str, port: u16) -> Result<()> {
        self.build()?;
        self.serve(host, port).await
    }
}
