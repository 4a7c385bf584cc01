//! pagesync: build, preview and publish a static blog.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagesync::cli::{Cli, Commands};
use pagesync::domain::{Project, PublishOutcome};
use pagesync::{App, ProjectConfig};

/// Initialize logging with RUST_LOG environment variable support
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Run blocking git/generator work off the async runtime
async fn blocking<T, F>(app: &Arc<App>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&App) -> pagesync::Result<T> + Send + 'static,
{
    let app = Arc::clone(app);
    let result = tokio::task::spawn_blocking(move || f(&app))
        .await
        .context("task panicked")?;
    Ok(result?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    // Find project root
    let project_root = match &cli.project {
        Some(dir) => dir.clone(),
        None => Project::discover(None).context("not inside a git repository")?,
    };
    let project_root = project_root
        .canonicalize()
        .with_context(|| format!("project root {} not found", project_root.display()))?;

    let config = ProjectConfig::load(Some(&project_root), cli.config.as_deref())?;
    tracing::debug!("Using project at {:?}", project_root);

    let serve_defaults = config.serve.clone();
    let app = Arc::new(App::with_defaults(Project::new(project_root, config)));

    match cli.command {
        Commands::Clean => {
            let action = blocking(&app, |app| app.clean()).await?;
            tracing::debug!("clean: {:?}", action);
        }
        Commands::Build => blocking(&app, |app| app.build()).await?,
        Commands::Rebuild => blocking(&app, |app| app.rebuild()).await?,
        Commands::Regenerate => blocking(&app, |app| app.regenerate()).await?,
        Commands::Preview => blocking(&app, |app| app.preview()).await?,
        Commands::Serve(args) => {
            let host = args.host.unwrap_or(serve_defaults.host);
            let port = args.port.unwrap_or(serve_defaults.port);
            tokio::select! {
                res = app.serve(&host, port) => res?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl+C, shutting down");
                }
            }
        }
        Commands::Reserve(args) => {
            let host = args.host.unwrap_or(serve_defaults.host);
            let port = args.port.unwrap_or(serve_defaults.port);
            tokio::select! {
                res = app.reserve(&host, port) => res?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received Ctrl+C, shutting down");
                }
            }
        }
        Commands::Publish { message } => {
            let report = blocking(&app, move |app| app.publish(message)).await?;
            match report.outcome {
                PublishOutcome::Published { commit } => {
                    tracing::info!(
                        "Published {} ({} pointer commit(s) in parent)",
                        commit,
                        report.pointer_commits
                    );
                }
                PublishOutcome::NoChanges => tracing::info!("Nothing new to publish"),
            }
        }
    }

    Ok(())
}
