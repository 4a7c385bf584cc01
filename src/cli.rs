//! Command line definition.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pagesync", version, about = "Build, preview and publish a static blog")]
pub struct Cli {
    /// Project root (defaults to the enclosing git repository)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Extra configuration file, applied over pagesync.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (repeat for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove generated files
    Clean,
    /// Build local version of site
    Build,
    /// `clean` then `build`
    Rebuild,
    /// Automatically regenerate site upon file modification
    Regenerate,
    /// Serve the built site locally
    Serve(ServeArgs),
    /// `build`, then `serve`
    Reserve(ServeArgs),
    /// Build production version of site
    Preview,
    /// Publish the production site to the hosting remote
    Publish {
        /// Output commit message (`{date}` expands to today)
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port to listen on (default from config, 8000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind (default from config, 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,
}

impl Cli {
    /// Default tracing filter implied by -v/-q
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
