//! Configuration management for pagesync.
//!
//! Supports layered configuration: defaults → project → user → explicit file → env

use crate::domain::BuildProfile;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = "pagesync.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub serve: ServeConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub profile: ProfilesConfig,
}

impl ProjectConfig {
    /// Load configuration with hierarchy: defaults → project → user → explicit → env
    pub fn load(
        project_root: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (pagesync.toml in project root)
        if let Some(root) = project_root {
            let project_config = root.join(PROJECT_CONFIG_FILE);
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/pagesync/config.toml)
        if let Some(config_dir) = directories::ProjectDirs::from("com", "pagesync", "pagesync") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. File named on the command line must exist
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // 5. Environment variables (PAGESYNC__*)
        builder = builder.add_source(
            Environment::with_prefix("PAGESYNC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.deploy_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("paths.deploy_path is empty".into()));
        }
        if self.publish.github_pages_remote_branch.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "publish.github_pages_remote_branch is empty".into(),
            ));
        }
        if self.publish.submodule_name.trim().is_empty() {
            return Err(ConfigError::Invalid("publish.submodule_name is empty".into()));
        }
        for (name, profile) in [
            ("development", &self.profile.development),
            ("production", &self.profile.production),
        ] {
            if let Some(bad) = profile.extra.iter().find(|e| split_setting(e).is_none()) {
                return Err(ConfigError::Invalid(format!(
                    "profile.{name}.extra entry {bad:?} is not KEY=VALUE"
                )));
            }
        }
        Ok(())
    }

    /// Resolve the settings for one build profile.
    ///
    /// Production is layered over development, so every development key is
    /// present in the production result unless production overrides it.
    pub fn resolve_profile(&self, profile: BuildProfile) -> ResolvedProfile {
        let dev = &self.profile.development;
        let mut resolved = ResolvedProfile {
            profile,
            settings: dev.settings.clone(),
            output: dev
                .output
                .clone()
                .unwrap_or_else(|| self.paths.deploy_path.clone()),
            extra: dev
                .extra_settings()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };

        if profile == BuildProfile::Production {
            let prod = &self.profile.production;
            resolved.settings = prod.settings.clone();
            if let Some(output) = &prod.output {
                resolved.output = output.clone();
            }
            for (key, value) in prod.extra_settings() {
                resolved.extra.insert(key.to_string(), value.to_string());
            }
        }

        resolved
    }
}

/// Filesystem layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where build output lands (relative to project root)
    #[serde(default = "default_deploy_path")]
    pub deploy_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            deploy_path: default_deploy_path(),
        }
    }
}

fn default_deploy_path() -> PathBuf {
    PathBuf::from("output")
}

/// How the production output reaches the hosting remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Output directory is a submodule that is committed and pushed
    #[default]
    Submodule,
    /// Output tree is snapshotted onto a local branch and force-pushed
    Branch,
}

/// Publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub mode: PublishMode,
    /// Remote repository receiving the published site
    #[serde(default)]
    pub github_pages_repo: String,
    /// Name the output submodule is registered under
    #[serde(default = "default_submodule_name")]
    pub submodule_name: String,
    /// Local staging branch used by branch mode
    #[serde(default = "default_pages_branch")]
    pub github_pages_branch: String,
    /// Branch on the remote that receives the published site
    #[serde(default = "default_remote_branch")]
    pub github_pages_remote_branch: String,
    /// Remote name inside the output repository
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Message for output commits; `None` opens the editor
    #[serde(default)]
    pub commit_message: Option<String>,
    /// Message for submodule pointer commits in the parent
    #[serde(default = "default_pointer_message")]
    pub pointer_message: String,
    /// Custom domain written to CNAME in branch mode
    #[serde(default)]
    pub site_domain: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: PublishMode::default(),
            github_pages_repo: String::new(),
            submodule_name: default_submodule_name(),
            github_pages_branch: default_pages_branch(),
            github_pages_remote_branch: default_remote_branch(),
            remote: default_remote(),
            commit_message: None,
            pointer_message: default_pointer_message(),
            site_domain: None,
        }
    }
}

fn default_submodule_name() -> String {
    "output".to_string()
}

fn default_pages_branch() -> String {
    "gh-pages".to_string()
}

fn default_remote_branch() -> String {
    "master".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_pointer_message() -> String {
    "Updated output to latest version in remote".to_string()
}

/// Preview server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// External generator invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Generator executable
    #[serde(default = "default_program")]
    pub program: String,
    /// Flag that puts the generator in its own watch-and-rebuild mode
    #[serde(default = "default_watch_flag")]
    pub watch_flag: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            watch_flag: default_watch_flag(),
        }
    }
}

fn default_program() -> String {
    "pelican".to_string()
}

fn default_watch_flag() -> String {
    "--autoreload".to_string()
}

/// Per-profile generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesConfig {
    #[serde(default = "default_development")]
    pub development: ProfileConfig,
    #[serde(default = "default_production")]
    pub production: ProfileConfig,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            development: default_development(),
            production: default_production(),
        }
    }
}

fn default_development() -> ProfileConfig {
    ProfileConfig::with_settings("pelicanconf.py")
}

fn default_production() -> ProfileConfig {
    ProfileConfig::with_settings("publishconf.py")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Generator settings file (relative to project root)
    pub settings: PathBuf,
    /// Output directory override for this profile
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Extra generator settings, each `KEY=VALUE`
    #[serde(default)]
    pub extra: Vec<String>,
}

impl ProfileConfig {
    fn with_settings(settings: &str) -> Self {
        Self {
            settings: PathBuf::from(settings),
            output: None,
            extra: Vec::new(),
        }
    }

    fn extra_settings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extra.iter().filter_map(|entry| split_setting(entry))
    }
}

fn split_setting(entry: &str) -> Option<(&str, &str)> {
    let (key, value) = entry.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// A build profile with development defaults folded in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub profile: BuildProfile,
    pub settings: PathBuf,
    pub output: PathBuf,
    pub extra: BTreeMap<String, String>,
}
