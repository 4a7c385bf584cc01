//! Site generator invocation.
//!
//! The generator is an external program; this module only decides its
//! arguments and reports its exit status.

use crate::config::{GeneratorConfig, ResolvedProfile};
use crate::error::BuildError;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Turns content into a rendered output tree
#[cfg_attr(test, mockall::automock)]
pub trait SiteBuilder {
    /// Build once with `profile`, writing into `profile.output`
    fn build(&self, profile: &ResolvedProfile) -> Result<(), BuildError>;

    /// Build, then keep rebuilding on content changes until interrupted
    fn regenerate(&self, profile: &ResolvedProfile) -> Result<(), BuildError>;
}

/// Runs the configured generator program (pelican by default)
#[derive(Debug, Clone)]
pub struct GeneratorCommand {
    program: String,
    watch_flag: String,
    working_dir: PathBuf,
}

impl GeneratorCommand {
    pub fn new(config: &GeneratorConfig, working_dir: PathBuf) -> Self {
        Self {
            program: config.program.clone(),
            watch_flag: config.watch_flag.clone(),
            working_dir,
        }
    }

    /// Command line arguments for one invocation
    pub fn args(&self, profile: &ResolvedProfile, watch: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if watch && !self.watch_flag.is_empty() {
            args.push(self.watch_flag.clone().into());
        }
        args.push("-s".into());
        args.push(profile.settings.clone().into_os_string());
        args.push("-o".into());
        args.push(profile.output.clone().into_os_string());
        for (key, value) in &profile.extra {
            args.push("-e".into());
            args.push(format!("{}={}", key, value).into());
        }
        args
    }

    fn run(&self, profile: &ResolvedProfile, watch: bool) -> Result<(), BuildError> {
        if !profile.settings.exists() {
            return Err(BuildError::SettingsNotFound(profile.settings.clone()));
        }

        let args = self.args(profile, watch);
        tracing::info!(
            "Building {} site with {} {}",
            profile.profile,
            self.program,
            display_args(&args)
        );

        // Inherit stdio so the generator's own diagnostics reach the operator
        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| BuildError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::Failed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

impl SiteBuilder for GeneratorCommand {
    fn build(&self, profile: &ResolvedProfile) -> Result<(), BuildError> {
        self.run(profile, false)
    }

    fn regenerate(&self, profile: &ResolvedProfile) -> Result<(), BuildError> {
        self.run(profile, true)
    }
}

fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuildProfile;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    fn profile(dir: &Path, settings: &str) -> ResolvedProfile {
        let mut extra = BTreeMap::new();
        extra.insert("SITEURL".to_string(), "\"https://blog.example.com\"".to_string());
        ResolvedProfile {
            profile: BuildProfile::Production,
            settings: dir.join(settings),
            output: dir.join("output"),
            extra,
        }
    }

    #[test]
    fn test_args_layout() {
        let temp = TempDir::new().unwrap();
        let generator = GeneratorCommand::new(&GeneratorConfig::default(), temp.path().into());
        let profile = profile(temp.path(), "publishconf.py");

        let args = generator.args(&profile, false);
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into()).collect();
        assert_eq!(args[0], "-s");
        assert!(args[1].ends_with("publishconf.py"));
        assert_eq!(args[2], "-o");
        assert!(args[3].ends_with("output"));
        assert_eq!(args[4], "-e");
        assert_eq!(args[5], "SITEURL=\"https://blog.example.com\"");

        let watched = generator.args(&profile, true);
        assert_eq!(watched[0], OsString::from("--autoreload"));
    }

    #[test]
    fn test_missing_settings_file() {
        let temp = TempDir::new().unwrap();
        let generator = GeneratorCommand::new(&GeneratorConfig::default(), temp.path().into());

        let err = generator.build(&profile(temp.path(), "nope.py")).unwrap_err();
        assert!(matches!(err, BuildError::SettingsNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_generator_exit_status_propagates() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("publishconf.py"), "").unwrap();
        let config = GeneratorConfig {
            program: "false".to_string(),
            watch_flag: String::new(),
        };
        let generator = GeneratorCommand::new(&config, temp.path().into());

        let err = generator.build(&profile(temp.path(), "publishconf.py")).unwrap_err();
        assert!(matches!(err, BuildError::Failed { program, .. } if program == "false"));
    }

    #[test]
    fn test_unknown_program_fails_to_spawn() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("publishconf.py"), "").unwrap();
        let config = GeneratorConfig {
            program: "pagesync-no-such-generator".to_string(),
            watch_flag: String::new(),
        };
        let generator = GeneratorCommand::new(&config, temp.path().into());

        let err = generator.build(&profile(temp.path(), "publishconf.py")).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }
}
