//! Project entity representing the content repository context.

use super::BuildProfile;
use crate::config::{ProjectConfig, ResolvedProfile};
use std::path::{Path, PathBuf};

/// Represents the content repository and its configuration
#[derive(Debug, Clone)]
pub struct Project {
    /// Repository root path
    pub root_path: PathBuf,
    /// Loaded configuration
    pub config: ProjectConfig,
}

/// Everything the publish workflow needs to know about where output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Name the output submodule is registered under
    pub submodule_name: String,
    /// Remote repository URL receiving the published site
    pub remote_url: String,
    /// Absolute path of the output directory
    pub output_path: PathBuf,
    /// Remote name inside the output repository
    pub remote: String,
    /// Branch that is pulled from and pushed to
    pub branch: String,
    /// Output commit message; `None` commits interactively
    pub commit_message: Option<String>,
    /// Message for pointer commits in the parent
    pub pointer_message: String,
}

impl Project {
    /// Create a new Project from a root path and configuration
    pub fn new(root_path: PathBuf, config: ProjectConfig) -> Self {
        Self { root_path, config }
    }

    /// Discover the project root by walking up from current directory
    pub fn discover(start_path: Option<PathBuf>) -> Option<PathBuf> {
        let start = start_path
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let mut current = start.as_path();
        loop {
            // Check for .git directory or file (submodule checkout)
            let git_path = current.join(".git");
            if git_path.exists() {
                return Some(current.to_path_buf());
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Resolve a profile with paths made absolute against the project root
    pub fn profile(&self, profile: BuildProfile) -> ResolvedProfile {
        let mut resolved = self.config.resolve_profile(profile);
        resolved.settings = self.absolute(&resolved.settings);
        resolved.output = self.absolute(&resolved.output);
        resolved
    }

    /// Absolute output directory for a profile
    pub fn output_path(&self, profile: BuildProfile) -> PathBuf {
        self.profile(profile).output
    }

    /// The submodule publish target, built from the production profile
    pub fn publish_target(&self) -> PublishTarget {
        let publish = &self.config.publish;
        PublishTarget {
            submodule_name: publish.submodule_name.clone(),
            remote_url: publish.github_pages_repo.clone(),
            output_path: self.output_path(BuildProfile::Production),
            remote: publish.remote.clone(),
            branch: publish.github_pages_remote_branch.clone(),
            commit_message: publish.commit_message.clone(),
            pointer_message: publish.pointer_message.clone(),
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_path.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_paths() {
        let config = ProjectConfig::default();
        let project = Project::new(PathBuf::from("/tmp/blog"), config);

        assert_eq!(project.root_path, PathBuf::from("/tmp/blog"));
        assert_eq!(
            project.output_path(BuildProfile::Development),
            PathBuf::from("/tmp/blog/output")
        );
        assert_eq!(
            project.profile(BuildProfile::Production).settings,
            PathBuf::from("/tmp/blog/publishconf.py")
        );
    }

    #[test]
    fn test_publish_target() {
        let mut config = ProjectConfig::default();
        config.publish.github_pages_repo = "git@example.com:me/me.github.io.git".into();
        config.profile.production.output = Some(PathBuf::from("/srv/site"));
        let project = Project::new(PathBuf::from("/tmp/blog"), config);

        let target = project.publish_target();
        assert_eq!(target.submodule_name, "output");
        assert_eq!(target.remote_url, "git@example.com:me/me.github.io.git");
        assert_eq!(target.output_path, PathBuf::from("/srv/site"));
        assert_eq!(target.remote, "origin");
        assert_eq!(target.branch, "master");
        assert_eq!(
            target.pointer_message,
            "Updated output to latest version in remote"
        );
    }

    #[test]
    fn test_discover_walks_up() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let nested = temp.path().join("content/posts");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            Project::discover(Some(nested)),
            Some(temp.path().to_path_buf())
        );
    }
}
