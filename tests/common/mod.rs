//! Shared fixtures: a bare "hosting" remote, a content repository, and fakes
//! for the external generator and preview server.

#![allow(dead_code)]

use async_trait::async_trait;
use pagesync::config::ResolvedProfile;
use pagesync::domain::{BuildProfile, PublishTarget};
use pagesync::error::{BuildError, ServeError};
use pagesync::services::{PreviewServer, SiteBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use tempfile::TempDir;

static GIT_ENV: Once = Once::new();

pub fn init_git_env() {
    GIT_ENV.call_once(|| {
        let settings = [
            ("protocol.file.allow", "always"),
            ("commit.gpgsign", "false"),
        ];
        std::env::set_var("GIT_CONFIG_COUNT", settings.len().to_string());
        for (i, (key, value)) in settings.iter().enumerate() {
            std::env::set_var(format!("GIT_CONFIG_KEY_{i}"), key);
            std::env::set_var(format!("GIT_CONFIG_VALUE_{i}"), value);
        }
        std::env::set_var("GIT_AUTHOR_NAME", "Test");
        std::env::set_var("GIT_AUTHOR_EMAIL", "test@test.com");
        std::env::set_var("GIT_COMMITTER_NAME", "Test");
        std::env::set_var("GIT_COMMITTER_EMAIL", "test@test.com");
    });
}

/// Run git in `dir`, panicking with stderr on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    init_git_env();
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} in {} failed: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn commit_count(dir: &Path) -> u32 {
    git(dir, &["rev-list", "--count", "HEAD"]).trim().parse().unwrap()
}

/// Files on `master` of the bare remote, sorted
pub fn remote_files(remote: &Path) -> Vec<String> {
    git(remote, &["ls-tree", "-r", "--name-only", "master"])
        .lines()
        .map(str::to_string)
        .collect()
}

pub struct Fixture {
    _temp: TempDir,
    pub dir: PathBuf,
    /// Bare repository standing in for the hosting remote
    pub remote: PathBuf,
    /// Content repository
    pub parent: PathBuf,
}

impl Fixture {
    /// Remote seeded with `index.html`; parent with one commit and no submodule
    pub fn new() -> Self {
        init_git_env();
        let temp = TempDir::new().unwrap();
        let dir = temp.path().canonicalize().unwrap();

        let remote = dir.join("site.git");
        std::fs::create_dir(&remote).unwrap();
        git(&remote, &["init", "--bare", "-b", "master"]);

        let seed = dir.join("seed");
        std::fs::create_dir(&seed).unwrap();
        git(&seed, &["init", "-b", "master"]);
        std::fs::write(seed.join("index.html"), "<h1>home</h1>").unwrap();
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "-m", "Seed site"]);
        git(&seed, &["push", remote.to_str().unwrap(), "master"]);

        let parent = dir.join("blog");
        std::fs::create_dir(&parent).unwrap();
        git(&parent, &["init", "-b", "master"]);
        std::fs::write(parent.join("pelicanconf.py"), "AUTHOR = 'Test'\n").unwrap();
        git(&parent, &["add", "."]);
        git(&parent, &["commit", "-m", "Initial commit"]);

        Self {
            _temp: temp,
            dir,
            remote,
            parent,
        }
    }

    /// Fixture whose parent already tracks the remote as submodule `output`
    pub fn with_submodule() -> Self {
        let fixture = Self::new();
        git(
            &fixture.parent,
            &[
                "submodule",
                "add",
                "-b",
                "master",
                "--name",
                "output",
                fixture.remote.to_str().unwrap(),
                "output",
            ],
        );
        git(&fixture.parent, &["commit", "-m", "Add output submodule"]);
        fixture
    }

    pub fn output(&self) -> PathBuf {
        self.parent.join("output")
    }

    pub fn target(&self) -> PublishTarget {
        PublishTarget {
            submodule_name: "output".to_string(),
            remote_url: self.remote.to_string_lossy().into_owned(),
            output_path: self.output(),
            remote: "origin".to_string(),
            branch: "master".to_string(),
            commit_message: Some("Publish site".to_string()),
            pointer_message: "Updated output to latest version in remote".to_string(),
        }
    }

    pub fn production(&self) -> ResolvedProfile {
        ResolvedProfile {
            profile: BuildProfile::Production,
            settings: self.parent.join("publishconf.py"),
            output: self.output(),
            extra: BTreeMap::new(),
        }
    }

    /// Push a commit to the remote from an unrelated clone
    pub fn push_external_change(&self, file: &str, contents: &str) {
        let clone = self.dir.join(format!("external-{}", file.replace('/', "-")));
        git(
            &self.dir,
            &["clone", self.remote.to_str().unwrap(), clone.to_str().unwrap()],
        );
        std::fs::write(clone.join(file), contents).unwrap();
        git(&clone, &["add", "."]);
        git(&clone, &["commit", "-m", "External change"]);
        git(&clone, &["push", "origin", "master"]);
    }
}

/// Generator stand-in that runs a closure against the output directory
pub struct FakeBuilder<F> {
    render: F,
    calls: AtomicUsize,
}

impl<F: Fn(&Path)> FakeBuilder<F> {
    pub fn new(render: F) -> Self {
        Self {
            render,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F: Fn(&Path)> SiteBuilder for FakeBuilder<F> {
    fn build(&self, profile: &ResolvedProfile) -> Result<(), BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::create_dir_all(&profile.output).unwrap();
        (self.render)(&profile.output);
        Ok(())
    }

    fn regenerate(&self, profile: &ResolvedProfile) -> Result<(), BuildError> {
        self.build(profile)
    }
}

/// Writes `files` into the output directory
pub fn writes(files: &'static [(&'static str, &'static str)]) -> impl Fn(&Path) {
    move |out: &Path| {
        for (name, contents) in files {
            let path = out.join(name);
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).unwrap();
            }
            std::fs::write(path, contents).unwrap();
        }
    }
}

/// Preview server that never listens
pub struct NoServer;

#[async_trait]
impl PreviewServer for NoServer {
    async fn serve(&self, _root: &Path, _host: &str, _port: u16) -> Result<(), ServeError> {
        Ok(())
    }
}
