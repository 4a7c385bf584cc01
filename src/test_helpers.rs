//! Throwaway git repositories for unit tests.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Once;
use tempfile::TempDir;

static GIT_ENV: Once = Once::new();

/// Make git usable from tests: identity, no signing, local file transport.
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
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// A repository on branch `master` with one commit
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("blog");
    std::fs::create_dir(&path).unwrap();

    git(&path, &["init", "-b", "master"]);
    std::fs::write(path.join("README.md"), "# Test").unwrap();
    git(&path, &["add", "."]);
    git(&path, &["commit", "-m", "Initial commit"]);

    (temp, path)
}

/// A bare remote seeded with `index.html` on `master`, created under `dir`
pub fn create_remote(dir: &Path) -> PathBuf {
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

    remote
}
