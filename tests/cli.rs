use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

/// Creates a minimal config file pointing at an explicit (unreachable) remote
/// so the loader never needs the repository slug from the environment.
fn create_minimal_config(root: &Path) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        format!(
            "build:\n  generator: \"true\"\n  package: demo\n  output_dir: {}\npublish:\n  branch: gh-pages\n  remote: \"https://github.com/example/example.git\"\n",
            root.join("out").display()
        ),
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn publish_without_credential_exits_12() {
    let root = TempDir::new().expect("tempdir");
    let config = create_minimal_config(root.path());
    let mut cmd = Command::cargo_bin("docs-sync").expect("Binary exists");

    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .env_remove("PAGES_PUSH_TOKEN");

    // The gate must fire before any clone, commit or push is attempted.
    cmd.assert().failure().code(12);
}

#[test]
fn publish_with_empty_credential_exits_12() {
    let root = TempDir::new().expect("tempdir");
    let config = create_minimal_config(root.path());
    let mut cmd = Command::cargo_bin("docs-sync").expect("Binary exists");

    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .env("PAGES_PUSH_TOKEN", "");

    cmd.assert().failure().code(12);
}

#[test]
fn invalid_config_fails_with_generic_error() {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), b"not-yaml: [:::").expect("Writing temp config failed");
    let mut cmd = Command::cargo_bin("docs-sync").expect("Binary exists");

    cmd.arg("publish")
        .arg("--config")
        .arg(config.path())
        .env("PAGES_PUSH_TOKEN", "dummy-token");

    // Config failures are ordinary failures, not the credential gate.
    cmd.assert().failure().code(1);
}

#[test]
fn help_lists_publish_command() {
    let mut cmd = Command::cargo_bin("docs-sync").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("publish"));
}

/// Full round trip against a local bare repository: first run publishes one
/// commit, second run with identical output publishes nothing.
#[cfg(unix)]
#[test]
fn publish_round_trip_with_local_remote() {
    use std::os::unix::fs::PermissionsExt;

    let root = TempDir::new().expect("tempdir");
    let empty_global = root.path().join("gitconfig");
    write(&empty_global, b"").expect("global config fixture");

    let git = |cwd: Option<&Path>, args: &[&str]| {
        let mut c = std::process::Command::new("git");
        if let Some(cwd) = cwd {
            c.arg("-C").arg(cwd);
        }
        c.env("GIT_CONFIG_GLOBAL", &empty_global)
            .env("GIT_CONFIG_SYSTEM", "/dev/null");
        let status = c.args(args).status().expect("git runs");
        assert!(status.success(), "git {:?} failed", args);
    };

    // Seed a bare remote whose gh-pages branch holds one commit.
    let seed = root.path().join("seed");
    let bare = root.path().join("origin.git");
    git(None, &["init", "-b", "gh-pages", seed.to_str().unwrap()]);
    write(seed.join("index.html"), b"<html>v1</html>").expect("seed file");
    git(Some(&seed), &["add", "-A"]);
    git(
        Some(&seed),
        &[
            "-c",
            "user.name=Seeder",
            "-c",
            "user.email=seeder@example.com",
            "commit",
            "-m",
            "seed",
        ],
    );
    git(None, &["init", "--bare", "-b", "gh-pages", bare.to_str().unwrap()]);
    git(Some(&seed), &["push", bare.to_str().unwrap(), "gh-pages"]);

    // Fake generator: writes a site that differs from the seeded branch.
    let generator = root.path().join("gen.sh");
    write(
        &generator,
        b"#!/bin/sh\n# args: -o <output_dir> <package>\nout=\"$2\"\nmkdir -p \"$out\"\nprintf '<html>v2</html>' > \"$out/index.html\"\n",
    )
    .expect("generator script");
    std::fs::set_permissions(&generator, std::fs::Permissions::from_mode(0o755))
        .expect("chmod generator");

    let config = NamedTempFile::new().expect("temp config");
    write(
        config.path(),
        format!(
            "build:\n  generator: {}\n  package: demo\n  output_dir: {}\npublish:\n  branch: gh-pages\n  remote: {}\n",
            generator.display(),
            root.path().join("out").display(),
            bare.display()
        ),
    )
    .expect("write config");

    let run = || {
        let mut cmd = Command::cargo_bin("docs-sync").expect("Binary exists");
        cmd.arg("publish")
            .arg("--config")
            .arg(config.path())
            .env("PAGES_PUSH_TOKEN", "dummy-token")
            .env("GIT_CONFIG_GLOBAL", &empty_global)
            .env("GIT_CONFIG_SYSTEM", "/dev/null");
        cmd
    };

    // First run: the built output differs from the branch, one commit lands.
    run()
        .assert()
        .success()
        .stdout(predicate::str::contains("Publish complete").and(predicate::str::contains("Published")));

    let count = std::process::Command::new("git")
        .arg("-C")
        .arg(&bare)
        .args(["rev-list", "--count", "gh-pages"])
        .output()
        .expect("rev-list runs");
    assert_eq!(String::from_utf8_lossy(&count.stdout).trim(), "2");

    // Second run: identical output, no new commit.
    run()
        .assert()
        .success()
        .stdout(predicate::str::contains("NoChanges"));

    let count = std::process::Command::new("git")
        .arg("-C")
        .arg(&bare)
        .args(["rev-list", "--count", "gh-pages"])
        .output()
        .expect("rev-list runs");
    assert_eq!(String::from_utf8_lossy(&count.stdout).trim(), "2");
}
