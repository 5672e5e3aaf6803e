use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use docs_sync::load_config::{load_config, CREDENTIAL_ENV, REPOSITORY_ENV};

/// A static config plus the repository slug from the environment produces a
/// fully merged PublishConfig with a constructed clone URL.
#[tokio::test]
#[serial]
async fn test_load_config_success_injects_env() {
    let config_yaml = r#"
build:
  generator: pdoc
  package: mypackage
  output_dir: ./build/docs
publish:
  branch: gh-pages
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var(CREDENTIAL_ENV, "top-secret-test-token");
    env::set_var(REPOSITORY_ENV, "example/mypackage");

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.build.generator, "pdoc");
    assert_eq!(config.build.package, "mypackage");
    assert_eq!(config.build.output_dir, PathBuf::from("./build/docs"));
    assert!(config.build.extra_args.is_empty());

    assert_eq!(config.target.branch, "gh-pages");
    assert!(!config.target.clean);
    assert!(config.target.commit_message.is_none());

    assert_eq!(config.remote, "https://github.com/example/mypackage.git");
    assert_eq!(config.credential.as_deref(), Some("top-secret-test-token"));
}

/// Without an explicit remote, the repository slug is required.
#[tokio::test]
#[serial]
async fn test_load_config_errors_on_missing_repository() {
    let config_yaml = r#"
build:
  generator: pdoc
  package: mypackage
  output_dir: ./build/docs
publish:
  branch: gh-pages
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var(CREDENTIAL_ENV, "token");
    env::remove_var(REPOSITORY_ENV);

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains(REPOSITORY_ENV),
        "Must error for missing env var, got: {err}"
    );
}

#[tokio::test]
#[serial]
async fn test_load_config_rejects_malformed_slug() {
    let config_yaml = r#"
build:
  generator: pdoc
  package: mypackage
  output_dir: ./build/docs
publish:
  branch: gh-pages
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var(CREDENTIAL_ENV, "token");
    env::set_var(REPOSITORY_ENV, "not a slug");

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains("owner/name"),
        "Must reject malformed slug, got: {err}"
    );
}

/// An explicit remote makes the slug unnecessary; non-GitHub remotes work.
#[tokio::test]
#[serial]
async fn test_load_config_explicit_remote_skips_slug() {
    let config_yaml = r#"
build:
  generator: pdoc
  package: mypackage
  output_dir: ./build/docs
publish:
  branch: gh-pages
  remote: /srv/git/docs.git
  clean: true
  commit_message: release docs
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var(CREDENTIAL_ENV, "token");
    env::remove_var(REPOSITORY_ENV);

    let config = load_config(config_file.path()).expect("Config should load");
    assert_eq!(config.remote, "/srv/git/docs.git");
    assert!(config.target.clean);
    assert_eq!(config.target.commit_message.as_deref(), Some("release docs"));
}

/// An empty credential counts as unset; the loader does not fail, the
/// pipeline's gate decides later.
#[tokio::test]
#[serial]
async fn test_load_config_empty_credential_is_none() {
    let config_yaml = r#"
build:
  generator: pdoc
  package: mypackage
  output_dir: ./build/docs
publish:
  branch: gh-pages
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var(CREDENTIAL_ENV, "");
    env::set_var(REPOSITORY_ENV, "example/mypackage");

    let config = load_config(config_file.path()).expect("Config should load");
    assert!(config.credential.is_none());
}

/// If the config file is not valid YAML, load_config reports a parse error.
#[tokio::test]
#[serial]
async fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    env::set_var(CREDENTIAL_ENV, "present-but-unused");
    env::set_var(REPOSITORY_ENV, "example/mypackage");

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}
