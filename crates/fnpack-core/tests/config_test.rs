use std::path::PathBuf;

use fnpack_core::{Error, FnpackConfig};
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = FnpackConfig::load(tmp.path()).unwrap();

    assert_eq!(config.paths.manifest, PathBuf::from("requirements.txt"));
    assert_eq!(config.paths.source_dir, PathBuf::from("handlers"));
    assert_eq!(config.paths.output_dir, PathBuf::from("dist"));
    assert_eq!(config.paths.staging_dir, "package");
    assert_eq!(config.paths.archive, "function.zip");
    assert_eq!(config.paths.exclude, vec!["__pycache__"]);
    assert_eq!(config.install.program, "pip");
    assert!(config.install.platform.is_none());
    assert!(config.install.python_version.is_none());
    assert!(config.install.extra_args.is_empty());
    assert_eq!(config.archive.program, "zip");
    assert_eq!(config.archive.list_program, "unzip");
    assert_eq!(config.archive.preview_entries, 20);
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[paths]
manifest = "deps/requirements.txt"
source_dir = "src/handlers"
output_dir = "build"
staging_dir = "stage"
archive = "lambda.zip"
exclude = ["__pycache__", ".pytest_cache"]

[install]
program = "pip3"
platform = "manylinux2014_x86_64"
python_version = "3.12"
extra_args = ["--no-compile"]

[archive]
program = "/usr/bin/zip"
list_program = "/usr/bin/unzip"
preview_entries = 5
"#;
    std::fs::write(tmp.path().join("fnpack.toml"), toml).unwrap();

    let config = FnpackConfig::load(tmp.path()).unwrap();

    assert_eq!(config.paths.manifest, PathBuf::from("deps/requirements.txt"));
    assert_eq!(config.paths.source_dir, PathBuf::from("src/handlers"));
    assert_eq!(config.paths.output_dir, PathBuf::from("build"));
    assert_eq!(config.paths.staging_dir, "stage");
    assert_eq!(config.paths.archive, "lambda.zip");
    assert_eq!(config.paths.exclude, vec!["__pycache__", ".pytest_cache"]);
    assert_eq!(config.install.program, "pip3");
    assert_eq!(
        config.install.platform.as_deref(),
        Some("manylinux2014_x86_64")
    );
    assert_eq!(config.install.python_version.as_deref(), Some("3.12"));
    assert_eq!(config.install.extra_args, vec!["--no-compile"]);
    assert_eq!(config.archive.program, "/usr/bin/zip");
    assert_eq!(config.archive.list_program, "/usr/bin/unzip");
    assert_eq!(config.archive.preview_entries, 5);
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[paths]
source_dir = "src"
"#;
    std::fs::write(tmp.path().join("fnpack.toml"), toml).unwrap();

    let config = FnpackConfig::load(tmp.path()).unwrap();

    assert_eq!(config.paths.source_dir, PathBuf::from("src"));
    assert_eq!(config.paths.manifest, PathBuf::from("requirements.txt"));
    assert_eq!(config.install.program, "pip");
    assert_eq!(config.archive.preview_entries, 20);
}

#[test]
fn load_empty_file_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("fnpack.toml"), "").unwrap();

    let config = FnpackConfig::load(tmp.path()).unwrap();
    assert_eq!(config.paths.output_dir, PathBuf::from("dist"));
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("fnpack.toml"), "[paths\nbroken").unwrap();

    let err = FnpackConfig::load(tmp.path()).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }));
}

#[test]
fn load_rejects_output_dir_containing_source() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[paths]
output_dir = "handlers"
"#;
    std::fs::write(tmp.path().join("fnpack.toml"), toml).unwrap();

    let err = FnpackConfig::load(tmp.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPath {
            field: "source_dir",
            ..
        }
    ));
    assert!(err.to_string().contains("deleted on every build"));
}

#[test]
fn load_rejects_output_dir_nested_in_source() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[paths]
output_dir = "handlers/dist"
"#;
    std::fs::write(tmp.path().join("fnpack.toml"), toml).unwrap();

    let err = FnpackConfig::load(tmp.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPath {
            field: "output_dir",
            ..
        }
    ));
}

#[test]
fn load_rejects_absolute_manifest() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[paths]
manifest = "/etc/requirements.txt"
"#;
    std::fs::write(tmp.path().join("fnpack.toml"), toml).unwrap();

    let err = FnpackConfig::load(tmp.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidPath { field: "manifest", .. }));
}
