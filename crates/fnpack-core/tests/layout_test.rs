use std::path::PathBuf;

use fnpack_core::{FnpackConfig, ProjectLayout, discover_root};
use tempfile::TempDir;

#[test]
fn layout_places_staging_and_archive_under_output_dir() {
    let tmp = TempDir::new().unwrap();
    let layout = ProjectLayout::new(tmp.path(), &FnpackConfig::default());

    assert_eq!(layout.root, tmp.path());
    assert_eq!(layout.manifest, tmp.path().join("requirements.txt"));
    assert_eq!(layout.source_dir, tmp.path().join("handlers"));
    assert_eq!(layout.output_dir, tmp.path().join("dist"));
    assert!(layout.staging_dir.starts_with(&layout.output_dir));
    assert!(layout.archive_path.starts_with(&layout.output_dir));
    assert_eq!(layout.exclude, vec!["__pycache__"]);
}

#[test]
fn layout_honours_configured_names() {
    let mut config = FnpackConfig::default();
    config.paths.output_dir = PathBuf::from("build/out");
    config.paths.staging_dir = "stage".to_owned();
    config.paths.archive = "lambda.zip".to_owned();

    let layout = ProjectLayout::new(std::path::Path::new("/project"), &config);

    assert_eq!(layout.staging_dir, PathBuf::from("/project/build/out/stage"));
    assert_eq!(
        layout.archive_path,
        PathBuf::from("/project/build/out/lambda.zip")
    );
}

#[test]
fn discover_root_finds_nearest_config() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("fnpack.toml"), "").unwrap();
    let nested = tmp.path().join("handlers/resources");
    std::fs::create_dir_all(&nested).unwrap();

    assert_eq!(discover_root(&nested), tmp.path());
}

#[test]
fn discover_root_falls_back_to_start() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("a/b");
    std::fs::create_dir_all(&nested).unwrap();

    // No fnpack.toml anywhere below the temp dir; ancestors above it are
    // outside our control, so only assert when none of them has one.
    let root = discover_root(&nested);
    if !root.starts_with(tmp.path()) {
        return;
    }
    assert_eq!(root, nested);
}
