use std::path::{Path, PathBuf};

use fnpack_core::{ArchiveConfig, FnpackConfig, InstallConfig, Manifest, ManifestStatus};
use fnpack_tools::archiver::{Archiver, ZipArchiver};
use fnpack_tools::doctor::ToolDoctor;
use fnpack_tools::executor::ToolExecutor;
use fnpack_tools::installer::{DependencyInstaller, PipInstaller};
use fnpack_tools::tool::{ToolCommand, ToolError};
use mockall::mock;

mock! {
    Executor {}

    impl ToolExecutor for Executor {
        async fn exec(&self, cmd: &ToolCommand) -> Result<String, ToolError>;
        async fn exec_streaming(&self, cmd: &ToolCommand) -> Result<(), ToolError>;
    }
}

fn actionable_manifest() -> Manifest {
    Manifest {
        path: PathBuf::from("/srv/app/requirements.txt"),
        status: ManifestStatus::Actionable {
            specifiers: vec!["requests==2.31.0".to_owned()],
        },
    }
}

fn failed(program: &str) -> ToolError {
    ToolError::CommandFailed {
        program: program.to_owned(),
        args: vec![],
        detail: "exit status: 1".to_owned(),
    }
}

// ── Installer Tests ──

#[tokio::test]
async fn pip_installs_into_target_root() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|cmd| {
            cmd.program == "pip"
                && cmd.args[0] == "install"
                && cmd.args.windows(2).any(|w| {
                    w[0] == "--requirement" && w[1] == "/srv/app/requirements.txt"
                })
                && cmd
                    .args
                    .windows(2)
                    .any(|w| w[0] == "--target" && w[1] == "/srv/app/dist/package")
        })
        .times(1)
        .returning(|_| Ok(()));

    let installer = PipInstaller::with_executor(mock, InstallConfig::default());
    installer
        .install(&actionable_manifest(), Path::new("/srv/app/dist/package"))
        .await
        .unwrap();
}

#[tokio::test]
async fn pip_default_command_has_no_platform_flags() {
    let installer = PipInstaller::with_executor(MockExecutor::new(), InstallConfig::default());
    let cmd = installer
        .command(Path::new("requirements.txt"), Path::new("dist/package"))
        .unwrap();

    assert!(!cmd.has_arg("--platform"));
    assert!(!cmd.has_arg("--only-binary=:all:"));
    assert!(cmd.current_dir.is_none());
}

#[tokio::test]
async fn pip_platform_restricts_to_binary_wheels() {
    let config = InstallConfig {
        platform: Some("manylinux2014_x86_64".to_owned()),
        python_version: Some("3.12".to_owned()),
        extra_args: vec!["--no-compile".to_owned()],
        ..Default::default()
    };
    let installer = PipInstaller::with_executor(MockExecutor::new(), config);
    let cmd = installer
        .command(Path::new("requirements.txt"), Path::new("dist/package"))
        .unwrap();

    let rendered = cmd.to_string();
    assert!(rendered.contains("--platform manylinux2014_x86_64"));
    assert!(rendered.contains("--python-version 3.12"));
    assert!(cmd.has_arg("--only-binary=:all:"));
    assert_eq!(cmd.args.last().map(String::as_str), Some("--no-compile"));
}

#[tokio::test]
async fn pip_uses_configured_program() {
    let config = InstallConfig {
        program: "pip3".to_owned(),
        ..Default::default()
    };
    let installer = PipInstaller::with_executor(MockExecutor::new(), config);
    let cmd = installer
        .command(Path::new("requirements.txt"), Path::new("out"))
        .unwrap();
    assert_eq!(cmd.program, "pip3");
}

#[tokio::test]
async fn pip_failure_is_propagated_unchanged() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming().returning(|_| Err(failed("pip")));

    let installer = PipInstaller::with_executor(mock, InstallConfig::default());
    let err = installer
        .install(&actionable_manifest(), Path::new("/tmp/stage"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ToolError::CommandFailed { ref program, .. } if program == "pip"
    ));
}

// ── Archiver Tests ──

#[tokio::test]
async fn zip_runs_from_inside_staging_dir() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming()
        .withf(|cmd| {
            cmd.program == "zip"
                && cmd.current_dir.as_deref() == Some(Path::new("/srv/app/dist/package"))
                && cmd.args == ["-r", "-q", "/srv/app/dist/function.zip", "."]
        })
        .times(1)
        .returning(|_| Ok(()));

    let archiver = ZipArchiver::with_executor(mock, ArchiveConfig::default());
    archiver
        .create(
            Path::new("/srv/app/dist/package"),
            Path::new("/srv/app/dist/function.zip"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn zip_makes_relative_archive_path_absolute() {
    let archiver = ZipArchiver::with_executor(MockExecutor::new(), ArchiveConfig::default());
    let cmd = archiver
        .create_command(Path::new("dist/package"), Path::new("dist/function.zip"))
        .unwrap();

    let archive_arg = PathBuf::from(&cmd.args[2]);
    assert!(archive_arg.is_absolute());
    assert!(archive_arg.ends_with("dist/function.zip"));
}

#[tokio::test]
async fn zip_failure_is_reported() {
    let mut mock = MockExecutor::new();
    mock.expect_exec_streaming().returning(|_| Err(failed("zip")));

    let archiver = ZipArchiver::with_executor(mock, ArchiveConfig::default());
    let result = archiver
        .create(Path::new("/tmp/stage"), Path::new("/tmp/out.zip"))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn list_parses_unzip_output() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|cmd| cmd.program == "unzip" && cmd.args == ["-l", "/tmp/out.zip"])
        .returning(|_| {
            Ok("Archive:  /tmp/out.zip\n  Length      Date    Time    Name\n\
                ---------  ---------- -----   ----\n\
                \x20      5  2024-05-01 10:00   a\n\
                \x20      0  2024-05-01 10:00   b/\n\
                \x20      3  2024-05-01 10:00   b/c\n\
                ---------                     -------\n\
                \x20      8                     3 files\n"
                .to_owned())
        });

    let archiver = ZipArchiver::with_executor(mock, ArchiveConfig::default());
    let entries = archiver.list(Path::new("/tmp/out.zip")).await.unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a", "b/", "b/c"]);
    assert_eq!(entries[0].size, 5);
}

#[tokio::test]
async fn list_of_corrupt_archive_fails() {
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(|_| {
        Err(ToolError::CommandFailed {
            program: "unzip".to_owned(),
            args: vec![],
            detail: "exit status: 9: End-of-central-directory signature not found".to_owned(),
        })
    });

    let archiver = ZipArchiver::with_executor(mock, ArchiveConfig::default());
    let err = archiver.list(Path::new("/tmp/out.zip")).await.unwrap_err();

    assert!(err.to_string().contains("unzip failed"));
}

// ── Doctor Tests ──

#[tokio::test]
async fn doctor_all_tools_present() {
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(|cmd| {
        Ok(match cmd.program.as_str() {
            "pip" => "pip 24.0 from /usr/lib/python3/dist-packages/pip (python 3.12)\n".to_owned(),
            "zip" => "\nCopyright (c) 1990-2008 Info-ZIP\nThis is Zip 3.0\n".to_owned(),
            _ => "UnZip 6.00 of 20 April 2009\n".to_owned(),
        })
    });

    let doctor = ToolDoctor::with_executor(mock);
    let report = doctor.check(&FnpackConfig::default()).await;

    assert!(report.tools_passed());
    assert!(report.installer.result.detail.starts_with("pip 24.0"));
    assert_eq!(report.archiver.result.detail, "Copyright (c) 1990-2008 Info-ZIP");
    assert_eq!(report.lister.program, "unzip");
}

#[tokio::test]
async fn doctor_reports_missing_tool_without_stopping() {
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(|cmd| {
        if cmd.program == "zip" {
            Err(ToolError::NotFound {
                program: "zip".to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        } else {
            Ok("ok\n".to_owned())
        }
    });

    let doctor = ToolDoctor::with_executor(mock);
    let report = doctor.check(&FnpackConfig::default()).await;

    assert!(!report.tools_passed());
    assert!(report.installer.result.passed);
    assert!(!report.archiver.result.passed);
    assert!(report.archiver.result.detail.contains("not found"));
    assert!(report.lister.result.passed);
    assert!(!report.all_passed());
}
