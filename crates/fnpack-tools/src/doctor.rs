use std::fmt;

use fnpack_core::FnpackConfig;

use crate::executor::{RealExecutor, ToolExecutor};
use crate::tool::ToolCommand;

/// Checks that the configured external tools can be launched.
pub struct ToolDoctor<E: ToolExecutor = RealExecutor> {
    executor: E,
}

impl ToolDoctor<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for ToolDoctor<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ToolExecutor> ToolDoctor<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Run every check without early return.
    ///
    /// Project file checks (`config_file`, `manifest`, `source_dir`) are left
    /// at their defaults for the caller to fill in.
    pub async fn check(&self, config: &FnpackConfig) -> DoctorReport {
        DoctorReport {
            installer: self.probe(&config.install.program, "--version").await,
            archiver: self.probe(&config.archive.program, "-v").await,
            lister: self.probe(&config.archive.list_program, "-v").await,
            ..Default::default()
        }
    }

    async fn probe(&self, program: &str, version_flag: &str) -> ToolCheck {
        let cmd = ToolCommand::new(program).arg(version_flag);
        let result = match self.executor.exec(&cmd).await {
            Ok(out) => CheckResult::ok(first_meaningful_line(&out).unwrap_or("available")),
            Err(e) => CheckResult::fail(&e.to_string()),
        };
        ToolCheck {
            program: program.to_owned(),
            result,
        }
    }
}

fn first_meaningful_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|line| !line.is_empty())
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub installer: ToolCheck,
    pub archiver: ToolCheck,
    pub lister: ToolCheck,
    pub config_file: CheckResult,
    pub manifest: CheckResult,
    pub source_dir: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.tools_passed()
            && self.config_file.passed
            && self.manifest.passed
            && self.source_dir.passed
    }

    pub fn tools_passed(&self) -> bool {
        [&self.installer, &self.archiver, &self.lister]
            .iter()
            .all(|t| t.result.passed)
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tools")?;
        for (label, check) in [
            ("installer", &self.installer),
            ("archiver", &self.archiver),
            ("lister", &self.lister),
        ] {
            writeln!(
                f,
                "  [{}] {label:<10} {:<8} {}",
                check.result.icon(),
                check.program,
                check.result.detail
            )?;
        }
        writeln!(f, "Project")?;
        for (label, check) in [
            ("config", &self.config_file),
            ("manifest", &self.manifest),
            ("source", &self.source_dir),
        ] {
            writeln!(f, "  [{}] {label:<10} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ToolCheck {
    pub program: String,
    pub result: CheckResult,
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}
