use std::path::Path;

use fnpack_core::{InstallConfig, Manifest};

use crate::executor::{RealExecutor, ToolExecutor};
use crate::tool::{ToolCommand, ToolError, path_arg};

/// Capability: install the dependencies a manifest lists into a directory.
///
/// Implementations must place packages directly in `target`, never in a
/// nested location, so the runtime can import them from the archive root.
#[allow(async_fn_in_trait)]
pub trait DependencyInstaller: Send + Sync {
    async fn install(&self, manifest: &Manifest, target: &Path) -> Result<(), ToolError>;
}

/// Installs with `pip install --requirement <manifest> --target <dir>`.
///
/// pip's own output is streamed to the terminal so resolution failures
/// reach the operator verbatim.
pub struct PipInstaller<E: ToolExecutor = RealExecutor> {
    executor: E,
    config: InstallConfig,
}

impl PipInstaller<RealExecutor> {
    pub fn new(config: InstallConfig) -> Self {
        Self {
            executor: RealExecutor,
            config,
        }
    }
}

impl<E: ToolExecutor> PipInstaller<E> {
    pub fn with_executor(executor: E, config: InstallConfig) -> Self {
        Self { executor, config }
    }

    /// Build the install command without running it.
    pub fn command(&self, manifest: &Path, target: &Path) -> Result<ToolCommand, ToolError> {
        let mut cmd = ToolCommand::new(&self.config.program).args([
            "install".to_owned(),
            "--requirement".to_owned(),
            path_arg(manifest)?,
            "--target".to_owned(),
            path_arg(target)?,
            "--disable-pip-version-check".to_owned(),
        ]);

        if let Some(platform) = &self.config.platform {
            cmd = cmd.args(["--platform", platform.as_str()]);
        }
        if let Some(version) = &self.config.python_version {
            cmd = cmd.args(["--python-version", version.as_str()]);
        }
        // pip refuses cross-platform resolution unless it may only use wheels
        if self.config.platform.is_some() || self.config.python_version.is_some() {
            cmd = cmd.arg("--only-binary=:all:");
        }

        Ok(cmd.args(self.config.extra_args.iter().cloned()))
    }
}

impl<E: ToolExecutor> DependencyInstaller for PipInstaller<E> {
    async fn install(&self, manifest: &Manifest, target: &Path) -> Result<(), ToolError> {
        let cmd = self.command(&manifest.path, target)?;
        tracing::info!(
            specifiers = manifest.specifiers().len(),
            target = %target.display(),
            "installing dependencies"
        );
        self.executor.exec_streaming(&cmd).await
    }
}
