use std::path::Path;

use fnpack_core::ArchiveConfig;
use serde::Serialize;

use crate::executor::{RealExecutor, ToolExecutor};
use crate::tool::{ToolCommand, ToolError, path_arg};

/// One entry of a built archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// Path relative to the archive root; directories end with `/`
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
}

impl ArchiveEntry {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Capability: archive a directory into a file, and read the result back.
#[allow(async_fn_in_trait)]
pub trait Archiver: Send + Sync {
    /// Compress the contents of `source_dir` into `archive`. The archive
    /// root is `source_dir` itself; no enclosing directory is added.
    async fn create(&self, source_dir: &Path, archive: &Path) -> Result<(), ToolError>;

    /// List every entry of an existing archive.
    async fn list(&self, archive: &Path) -> Result<Vec<ArchiveEntry>, ToolError>;
}

/// Archives with `zip -r` run from inside the source directory, lists with
/// `unzip -l`.
pub struct ZipArchiver<E: ToolExecutor = RealExecutor> {
    executor: E,
    config: ArchiveConfig,
}

impl ZipArchiver<RealExecutor> {
    pub fn new(config: ArchiveConfig) -> Self {
        Self {
            executor: RealExecutor,
            config,
        }
    }
}

impl<E: ToolExecutor> ZipArchiver<E> {
    pub fn with_executor(executor: E, config: ArchiveConfig) -> Self {
        Self { executor, config }
    }

    /// Build the archive command without running it.
    ///
    /// The archive path is made absolute because the tool runs with
    /// `source_dir` as its working directory.
    pub fn create_command(
        &self,
        source_dir: &Path,
        archive: &Path,
    ) -> Result<ToolCommand, ToolError> {
        let archive = std::path::absolute(archive).map_err(|e| ToolError::ResolvePath {
            path: archive.to_path_buf(),
            source: e,
        })?;

        Ok(ToolCommand::new(&self.config.program)
            .args([
                "-r".to_owned(),
                "-q".to_owned(),
                path_arg(&archive)?,
                ".".to_owned(),
            ])
            .current_dir(source_dir))
    }

    pub fn list_command(&self, archive: &Path) -> Result<ToolCommand, ToolError> {
        Ok(ToolCommand::new(&self.config.list_program)
            .args(["-l".to_owned(), path_arg(archive)?]))
    }
}

impl<E: ToolExecutor> Archiver for ZipArchiver<E> {
    async fn create(&self, source_dir: &Path, archive: &Path) -> Result<(), ToolError> {
        let cmd = self.create_command(source_dir, archive)?;
        tracing::info!(archive = %archive.display(), "creating archive");
        self.executor.exec_streaming(&cmd).await
    }

    async fn list(&self, archive: &Path) -> Result<Vec<ArchiveEntry>, ToolError> {
        let cmd = self.list_command(archive)?;
        let output = self.executor.exec(&cmd).await?;
        parse_listing(&self.config.list_program, &output)
    }
}

/// Parse the table printed by `unzip -l`.
///
/// ```text
/// Archive:  function.zip
///   Length      Date    Time    Name
/// ---------  ---------- -----   ----
///        12  2024-05-01 10:00   app.py
/// ---------                     -------
///        12                     1 file
/// ```
pub fn parse_listing(program: &str, output: &str) -> Result<Vec<ArchiveEntry>, ToolError> {
    let unexpected = |detail: String| ToolError::UnexpectedOutput {
        program: program.to_owned(),
        detail,
    };

    let mut lines = output.lines();
    if !lines.by_ref().any(is_separator) {
        return Err(unexpected("missing listing header".to_owned()));
    }

    let mut entries = Vec::new();
    for line in lines {
        if is_separator(line) {
            return Ok(entries);
        }
        let entry = parse_entry(line)
            .map_err(|reason| unexpected(format!("bad entry line {line:?}: {reason}")))?;
        entries.push(entry);
    }

    Err(unexpected("listing ended without a footer".to_owned()))
}

fn is_separator(line: &str) -> bool {
    line.trim_start().starts_with("---")
}

/// `<length> <date> <time> <name>`; the name may contain spaces.
fn parse_entry(line: &str) -> Result<ArchiveEntry, String> {
    let mut rest = line.trim_start();
    let mut fields = [""; 3];
    for field in &mut fields {
        let end = rest
            .find(char::is_whitespace)
            .ok_or_else(|| "too few fields".to_owned())?;
        *field = &rest[..end];
        rest = rest[end..].trim_start();
    }

    let size = fields[0]
        .parse::<u64>()
        .map_err(|e| format!("invalid length {:?}: {e}", fields[0]))?;
    if rest.is_empty() {
        return Err("missing entry name".to_owned());
    }
    Ok(ArchiveEntry {
        name: rest.to_owned(),
        size,
    })
}
