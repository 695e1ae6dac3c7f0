use std::path::Path;

use fnpack_build::VerifyError;
use fnpack_build::report;
use fnpack_tools::ZipArchiver;

pub async fn inspect(project_dir: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let project = super::load_project(project_dir)?;
    let archiver = ZipArchiver::new(project.config.archive.clone());

    let report = report::inspect(
        &archiver,
        &project.layout.archive_path,
        project.config.archive.preview_entries,
    )
    .await
    .map_err(|e| match e {
        VerifyError::Missing(path) => anyhow::anyhow!(
            "no archive at {}; run `fnpack build` first",
            path.display()
        ),
        other => anyhow::Error::new(other),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
