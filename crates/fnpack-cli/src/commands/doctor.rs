use std::path::Path;

use fnpack_core::{CONFIG_FILE, FnpackConfig, Manifest, ManifestStatus, ProjectLayout};
use fnpack_tools::{CheckResult, ToolDoctor};

pub async fn doctor(project_dir: Option<&Path>) -> anyhow::Result<()> {
    let root = super::project_root(project_dir)?;

    // Keep diagnosing with defaults when fnpack.toml is broken
    let (config, config_check) = match FnpackConfig::load(&root) {
        Ok(config) if root.join(CONFIG_FILE).exists() => (config, CheckResult::ok("Found")),
        Ok(config) => (config, CheckResult::ok("Not found, using defaults")),
        Err(e) => (FnpackConfig::default(), CheckResult::fail(&format!("{e:#}"))),
    };
    let layout = ProjectLayout::new(&root, &config);

    let mut report = ToolDoctor::new().check(&config).await;
    report.config_file = config_check;

    report.manifest = match Manifest::load(&layout.manifest) {
        Ok(manifest) => match manifest.status {
            ManifestStatus::Absent => {
                CheckResult::fail(&format!("{} not found", layout.manifest.display()))
            }
            ManifestStatus::Vacuous => CheckResult::ok("present, no dependencies"),
            ManifestStatus::Actionable { specifiers } => {
                CheckResult::ok(&format!("{} specifier(s)", specifiers.len()))
            }
        },
        Err(e) => CheckResult::fail(&e.to_string()),
    };

    report.source_dir = if layout.source_dir.is_dir() {
        CheckResult::ok(&layout.source_dir.display().to_string())
    } else {
        CheckResult::fail(&format!("{} not found", layout.source_dir.display()))
    };

    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(())
}
