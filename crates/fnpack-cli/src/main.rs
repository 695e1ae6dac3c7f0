mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fnpack",
    about = "Package serverless function handlers into flat deployable archives"
)]
#[command(version)]
struct Cli {
    /// Project root (default: nearest directory containing fnpack.toml)
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, install dependencies, assemble source, and archive (default)
    Build {
        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the output directory
    Clean,
    /// Verify and summarize the existing archive
    Inspect {
        /// Print the archive report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check tools and project inputs
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let project_dir = cli.project_dir.as_deref();

    match cli.command.unwrap_or(Commands::Build { json: false }) {
        Commands::Build { json } => commands::build(project_dir, json).await?,
        Commands::Clean => commands::clean(project_dir)?,
        Commands::Inspect { json } => commands::inspect(project_dir, json).await?,
        Commands::Doctor => commands::doctor(project_dir).await?,
    }

    Ok(())
}
