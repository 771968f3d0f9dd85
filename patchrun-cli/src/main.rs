//! patchrun — apply a content patch through the `dsl` tool and sync the client.
//!
//! # Usage
//!
//! ```text
//! patchrun [--root <dir>] migrate <patch> [--dry-run] [--skip-sync] [--verbose] [--strict-order]
//! patchrun [--root <dir>] plan <patch> [--json] [--strict-order]
//! patchrun entities [--json]
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{entities::EntitiesArgs, migrate::MigrateArgs, plan::PlanArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "patchrun",
    version,
    about = "Apply every spec of a content patch and sync the affected entities",
    long_about = None,
)]
struct Cli {
    /// Project root containing `reforged/` (and, by default, the `dsl` binary).
    #[arg(long, global = true, env = "PATCHRUN_ROOT", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply all specs of a patch, then sync touched client entities.
    Migrate(MigrateArgs),

    /// Show the ordered specs of a patch and the entities they touch.
    Plan(PlanArgs),

    /// Print the YAML key → sync entity table.
    Entities(EntitiesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate(args) => args.run(&resolve_root(&cli.root)?),
        Commands::Plan(args) => args.run(&resolve_root(&cli.root)?).map(|()| ExitCode::SUCCESS),
        Commands::Entities(args) => args.run().map(|()| ExitCode::SUCCESS),
    }
}

fn resolve_root(root: &std::path::Path) -> Result<PathBuf> {
    let resolved = root
        .canonicalize()
        .with_context(|| format!("cannot resolve project root '{}'", root.display()))?;
    tracing::debug!(root = %resolved.display(), "project root");
    Ok(resolved)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
