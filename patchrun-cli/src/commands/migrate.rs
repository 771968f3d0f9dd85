//! `patchrun migrate <patch>` — apply every spec, then sync the client.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use patchrun_core::{references, PatchName, SpecFile};
use patchrun_detector::DetectedEntities;
use patchrun_sync::{
    discover::count_by_category,
    pipeline::{self, MigrateOptions, MigrationTarget, RunObserver},
    ApplyResult, MigrationReport, ProcessDsl, SkipReason, SpecOutcome, SyncOutcome,
};

/// Arguments for `patchrun migrate`.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Patch folder name under reforged/specs/patches/.
    pub patch: String,

    /// Pass --dry-run to dsl apply and dsl sync.
    #[arg(long)]
    pub dry_run: bool,

    /// Apply specs only, skip client sync.
    #[arg(long)]
    pub skip_sync: bool,

    /// Show full dsl output and list failed specs.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Refuse to run when a root-level spec has no numeric prefix.
    #[arg(long)]
    pub strict_order: bool,
}

impl MigrateArgs {
    pub fn run(self, root: &Path) -> Result<ExitCode> {
        let refs = references::load_at(root).context("failed to load project references")?;
        let target = MigrationTarget::resolve(root, PatchName::from(self.patch), &refs);
        let options = MigrateOptions {
            dry_run: self.dry_run,
            skip_sync: self.skip_sync,
            strict_order: self.strict_order,
        };

        let mut tool = ProcessDsl::new(&refs.dsl_cli, root);
        let mut printer = Printer {
            verbose: self.verbose,
            dry_run: self.dry_run,
        };
        let report = pipeline::run(&mut tool, &target, &options, &mut printer)
            .with_context(|| format!("migration of patch '{}' failed", target.patch))?;

        print_sync_result(&report, self.verbose);
        Ok(if report.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// Streams progress to stdout as the pipeline advances.
struct Printer {
    verbose: bool,
    dry_run: bool,
}

impl RunObserver for Printer {
    fn run_started(&mut self, patch: &PatchName, specs: &[SpecFile]) {
        let (root_count, loot_count) = count_by_category(specs);
        let mut parts = Vec::new();
        if root_count > 0 {
            parts.push(format!("{root_count} specs"));
        }
        if loot_count > 0 {
            parts.push(format!("{loot_count} loot specs"));
        }
        println!(
            "{} — {} ({} total)",
            format!("Patch {patch}").bold(),
            parts.join(" + "),
            specs.len()
        );
        if self.dry_run {
            println!("{}", "(dry-run mode)".yellow());
        }
        println!();
    }

    fn spec_started(&mut self, index: usize, total: usize, spec: &SpecFile) {
        println!("[{index}/{total}] {spec}");
    }

    fn spec_finished(&mut self, outcome: &SpecOutcome) {
        match &outcome.result {
            ApplyResult::Applied { summary, output } => {
                if self.verbose && !output.is_empty() {
                    for line in output.lines() {
                        println!("        {line}");
                    }
                } else {
                    let summary = summary.as_deref().unwrap_or("Applied");
                    println!("        {} {summary}", "✓".green());
                }
            }
            ApplyResult::Failed { message } => {
                let mut lines = message.lines();
                let brief = lines.next().unwrap_or("Unknown error");
                println!("        {} Failed — {brief}", "✗".red());
                if self.verbose {
                    for line in lines {
                        println!("          {line}");
                    }
                }
            }
        }
    }

    fn applies_finished(&mut self, outcomes: &[SpecOutcome], entities: &DetectedEntities) {
        let failed: Vec<&SpecOutcome> = outcomes
            .iter()
            .filter(|o| !o.result.is_applied())
            .collect();
        let applied = outcomes.len() - failed.len();

        println!();
        println!("{}", "── Summary ──".bold());
        let fail_note = if failed.is_empty() {
            String::new()
        } else {
            format!(" ({} failed)", failed.len())
        };
        println!("Applied: {applied} specs{fail_note}");
        if self.verbose {
            for outcome in &failed {
                println!("  {} {}", "✗".red(), outcome.spec);
            }
        }

        for outcome in outcomes {
            if let Some(warning) = &outcome.warning {
                println!("{} {}: {warning}", "!".yellow().bold(), outcome.spec);
            }
        }

        if entities.has_client_entities() {
            println!("Entities modified: {}", join(&entities.client));
        }
        if !entities.server_only.is_empty() {
            println!(
                "Server-only: {} (no sync needed)",
                join(&entities.server_only)
            );
        }
    }

    fn sync_started(&mut self, entities: &[&'static str]) {
        println!();
        println!("{}", "── Client Sync ──".bold());
        println!("Syncing: {}", entities.join(", "));
    }
}

fn print_sync_result(report: &MigrationReport, verbose: bool) {
    match &report.sync {
        SyncOutcome::Skipped {
            reason: SkipReason::Requested,
        } => println!("\nSync skipped (--skip-sync)"),
        SyncOutcome::Skipped {
            reason: SkipReason::NothingToSync,
        } => println!("\nNo syncable entities — nothing to sync"),
        SyncOutcome::Completed { output } => {
            println!("{} Sync complete", "✓".green());
            if verbose {
                for line in output.lines() {
                    println!("  {line}");
                }
            }
        }
        SyncOutcome::Failed { message } => {
            println!("{} Sync failed — {message}", "✗".red());
        }
    }
}

fn join<'a>(names: impl IntoIterator<Item = &'a &'static str>) -> String {
    names.into_iter().copied().collect::<Vec<_>>().join(", ")
}
