//! `patchrun plan <patch>` — preview the run order without invoking dsl.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use patchrun_core::{layout, PatchName};
use patchrun_sync::pipeline::{self, MigrateOptions, MigrationTarget, Plan};

/// Arguments for `patchrun plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Patch folder name under reforged/specs/patches/.
    pub patch: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Refuse to plan when a root-level spec has no numeric prefix.
    #[arg(long)]
    pub strict_order: bool,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "spec")]
    spec: String,
    #[tabled(rename = "client entities")]
    client: String,
    #[tabled(rename = "server-only")]
    server_only: String,
}

impl PlanArgs {
    pub fn run(self, root: &Path) -> Result<()> {
        // The plan needs no tool paths, so `.references` is not required here.
        let patch = PatchName::from(self.patch);
        let target = MigrationTarget {
            patch_dir: layout::patch_dir(root, &patch),
            patch,
            server_datasheet: Default::default(),
            sync_config: None,
        };
        let options = MigrateOptions {
            strict_order: self.strict_order,
            ..Default::default()
        };

        let plan = pipeline::plan(&target, &options)
            .with_context(|| format!("cannot plan patch '{}'", target.patch))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
            return Ok(());
        }
        print_table(&plan);
        Ok(())
    }
}

fn print_table(plan: &Plan) {
    let rows: Vec<PlanRow> = plan
        .specs
        .iter()
        .enumerate()
        .map(|(i, planned)| PlanRow {
            index: i + 1,
            spec: planned.spec.relative.clone(),
            client: dash_if_empty(planned.entities.client.iter().copied()),
            server_only: dash_if_empty(planned.entities.server_only.iter().copied()),
        })
        .collect();

    println!("{}", format!("Patch {}", plan.patch).bold());
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for planned in &plan.specs {
        if let Some(warning) = &planned.warning {
            println!("{} {}: {warning}", "!".yellow().bold(), planned.spec);
        }
    }

    if plan.entities.has_client_entities() {
        println!(
            "Would sync: {}",
            plan.entities.client.iter().copied().collect::<Vec<_>>().join(", ")
        );
    } else {
        println!("No syncable entities — sync would be skipped");
    }
}

fn dash_if_empty<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined = names.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}
