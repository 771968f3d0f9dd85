//! `patchrun entities` — print the static key → entity table.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use patchrun_core::EntityKey;

/// Arguments for `patchrun entities`.
#[derive(Args, Debug)]
pub struct EntitiesArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct EntityJson {
    key: &'static str,
    sync_entity: Option<&'static str>,
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "yaml key")]
    key: &'static str,
    #[tabled(rename = "sync entity")]
    entity: &'static str,
}

impl EntitiesArgs {
    pub fn run(self) -> Result<()> {
        if self.json {
            let rows: Vec<EntityJson> = EntityKey::all()
                .iter()
                .map(|k| EntityJson {
                    key: k.yaml_key(),
                    sync_entity: k.sync_entity(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        let rows: Vec<EntityRow> = EntityKey::all()
            .iter()
            .map(|k| EntityRow {
                key: k.yaml_key(),
                entity: k.sync_entity().unwrap_or("(server-only)"),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
