use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use assurconnect_core::time::format_local_datetime;
use assurconnect_core::{Lead, LeadCategory};
use assurconnect_store::export_to_csv;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show one category (auto, home, health, pet, rc-pro)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory the CSV file is written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    output: Option<String>,
    rows: usize,
}

pub fn list_leads(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let leads = match args.category.as_deref() {
        Some(raw) => {
            let category: LeadCategory = raw
                .parse()
                .map_err(|_| invalid_input(format!("unknown category: {}", raw.trim())))?;
            ctx.store.list_by_category(category)
        }
        None => ctx.store.list_all(),
    };

    if ctx.json {
        return print_json(&leads);
    }

    if leads.is_empty() {
        println!("no leads");
        return Ok(());
    }
    for lead in &leads {
        println!("{}", summary_line(lead));
    }
    Ok(())
}

pub fn export_leads(ctx: &Context<'_>, args: ExportArgs) -> Result<()> {
    if !args.out_dir.is_dir() {
        return Err(invalid_input(format!(
            "export directory does not exist: {}",
            args.out_dir.display()
        )));
    }

    let rows = ctx.store.list_all().len();
    let written = export_to_csv(ctx.store, &args.out_dir)
        .with_context(|| format!("export leads to {}", args.out_dir.display()))?;

    if ctx.json {
        let report = ExportReport {
            output: written.as_ref().map(|path| path.display().to_string()),
            rows: if written.is_some() { rows } else { 0 },
        };
        return print_json(&report);
    }

    match written {
        Some(path) => println!("exported {} leads to {}", rows, path.display()),
        None => println!("nothing to export"),
    }
    Ok(())
}

fn summary_line(lead: &Lead) -> String {
    let name = [lead.payload.get_str("firstName"), lead.payload.get_str("lastName")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let name = if name.is_empty() { "(no name)" } else { &name };
    format!(
        "{}  {:<22}  {}  {:<9}  {}",
        lead.id,
        lead.category.as_str(),
        format_local_datetime(&lead.created_at),
        lead.status.as_str(),
        name
    )
}
