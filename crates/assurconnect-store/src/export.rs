use crate::error::Result;
use crate::leads::LeadStore;
use crate::paths::restrict_file_permissions;
use assurconnect_core::time::{format_local_datetime, today_local};
use assurconnect_core::Lead;
use chrono::NaiveDate;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CSV_HEADER: &str = "ID,Type,Date,Status,Data";

/// Writes the header and one row per lead. The `Data` column is the payload
/// as JSON, always quoted, with inner quotes doubled.
pub fn write_csv<W: Write>(leads: &[Lead], writer: &mut W) -> Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for lead in leads {
        writeln!(
            writer,
            "{},{},{},{},{}",
            escape_field(&lead.id.to_string()),
            escape_field(lead.category.as_str()),
            escape_field(&format_local_datetime(&lead.created_at)),
            escape_field(lead.status.as_str()),
            quote_field(&lead.payload.to_json_string()),
        )?;
    }
    Ok(())
}

pub fn render_csv(leads: &[Lead]) -> Result<String> {
    let mut out = Vec::new();
    write_csv(leads, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("leads_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Snapshots the whole store into `dir/leads_export_<today>.csv`.
///
/// Returns `None` without touching the filesystem when there is nothing to
/// export.
pub fn export_to_csv(store: &LeadStore, dir: &Path) -> Result<Option<PathBuf>> {
    export_to_csv_dated(store, dir, today_local())
}

pub fn export_to_csv_dated(
    store: &LeadStore,
    dir: &Path,
    date: NaiveDate,
) -> Result<Option<PathBuf>> {
    let leads = store.list_all();
    if leads.is_empty() {
        debug!("no leads to export");
        return Ok(None);
    }

    let path = dir.join(export_filename(date));
    let file = File::create(&path)?;
    restrict_file_permissions(&path)?;
    let mut writer = BufWriter::new(file);
    write_csv(&leads, &mut writer)?;
    writer.flush()?;

    debug!(path = %path.display(), rows = leads.len(), "exported leads");
    Ok(Some(path))
}

fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(quote_field(value))
    } else {
        Cow::Borrowed(value)
    }
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
