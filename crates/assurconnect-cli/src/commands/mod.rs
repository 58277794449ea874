use crate::notify::Notifier;
use anyhow::Result;
use assurconnect_store::LeadStore;
use serde::Serialize;
use std::io::{self, Write};

pub mod completions;
pub mod leads;
pub mod submit;

pub struct Context<'a> {
    pub store: &'a LeadStore,
    pub json: bool,
    pub notifier: Option<&'a dyn Notifier>,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
