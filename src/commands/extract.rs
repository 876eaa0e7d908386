// src/commands/extract.rs

use crate::config::ExtractorConfig;
use crate::console::TerminalConsole;
use crate::extractor;
use crate::storage::{KeyValueStore, SnapshotStore};
use anyhow::{Context, Result};

pub fn handle_extract(storage: &str, cfg: &ExtractorConfig, raw: bool) -> Result<()> {
    let store = SnapshotStore::load(storage)?;
    o_debug!("Loaded {} entries from {}", store.length(), storage);

    if raw {
        let token = extractor::find_token(&store, cfg)
            .with_context(|| extractor::not_found_message(cfg))?;
        o_print!("{}", token); // no newline so scripts can capture it as-is
        return Ok(());
    }

    let mut console = TerminalConsole::new();
    extractor::extract_and_report(&store, &mut console, cfg);
    Ok(())
}
