// src/commands/keys.rs

use crate::config::ExtractorConfig;
use crate::extractor::{self, EntryOutcome};
use crate::storage::{KeyValueStore, SnapshotStore};
use anyhow::Result;
use colored::Colorize;

/// List marker keys and what each one holds. Token values are never printed.
pub fn handle_keys(storage: &str, cfg: &ExtractorConfig) -> Result<()> {
    let store = SnapshotStore::load(storage)?;

    o_step!(
        "Scanning {} entries for keys containing '{}'...",
        store.length(),
        cfg.marker.cyan()
    );

    let matches: Vec<(String, EntryOutcome)> = extractor::inspect_all(&store, cfg)
        .into_iter()
        .filter(|(_, outcome)| *outcome != EntryOutcome::KeyMismatch)
        .collect();

    if matches.is_empty() {
        o_warn!("{}", "No matching keys.".yellow());
    }

    let mut with_token = 0;
    for (key, outcome) in &matches {
        let label = match outcome {
            EntryOutcome::Found(_) => {
                with_token += 1;
                outcome.label().green()
            }
            _ => outcome.label().yellow(),
        };
        o_detail!("  {}  {}", label, key);
    }

    o_result!(
        "{} matching key(s), {} with {}",
        matches.len(),
        with_token,
        cfg.field_path_display().bold()
    );
    Ok(())
}
