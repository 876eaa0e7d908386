// src/storage.rs

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

/// Read side of the Web Storage API, enumerable by index.
///
/// Order is whatever the host enumerates; callers must not assume sorting.
pub trait KeyValueStore {
    /// Number of entries (`localStorage.length`).
    fn length(&self) -> usize;
    /// Key at `index`, or `None` past the end (`localStorage.key(i)`).
    fn key(&self, index: usize) -> Option<&str>;
    /// Value stored under `key` (`localStorage.getItem(key)`).
    fn get_item(&self, key: &str) -> Option<&str>;
}

/// Where a snapshot is read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSource {
    Stdin,
    File(PathBuf),
}

/// Resolve a `--storage` argument.
/// Supports:
/// - "-" → Stdin
/// - "~/dump.json" → File under the home directory
/// - "dump.json" → File as given
pub fn resolve_source(path: &str) -> SnapshotSource {
    if path == "-" {
        SnapshotSource::Stdin
    } else {
        SnapshotSource::File(PathBuf::from(shellexpand::tilde(path).as_ref()))
    }
}

/// A point-in-time copy of a page's local storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotStore {
    entries: Vec<(String, String)>,
}

impl SnapshotStore {
    #[cfg(test)]
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a snapshot dump.
    /// Supports:
    /// - `{"k": "v", ...}` → entries in document order
    /// - `[{"key": "k", "value": "v"}, ...]`
    /// - `[["k", "v"], ...]`
    pub fn from_json(content: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(content)
            .context("Storage snapshot is not valid JSON")?;

        let entries = match doc {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, value_text(v)))
                .collect(),
            Value::Array(items) => {
                let mut seen = HashSet::new();
                let mut entries = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let (key, value) = parse_entry(index, item)?;
                    if !seen.insert(key.clone()) {
                        return Err(anyhow!(
                            "Duplicate storage key '{}' at entry {}",
                            key,
                            index
                        ));
                    }
                    entries.push((key, value));
                }
                entries
            }
            _ => {
                return Err(anyhow!(
                    "Storage snapshot must be a JSON object or an array of entries"
                ))
            }
        };

        Ok(Self { entries })
    }

    /// Load a snapshot from a file path (`~` is expanded) or `-` for stdin.
    pub fn load(path: &str) -> Result<Self> {
        let content = match resolve_source(path) {
            SnapshotSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read storage snapshot from stdin")?;
                buf
            }
            SnapshotSource::File(file) => fs::read_to_string(&file)
                .with_context(|| format!("Cannot read storage snapshot {}", file.display()))?,
        };
        Self::from_json(&content).with_context(|| format!("Invalid storage snapshot {}", path))
    }
}

impl KeyValueStore for SnapshotStore {
    fn length(&self) -> usize {
        self.entries.len()
    }

    fn key(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(k, _)| k.as_str())
    }

    fn get_item(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Local storage only holds strings; anything else in a dump is kept as its JSON text.
fn value_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn parse_entry(index: usize, item: Value) -> Result<(String, String)> {
    match item {
        Value::Object(mut obj) => {
            let key = match obj.remove("key") {
                Some(Value::String(k)) => k,
                _ => return Err(anyhow!("Entry {} has no string \"key\"", index)),
            };
            let value = match obj.remove("value") {
                Some(v) => value_text(v),
                None => return Err(anyhow!("Entry {} has no \"value\"", index)),
            };
            Ok((key, value))
        }
        Value::Array(pair) if pair.len() == 2 => {
            let mut it = pair.into_iter();
            match (it.next(), it.next()) {
                (Some(Value::String(k)), Some(v)) => Ok((k, value_text(v))),
                _ => Err(anyhow!("Entry {} must be [\"key\", \"value\"]", index)),
            }
        }
        _ => Err(anyhow!(
            "Entry {} must be {{\"key\", \"value\"}} or a [key, value] pair",
            index
        )),
    }
}
