//! Finds the offline-access token in a storage snapshot and reports it.
//!
//! Scan rules:
//! - keys are visited by index in host order; only keys containing the marker
//!   are read and decoded
//! - a value that is not JSON, or lacks a non-empty string at the field path,
//!   is skipped without aborting the scan
//! - the first hit wins and nothing after it is read

use crate::config::ExtractorConfig;
use crate::console::ConsoleSink;
use crate::storage::KeyValueStore;
use serde_json::Value;

pub const FOUND_TITLE: &str = "Access Token:";

/// How a single storage entry was classified during the scan.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// Key does not contain the marker; the value was never read.
    KeyMismatch,
    /// Value is missing or not JSON.
    Undecodable,
    /// Decoded, but nothing non-empty at the field path.
    FieldMissing,
    Found(String),
}

impl EntryOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            EntryOutcome::KeyMismatch => "no marker",
            EntryOutcome::Undecodable => "not JSON",
            EntryOutcome::FieldMissing => "no token",
            EntryOutcome::Found(_) => "token",
        }
    }
}

/// Walk `path` through nested objects and return the string at the end.
/// Empty strings count as absent.
fn lookup_field<'a>(doc: &'a Value, path: &[String]) -> Option<&'a str> {
    path.iter()
        .try_fold(doc, |node, segment| node.get(segment.as_str()))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Decode `raw` and look for the token in it.
pub fn decode_entry(raw: Option<&str>, config: &ExtractorConfig) -> EntryOutcome {
    let Some(raw) = raw else {
        return EntryOutcome::Undecodable;
    };
    let doc: Value = match serde_json::from_str(raw) {
        Ok(doc) => doc,
        Err(_) => return EntryOutcome::Undecodable,
    };
    match lookup_field(&doc, &config.field_path) {
        Some(token) => EntryOutcome::Found(token.to_string()),
        None => EntryOutcome::FieldMissing,
    }
}

/// Classify the entry at `index`. Reads the value only when the key matches.
fn inspect_index<S>(
    store: &S,
    index: usize,
    config: &ExtractorConfig,
) -> Option<(String, EntryOutcome)>
where
    S: KeyValueStore + ?Sized,
{
    let key = store.key(index)?;
    if !key.contains(config.marker.as_str()) {
        return Some((key.to_string(), EntryOutcome::KeyMismatch));
    }
    let outcome = decode_entry(store.get_item(key), config);
    Some((key.to_string(), outcome))
}

/// Classify every entry without stopping at the first hit.
pub fn inspect_all<S>(store: &S, config: &ExtractorConfig) -> Vec<(String, EntryOutcome)>
where
    S: KeyValueStore + ?Sized,
{
    (0..store.length())
        .filter_map(|index| inspect_index(store, index, config))
        .collect()
}

/// First non-empty token under a marker key, or `None`.
pub fn find_token<S>(store: &S, config: &ExtractorConfig) -> Option<String>
where
    S: KeyValueStore + ?Sized,
{
    for index in 0..store.length() {
        let Some((key, outcome)) = inspect_index(store, index, config) else {
            continue;
        };
        if outcome != EntryOutcome::KeyMismatch {
            o_debug!("  [{}] {}: {}", index, key, outcome.label());
        }
        if let EntryOutcome::Found(token) = outcome {
            return Some(token);
        }
    }
    None
}

pub fn not_found_message(config: &ExtractorConfig) -> String {
    format!(
        "Access token not found (no '{}' entry with {})",
        config.marker,
        config.field_path_display()
    )
}

/// Scan, clear the console, then print the token or a not-found error.
pub fn extract_and_report<S, C>(store: &S, console: &mut C, config: &ExtractorConfig)
where
    S: KeyValueStore + ?Sized,
    C: ConsoleSink + ?Sized,
{
    let token = find_token(store, config);

    console.clear();
    match token {
        Some(token) => {
            console.title(FOUND_TITLE);
            console.value(&token);
        }
        None => console.error(&not_found_message(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleLine, RecordingConsole};
    use crate::storage::SnapshotStore;
    use std::cell::RefCell;

    /// Records which keys had their value read.
    struct TrackingStore {
        inner: SnapshotStore,
        reads: RefCell<Vec<String>>,
    }

    impl TrackingStore {
        fn new(entries: Vec<(&str, &str)>) -> Self {
            Self {
                inner: SnapshotStore::from_entries(entries),
                reads: RefCell::new(Vec::new()),
            }
        }
    }

    impl KeyValueStore for TrackingStore {
        fn length(&self) -> usize {
            self.inner.length()
        }

        fn key(&self, index: usize) -> Option<&str> {
            self.inner.key(index)
        }

        fn get_item(&self, key: &str) -> Option<&str> {
            self.reads.borrow_mut().push(key.to_string());
            self.inner.get_item(key)
        }
    }

    fn report(entries: Vec<(&str, &str)>) -> Vec<ConsoleLine> {
        let store = SnapshotStore::from_entries(entries);
        let mut console = RecordingConsole::default();
        extract_and_report(&store, &mut console, &ExtractorConfig::default());
        console.lines
    }

    fn found(token: &str) -> Vec<ConsoleLine> {
        vec![
            ConsoleLine::Clear,
            ConsoleLine::Title(FOUND_TITLE.to_string()),
            ConsoleLine::Value(token.to_string()),
        ]
    }

    fn not_found() -> Vec<ConsoleLine> {
        vec![
            ConsoleLine::Clear,
            ConsoleLine::Error(not_found_message(&ExtractorConfig::default())),
        ]
    }

    #[test]
    fn test_reports_token() {
        let lines = report(vec![(
            "offline_access_1",
            r#"{"body":{"access_token":"abc123"}}"#,
        )]);
        assert_eq!(lines, found("abc123"));
    }

    #[test]
    fn test_undecodable_value_not_found() {
        assert_eq!(report(vec![("offline_access_1", "not json")]), not_found());
    }

    #[test]
    fn test_key_without_marker_not_found() {
        let lines = report(vec![("other_key", r#"{"body":{"access_token":"xyz"}}"#)]);
        assert_eq!(lines, not_found());
    }

    #[test]
    fn test_missing_field_not_found() {
        assert_eq!(report(vec![("offline_access_1", r#"{"body":{}}"#)]), not_found());
    }

    #[test]
    fn test_empty_storage_not_found() {
        assert_eq!(report(vec![]), not_found());
    }

    #[test]
    fn test_second_matching_entry_wins_when_first_lacks_field() {
        let lines = report(vec![
            ("offline_access_a", r#"{"body":{"token_type":"Bearer"}}"#),
            ("offline_access_b", r#"{"body":{"access_token":"second"}}"#),
        ]);
        assert_eq!(lines, found("second"));
    }

    #[test]
    fn test_empty_or_non_string_token_skipped() {
        let lines = report(vec![
            ("offline_access_a", r#"{"body":{"access_token":""}}"#),
            ("offline_access_b", r#"{"body":{"access_token":42}}"#),
            ("offline_access_c", r#"{"body":"flat"}"#),
            ("offline_access_d", r#"{"body":{"access_token":"ok"}}"#),
        ]);
        assert_eq!(lines, found("ok"));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let lines = report(vec![("OFFLINE_ACCESS", r#"{"body":{"access_token":"x"}}"#)]);
        assert_eq!(lines, not_found());
    }

    #[test]
    fn test_marker_matches_anywhere_in_key() {
        let lines = report(vec![(
            "@@auth0spajs@@::client::api::openid offline_access",
            r#"{"body":{"access_token":"eyJ"},"expiresAt":1}"#,
        )]);
        assert_eq!(lines, found("eyJ"));
    }

    #[test]
    fn test_non_matching_keys_never_read() {
        let store = TrackingStore::new(vec![
            ("theme", "dark"),
            ("offline_access_1", "broken"),
            ("session", r#"{"body":{"access_token":"nope"}}"#),
        ]);
        assert_eq!(find_token(&store, &ExtractorConfig::default()), None);
        assert_eq!(*store.reads.borrow(), vec!["offline_access_1".to_string()]);
    }

    #[test]
    fn test_scan_stops_at_first_hit() {
        let store = TrackingStore::new(vec![
            ("offline_access_1", "{"),
            ("offline_access_2", r#"{"body":{"access_token":"first"}}"#),
            ("offline_access_3", r#"{"body":{"access_token":"later"}}"#),
        ]);
        assert_eq!(
            find_token(&store, &ExtractorConfig::default()),
            Some("first".to_string())
        );
        assert_eq!(
            *store.reads.borrow(),
            vec!["offline_access_1".to_string(), "offline_access_2".to_string()]
        );
    }

    #[test]
    fn test_custom_marker_and_field_path() {
        let store = SnapshotStore::from_entries(vec![(
            "kc-refresh",
            r#"{"data":{"tokens":{"id":"tok"}}}"#,
        )]);
        let config = ExtractorConfig {
            marker: "refresh".to_string(),
            field_path: vec!["data".into(), "tokens".into(), "id".into()],
        };
        assert_eq!(find_token(&store, &config), Some("tok".to_string()));
    }

    #[test]
    fn test_inspect_all_classifies_every_entry() {
        let store = SnapshotStore::from_entries(vec![
            ("a", "x"),
            ("offline_access_1", "x"),
            ("offline_access_2", r#"{"body":{}}"#),
            ("offline_access_3", r#"{"body":{"access_token":"t"}}"#),
        ]);
        let outcomes: Vec<EntryOutcome> = inspect_all(&store, &ExtractorConfig::default())
            .into_iter()
            .map(|(_, o)| o)
            .collect();
        assert_eq!(
            outcomes,
            vec![
                EntryOutcome::KeyMismatch,
                EntryOutcome::Undecodable,
                EntryOutcome::FieldMissing,
                EntryOutcome::Found("t".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_entry_missing_value() {
        assert_eq!(
            decode_entry(None, &ExtractorConfig::default()),
            EntryOutcome::Undecodable
        );
    }
}
