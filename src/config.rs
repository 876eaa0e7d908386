use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};

const CONFIG_DIR: &str = "offline-token";
const CONFIG_FILE: &str = "config.toml";

/// Substring identifying the OAuth offline-access entries among unrelated keys.
pub const DEFAULT_MARKER: &str = "offline_access";
/// Where the token sits inside the decoded entry value.
pub const DEFAULT_FIELD_PATH: &str = "body.access_token";

/// On-disk config. Every key is optional; absent keys fall back to the defaults.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub marker: Option<String>,
    pub field_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    pub marker: String,
    pub field_path: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            field_path: DEFAULT_FIELD_PATH.split('.').map(String::from).collect(),
        }
    }
}

impl ExtractorConfig {
    /// Dotted form of the field path, e.g. `body.access_token`.
    pub fn field_path_display(&self) -> String {
        self.field_path.join(".")
    }
}

/// Split `body.access_token` into its segments. Empty segments are rejected.
pub fn parse_field_path(raw: &str) -> Result<Vec<String>> {
    let segments: Vec<String> = raw.trim().split('.').map(String::from).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(anyhow!(
            "Invalid field path '{}'. Expected dot-separated names (e.g., body.access_token)",
            raw
        ));
    }
    Ok(segments)
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Invalid config format in {}", path.display()))
}

/// Build the effective config: defaults, then the config file, then CLI flags.
///
/// An explicit `--config` path must exist; the default location is optional.
pub fn resolve(
    explicit_path: Option<&Path>,
    marker: Option<String>,
    field_path: Option<String>,
) -> Result<ExtractorConfig> {
    let file = match explicit_path {
        Some(path) => load_config_file(path)?,
        None => match get_config_path() {
            Some(path) if path.exists() => {
                o_debug!("Using config {}", path.display());
                load_config_file(&path)?
            }
            _ => ConfigFile::default(),
        },
    };

    let mut cfg = ExtractorConfig::default();
    if let Some(m) = file.marker {
        cfg.marker = m;
    }
    if let Some(f) = file.field_path {
        cfg.field_path = parse_field_path(&f)?;
    }
    if let Some(m) = marker {
        cfg.marker = m;
    }
    if let Some(f) = field_path {
        cfg.field_path = parse_field_path(&f)?;
    }

    if cfg.marker.is_empty() {
        return Err(anyhow!("Marker must not be empty"));
    }
    Ok(cfg)
}
