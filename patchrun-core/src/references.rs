//! `.references` — key=value paths consumed at startup.
//!
//! # Format
//!
//! ```text
//! # comment
//! server_datasheet = D:\server\Datasheet
//! dsl_cli = tools/dsl.exe
//! sync_config = reforged/config/sync-config.yaml
//! ```
//!
//! Blank lines and `#` comments are skipped. Key and value are trimmed; an
//! entry with an empty value is ignored. A later duplicate replaces an earlier
//! one. Relative paths resolve against the project root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::layout;

pub const KEY_SERVER_DATASHEET: &str = "server_datasheet";
pub const KEY_DSL_CLI: &str = "dsl_cli";
pub const KEY_SYNC_CONFIG: &str = "sync_config";

/// Resolved configuration for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct References {
    /// The external tool binary.
    pub dsl_cli: PathBuf,
    /// Server datasheet directory passed to `apply --path`.
    pub server_datasheet: PathBuf,
    /// Config passed to `sync --config`, when one is known.
    pub sync_config: Option<PathBuf>,
}

/// Parse `key=value` lines into a map. Never fails; malformed lines without
/// a value are dropped.
pub fn parse(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        entries.insert(key.trim().to_string(), value.to_string());
    }
    entries
}

impl References {
    /// Resolve parsed entries against `root`.
    ///
    /// `source` is only used to annotate errors.
    pub fn from_entries(
        root: &Path,
        entries: &BTreeMap<String, String>,
        source: &Path,
    ) -> Result<Self, ConfigError> {
        let server_datasheet = entries
            .get(KEY_SERVER_DATASHEET)
            .map(|v| resolve(root, v))
            .ok_or_else(|| ConfigError::MissingReference {
                key: KEY_SERVER_DATASHEET,
                path: source.to_path_buf(),
            })?;

        let dsl_cli = entries
            .get(KEY_DSL_CLI)
            .map(|v| resolve(root, v))
            .unwrap_or_else(|| layout::default_dsl_cli(root));

        let sync_config = match entries.get(KEY_SYNC_CONFIG) {
            Some(v) => Some(resolve(root, v)),
            None => {
                let default = layout::default_sync_config(root);
                default.is_file().then_some(default)
            }
        };

        Ok(Self {
            dsl_cli,
            server_datasheet,
            sync_config,
        })
    }
}

/// Load `<root>/reforged/.references`.
///
/// Returns `ConfigError::ReferencesNotFound` if absent and
/// `ConfigError::MissingReference` when `server_datasheet` is not set.
pub fn load_at(root: &Path) -> Result<References, ConfigError> {
    let path = layout::references_path(root);
    if !path.exists() {
        return Err(ConfigError::ReferencesNotFound { path });
    }
    let text = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    References::from_entries(root, &parse(&text), &path)
}

fn resolve(root: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
