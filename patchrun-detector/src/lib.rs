//! Entity detection for `patchrun-detector`.
//!
//! `detect_entities(path)` reads a spec, takes the top-level keys of every
//! YAML document in it and looks each one up in the static
//! [`EntityKey`](patchrun_core::EntityKey) table. Keys with a sync entity
//! land in the client set, mapped keys without one land in the server-only
//! set, anything else is ignored.
//!
//! A spec the YAML parser rejects may still be accepted by the tool, so
//! [`detect_entities_lenient`] falls back to scanning for `key:` at the
//! start of a line and reports why it had to.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use patchrun_core::EntityKey;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Entities touched by one spec, or by a whole patch after merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectedEntities {
    /// Sync-config entity names (e.g. `"ItemData"`), sorted and deduplicated.
    pub client: BTreeSet<&'static str>,
    /// Top-level keys that are mapped but never synced to the client.
    pub server_only: BTreeSet<&'static str>,
}

impl DetectedEntities {
    /// Record a single mapped key.
    pub fn record(&mut self, key: EntityKey) {
        match key.sync_entity() {
            Some(entity) => {
                self.client.insert(entity);
            }
            None => {
                self.server_only.insert(key.yaml_key());
            }
        }
    }

    /// Fold another detection result into this one.
    pub fn merge(&mut self, other: &DetectedEntities) {
        self.client.extend(other.client.iter().copied());
        self.server_only.extend(other.server_only.iter().copied());
    }

    /// `true` when at least one client-syncable entity was detected.
    pub fn has_client_entities(&self) -> bool {
        !self.client.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.client.is_empty() && self.server_only.is_empty()
    }
}

/// Result of [`detect_entities_lenient`].
#[derive(Debug)]
pub struct Detection {
    pub entities: DetectedEntities,
    /// The parse error that forced the line scan, if any.
    pub fallback: Option<DetectError>,
}

/// Errors from entity detection.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path} is not a YAML mapping at the top level")]
    NotAMapping { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classify a set of top-level keys against the entity table.
pub fn classify_keys<'a, I>(keys: I) -> DetectedEntities
where
    I: IntoIterator<Item = &'a str>,
{
    let mut detected = DetectedEntities::default();
    for key in keys.into_iter().filter_map(EntityKey::from_yaml_key) {
        detected.record(key);
    }
    detected
}

/// Detect the entities touched by the spec at `path`.
pub fn detect_entities(path: &Path) -> Result<DetectedEntities, DetectError> {
    let text = fs::read_to_string(path).map_err(|source| DetectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    detect_entities_in_str(&text, path)
}

/// Detect entities from spec text already in memory.
///
/// `path` only annotates errors. Empty documents contribute nothing; a
/// document whose root is a scalar or sequence is an error.
pub fn detect_entities_in_str(text: &str, path: &Path) -> Result<DetectedEntities, DetectError> {
    let mut detected = DetectedEntities::default();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document).map_err(|source| DetectError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Null => {}
            Value::Mapping(mapping) => {
                let keys = mapping.keys().filter_map(Value::as_str);
                detected.merge(&classify_keys(keys));
            }
            _ => {
                return Err(DetectError::NotAMapping {
                    path: path.to_path_buf(),
                })
            }
        }
    }
    Ok(detected)
}

/// Like [`detect_entities`], but a spec that does not parse as a YAML
/// mapping is scanned line by line with [`scan_top_level_keys`] instead.
///
/// Only an unreadable file is an error.
pub fn detect_entities_lenient(path: &Path) -> Result<Detection, DetectError> {
    let text = fs::read_to_string(path).map_err(|source| DetectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match detect_entities_in_str(&text, path) {
        Ok(entities) => Ok(Detection {
            entities,
            fallback: None,
        }),
        Err(err @ (DetectError::Parse { .. } | DetectError::NotAMapping { .. })) => {
            Ok(Detection {
                entities: scan_top_level_keys(&text),
                fallback: Some(err),
            })
        }
        Err(err) => Err(err),
    }
}

/// Find mapped keys written as `key:` at column zero, without parsing YAML.
pub fn scan_top_level_keys(text: &str) -> DetectedEntities {
    let keys = text
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, _)| key)
        .filter(|key| !key.starts_with(char::is_whitespace));
    classify_keys(keys)
}
