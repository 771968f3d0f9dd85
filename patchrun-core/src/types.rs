//! Domain types shared across the patchrun crates.
//!
//! All path fields use `PathBuf`; relative spec paths are kept separately as
//! `/`-separated strings so ordering is identical on every platform.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a patch folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PatchName(pub String);

impl fmt::Display for PatchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PatchName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PatchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Spec files
// ---------------------------------------------------------------------------

/// A spec discovered inside a patch folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecFile {
    /// Full path on disk.
    pub path: PathBuf,
    /// Path below the patch folder, `/`-separated. This is the sort key.
    pub relative: String,
}

impl SpecFile {
    /// Build a spec entry for `path`, which must live under `patch_dir`.
    ///
    /// Falls back to the file name when `path` is not below `patch_dir`.
    pub fn new(patch_dir: &Path, path: PathBuf) -> Self {
        let relative = match path.strip_prefix(patch_dir) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        Self { path, relative }
    }

    /// `true` when the spec lives in a subdirectory of the patch folder.
    pub fn is_nested(&self) -> bool {
        self.relative.contains('/')
    }

    /// Final path component of the relative path.
    pub fn file_name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }
}

impl fmt::Display for SpecFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.relative.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(PatchName::from("100.2").to_string(), "100.2");
        assert_eq!(PatchName::from(String::from("x")), PatchName::from("x"));
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = PathBuf::from("patches").join("p1");
        let spec = SpecFile::new(&root, root.join("loot").join("zone_7.yaml"));
        assert_eq!(spec.relative, "loot/zone_7.yaml");
        assert!(spec.is_nested());
        assert_eq!(spec.file_name(), "zone_7.yaml");
    }

    #[test]
    fn root_level_spec_is_not_nested() {
        let root = PathBuf::from("p1");
        let spec = SpecFile::new(&root, root.join("01_items.yaml"));
        assert_eq!(spec.relative, "01_items.yaml");
        assert!(!spec.is_nested());
        assert_eq!(spec.to_string(), "01_items.yaml");
    }
}
