//! Project layout — every path patchrun reads is derived from the project root.
//!
//! ```text
//! <root>/
//!   dsl[.exe]                        (default tool binary)
//!   reforged/
//!     .references                    (key=value configuration)
//!     config/sync-config.yaml        (default sync config)
//!     specs/patches/<patch>/**.yaml  (spec files)
//! ```

use std::path::{Path, PathBuf};

use crate::types::PatchName;

pub const CONTENT_DIR: &str = "reforged";
pub const REFERENCES_FILE: &str = ".references";
pub const SPEC_EXTENSION: &str = "yaml";
pub const DSL_BINARY: &str = "dsl";

pub fn content_root(root: &Path) -> PathBuf {
    root.join(CONTENT_DIR)
}

pub fn references_path(root: &Path) -> PathBuf {
    content_root(root).join(REFERENCES_FILE)
}

pub fn patches_dir(root: &Path) -> PathBuf {
    content_root(root).join("specs").join("patches")
}

pub fn patch_dir(root: &Path, patch: &PatchName) -> PathBuf {
    patches_dir(root).join(&patch.0)
}

pub fn default_sync_config(root: &Path) -> PathBuf {
    content_root(root).join("config").join("sync-config.yaml")
}

pub fn default_dsl_cli(root: &Path) -> PathBuf {
    root.join(format!("{DSL_BINARY}{}", std::env::consts::EXE_SUFFIX))
}
