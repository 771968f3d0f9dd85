//! patchrun core library — domain types, the entity sync map, configuration.
//!
//! - [`types`] — newtypes and domain structs
//! - [`entity_map`] — the static YAML-key → sync-entity table
//! - [`references`] — `.references` key=value configuration
//! - [`layout`] — where things live under a project root
//! - [`error`] — [`ConfigError`]

pub mod entity_map;
pub mod error;
pub mod layout;
pub mod references;
pub mod types;

pub use entity_map::EntityKey;
pub use error::ConfigError;
pub use references::References;
pub use types::{PatchName, SpecFile};
