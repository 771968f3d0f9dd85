//! # patchrun-sync
//!
//! Spec discovery, the external `dsl` tool seam, and the apply/sync pipeline.
//!
//! Call [`pipeline::run`] to apply every spec of a patch and sync the touched
//! entities, or [`pipeline::plan`] to preview the same run without invoking
//! the tool.

pub mod discover;
pub mod dsl;
pub mod error;
pub mod pipeline;
pub mod report;

pub use dsl::{DslTool, ProcessDsl, ToolOutput};
pub use error::SyncError;
pub use pipeline::{MigrateOptions, MigrationTarget, RunObserver};
pub use report::{ApplyResult, MigrationReport, SkipReason, SpecOutcome, SyncOutcome};
