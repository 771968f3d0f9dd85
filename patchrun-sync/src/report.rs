//! Outcome of a migration run.

use patchrun_core::{PatchName, SpecFile};
use patchrun_detector::DetectedEntities;
use serde::Serialize;

use crate::discover::count_by_category;

/// How applying one spec went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyResult {
    Applied {
        /// The tool's own summary line, when it printed one.
        summary: Option<String>,
        output: String,
    },
    Failed {
        message: String,
    },
}

impl ApplyResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyResult::Applied { .. })
    }
}

/// One spec's row in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecOutcome {
    pub spec: SpecFile,
    pub entities: DetectedEntities,
    /// Why detection was not exact for this spec, if it wasn't.
    pub warning: Option<String>,
    pub result: ApplyResult,
}

/// Why the sync step did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `--skip-sync` was given.
    Requested,
    /// No client-syncable entity was touched.
    NothingToSync,
}

/// Result of the terminal sync step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Skipped { reason: SkipReason },
    Completed { output: String },
    Failed { message: String },
}

/// Everything a migration run did, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub patch: PatchName,
    pub dry_run: bool,
    pub specs: Vec<SpecOutcome>,
    /// Union of every spec's detected entities.
    pub entities: DetectedEntities,
    pub sync: SyncOutcome,
}

impl MigrationReport {
    pub fn applied(&self) -> usize {
        self.specs.iter().filter(|s| s.result.is_applied()).count()
    }

    pub fn failed(&self) -> usize {
        self.specs.len() - self.applied()
    }

    pub fn failed_specs(&self) -> impl Iterator<Item = &SpecFile> {
        self.specs
            .iter()
            .filter(|s| !s.result.is_applied())
            .map(|s| &s.spec)
    }

    /// `(root-level, nested)` spec counts.
    pub fn category_counts(&self) -> (usize, usize) {
        count_by_category(self.specs.iter().map(|s| &s.spec))
    }

    /// Apply failures are tolerated; only a failed sync fails the run.
    pub fn is_success(&self) -> bool {
        !matches!(self.sync, SyncOutcome::Failed { .. })
    }
}
