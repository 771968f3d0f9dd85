//! The migration pipeline: discover → apply each spec → aggregate → sync once.
//!
//! Two failure policies apply. A spec whose `apply` fails is recorded and the
//! run moves on to the next spec. A failing `sync` is recorded as
//! [`SyncOutcome::Failed`] and makes [`MigrationReport::is_success`] false.
//! Anything that prevents the run from starting (missing patch folder, no
//! specs, a tool binary that cannot be spawned) is a [`SyncError`].

use std::path::{Path, PathBuf};

use patchrun_core::{layout, PatchName, References, SpecFile};
use patchrun_detector::{detect_entities_lenient, DetectedEntities, Detection};
use serde::Serialize;

use crate::discover::{discover_specs, unprefixed_root_specs};
use crate::dsl::{ApplyRequest, DslTool, SyncRequest};
use crate::error::SyncError;
use crate::report::{ApplyResult, MigrationReport, SkipReason, SpecOutcome, SyncOutcome};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Flags controlling a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrateOptions {
    /// Forward `--dry-run` to every tool invocation.
    pub dry_run: bool,
    /// Apply only; never invoke sync.
    pub skip_sync: bool,
    /// Refuse to run when a root-level spec lacks a numeric prefix.
    pub strict_order: bool,
}

/// Where a patch lives and what its specs are applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTarget {
    pub patch: PatchName,
    pub patch_dir: PathBuf,
    pub server_datasheet: PathBuf,
    pub sync_config: Option<PathBuf>,
}

impl MigrationTarget {
    /// Resolve `patch` under the standard layout of `root`.
    pub fn resolve(root: &Path, patch: PatchName, references: &References) -> Self {
        Self {
            patch_dir: layout::patch_dir(root, &patch),
            patch,
            server_datasheet: references.server_datasheet.clone(),
            sync_config: references.sync_config.clone(),
        }
    }
}

/// Progress callbacks, invoked synchronously as the run advances.
pub trait RunObserver {
    fn run_started(&mut self, _patch: &PatchName, _specs: &[SpecFile]) {}
    fn spec_started(&mut self, _index: usize, _total: usize, _spec: &SpecFile) {}
    fn spec_finished(&mut self, _outcome: &SpecOutcome) {}
    /// Every spec has been attempted; called before the sync decision.
    fn applies_finished(&mut self, _outcomes: &[SpecOutcome], _entities: &DetectedEntities) {}
    fn sync_started(&mut self, _entities: &[&'static str]) {}
}

impl RunObserver for () {}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A spec as it would be applied, with what detection found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSpec {
    pub spec: SpecFile,
    pub entities: DetectedEntities,
    /// Set when detection fell back to the line scan or failed outright.
    pub warning: Option<String>,
}

/// The ordered specs of a patch and the entities a run would sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub patch: PatchName,
    pub specs: Vec<PlannedSpec>,
    pub entities: DetectedEntities,
}

/// Discover and detect without touching the tool.
pub fn plan(target: &MigrationTarget, options: &MigrateOptions) -> Result<Plan, SyncError> {
    let specs = load_specs(target, options)?;
    let mut entities = DetectedEntities::default();
    let specs = specs
        .into_iter()
        .map(|spec| {
            let (detected, warning) = detect_or_warn(&spec);
            entities.merge(&detected);
            PlannedSpec {
                spec,
                entities: detected,
                warning,
            }
        })
        .collect();
    Ok(Plan {
        patch: target.patch.clone(),
        specs,
        entities,
    })
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Apply every spec of the patch in order, then sync touched client entities.
pub fn run<T, O>(
    tool: &mut T,
    target: &MigrationTarget,
    options: &MigrateOptions,
    observer: &mut O,
) -> Result<MigrationReport, SyncError>
where
    T: DslTool + ?Sized,
    O: RunObserver + ?Sized,
{
    let specs = load_specs(target, options)?;
    let total = specs.len();
    tracing::info!(patch = %target.patch, total, dry_run = options.dry_run, "migration started");
    observer.run_started(&target.patch, &specs);

    let mut entities = DetectedEntities::default();
    let mut outcomes = Vec::with_capacity(total);

    for (i, spec) in specs.into_iter().enumerate() {
        observer.spec_started(i + 1, total, &spec);

        let (detected, warning) = detect_or_warn(&spec);
        entities.merge(&detected);

        let output = tool.apply(&ApplyRequest {
            spec: &spec.path,
            server_datasheet: &target.server_datasheet,
            dry_run: options.dry_run,
        })?;
        let result = if output.success {
            ApplyResult::Applied {
                summary: output.summary_line().map(str::to_string),
                output: output.stdout.trim().to_string(),
            }
        } else {
            let message = output.error_message();
            tracing::info!(spec = %spec, %message, "apply failed");
            ApplyResult::Failed { message }
        };

        let outcome = SpecOutcome {
            spec,
            entities: detected,
            warning,
            result,
        };
        observer.spec_finished(&outcome);
        outcomes.push(outcome);
    }

    observer.applies_finished(&outcomes, &entities);
    let sync = run_sync(tool, target, options, &entities, observer)?;
    let report = MigrationReport {
        patch: target.patch.clone(),
        dry_run: options.dry_run,
        specs: outcomes,
        entities,
        sync,
    };
    tracing::info!(
        applied = report.applied(),
        failed = report.failed(),
        success = report.is_success(),
        "migration finished"
    );
    Ok(report)
}

fn run_sync<T, O>(
    tool: &mut T,
    target: &MigrationTarget,
    options: &MigrateOptions,
    entities: &DetectedEntities,
    observer: &mut O,
) -> Result<SyncOutcome, SyncError>
where
    T: DslTool + ?Sized,
    O: RunObserver + ?Sized,
{
    if options.skip_sync {
        return Ok(SyncOutcome::Skipped {
            reason: SkipReason::Requested,
        });
    }
    if !entities.has_client_entities() {
        return Ok(SyncOutcome::Skipped {
            reason: SkipReason::NothingToSync,
        });
    }

    let names: Vec<&'static str> = entities.client.iter().copied().collect();
    observer.sync_started(&names);

    let output = tool.sync(&SyncRequest {
        entities: &names,
        config: target.sync_config.as_deref(),
        dry_run: options.dry_run,
    })?;
    if output.success {
        Ok(SyncOutcome::Completed {
            output: output.stdout.trim().to_string(),
        })
    } else {
        let message = output.error_message();
        tracing::error!(%message, "sync failed");
        Ok(SyncOutcome::Failed { message })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_specs(
    target: &MigrationTarget,
    options: &MigrateOptions,
) -> Result<Vec<SpecFile>, SyncError> {
    if !target.patch_dir.is_dir() {
        return Err(SyncError::PatchNotFound {
            path: target.patch_dir.clone(),
        });
    }
    let specs = discover_specs(&target.patch_dir)?;
    if specs.is_empty() {
        return Err(SyncError::NoSpecs {
            path: target.patch_dir.clone(),
        });
    }
    if options.strict_order {
        let names = unprefixed_root_specs(&specs);
        if !names.is_empty() {
            return Err(SyncError::UnorderedSpecs { names });
        }
    }
    Ok(specs)
}

/// Detection never stops a run: the tool owns spec validation, so a spec the
/// YAML parser rejects is still applied and its entities come from a line
/// scan. Only an unreadable spec contributes nothing.
fn detect_or_warn(spec: &SpecFile) -> (DetectedEntities, Option<String>) {
    match detect_entities_lenient(&spec.path) {
        Ok(Detection {
            entities,
            fallback: None,
        }) => (entities, None),
        Ok(Detection {
            entities,
            fallback: Some(err),
        }) => {
            tracing::warn!(spec = %spec, error = %err, "YAML parse failed, scanned keys instead");
            (entities, Some(format!("{err} (entities taken from a key scan)")))
        }
        Err(err) => {
            tracing::warn!(spec = %spec, error = %err, "entity detection skipped");
            (DetectedEntities::default(), Some(err.to_string()))
        }
    }
}
