//! The external `dsl` tool.
//!
//! The pipeline talks to the tool only through [`DslTool`]; [`ProcessDsl`]
//! is the real implementation and runs one blocking subprocess per call:
//!
//! ```text
//! <dsl> apply <spec> --path <server datasheet> [--dry-run]
//! <dsl> sync [--config <sync config>] -e <Entity> [-e <Entity> ...] [--dry-run]
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::SyncError;

const UNKNOWN_ERROR: &str = "Unknown error";

// ---------------------------------------------------------------------------
// Requests and output
// ---------------------------------------------------------------------------

/// One `dsl apply` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest<'a> {
    pub spec: &'a Path,
    pub server_datasheet: &'a Path,
    pub dry_run: bool,
}

/// The single `dsl sync` invocation at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest<'a> {
    /// Sync entity names, already sorted and deduplicated.
    pub entities: &'a [&'static str],
    pub config: Option<&'a Path>,
    pub dry_run: bool,
}

/// What the tool reported for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Failure text: trimmed stderr, else trimmed stdout, else `Unknown error`.
    pub fn error_message(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        if !stderr.is_empty() {
            stderr.to_string()
        } else if !stdout.is_empty() {
            stdout.to_string()
        } else {
            UNKNOWN_ERROR.to_string()
        }
    }

    /// First stdout line that reads like an apply summary.
    pub fn summary_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .find(|line| line.contains("Applied") || line.to_lowercase().contains("operations"))
            .map(str::trim)
    }
}

// ---------------------------------------------------------------------------
// Tool seam
// ---------------------------------------------------------------------------

/// The operations the pipeline needs from the external tool.
///
/// `Err` is reserved for failures to run the tool at all; a tool that ran and
/// exited non-zero returns `Ok` with `success == false`.
pub trait DslTool {
    fn apply(&mut self, request: &ApplyRequest<'_>) -> Result<ToolOutput, SyncError>;
    fn sync(&mut self, request: &SyncRequest<'_>) -> Result<ToolOutput, SyncError>;
}

/// Runs the tool binary as a child process from the project root.
#[derive(Debug, Clone)]
pub struct ProcessDsl {
    binary: PathBuf,
    workdir: PathBuf,
}

impl ProcessDsl {
    pub fn new(binary: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.into(),
        }
    }

    /// Arguments for `apply`. The spec is passed relative to the working
    /// directory when it lives below it.
    pub fn apply_args(&self, request: &ApplyRequest<'_>) -> Vec<OsString> {
        let spec = request.spec.strip_prefix(&self.workdir).unwrap_or(request.spec);
        let mut args: Vec<OsString> = vec![
            "apply".into(),
            spec.into(),
            "--path".into(),
            request.server_datasheet.into(),
        ];
        if request.dry_run {
            args.push("--dry-run".into());
        }
        args
    }

    pub fn sync_args(&self, request: &SyncRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["sync".into()];
        if let Some(config) = request.config {
            args.push("--config".into());
            args.push(config.into());
        }
        for entity in request.entities {
            args.push("-e".into());
            args.push((*entity).into());
        }
        if request.dry_run {
            args.push("--dry-run".into());
        }
        args
    }

    fn invoke(&self, args: Vec<OsString>) -> Result<ToolOutput, SyncError> {
        tracing::debug!(binary = %self.binary.display(), ?args, "invoking dsl");
        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| SyncError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
        tracing::debug!(status = %output.status, "dsl exited");
        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl DslTool for ProcessDsl {
    fn apply(&mut self, request: &ApplyRequest<'_>) -> Result<ToolOutput, SyncError> {
        self.invoke(self.apply_args(request))
    }

    fn sync(&mut self, request: &SyncRequest<'_>) -> Result<ToolOutput, SyncError> {
        self.invoke(self.sync_args(request))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn apply_args_use_root_relative_spec() {
        let root = PathBuf::from("/srv/game");
        let tool = ProcessDsl::new("/srv/game/dsl", &root);
        let spec = root.join("reforged").join("specs").join("01_items.yaml");
        let args = strings(tool.apply_args(&ApplyRequest {
            spec: &spec,
            server_datasheet: Path::new("/data/Datasheet"),
            dry_run: false,
        }));
        assert_eq!(args[0], "apply");
        assert_eq!(
            PathBuf::from(&args[1]),
            PathBuf::from("reforged").join("specs").join("01_items.yaml")
        );
        assert_eq!(&args[2..], ["--path", "/data/Datasheet"]);
    }

    #[test]
    fn apply_args_append_dry_run() {
        let tool = ProcessDsl::new("dsl", "/root");
        let args = strings(tool.apply_args(&ApplyRequest {
            spec: Path::new("/elsewhere/a.yaml"),
            server_datasheet: Path::new("/data"),
            dry_run: true,
        }));
        assert_eq!(args, ["apply", "/elsewhere/a.yaml", "--path", "/data", "--dry-run"]);
    }

    #[test]
    fn sync_args_repeat_entity_flag() {
        let tool = ProcessDsl::new("dsl", "/root");
        let args = strings(tool.sync_args(&SyncRequest {
            entities: &["EquipmentData", "ItemData"],
            config: Some(Path::new("/root/sync-config.yaml")),
            dry_run: false,
        }));
        assert_eq!(
            args,
            [
                "sync",
                "--config",
                "/root/sync-config.yaml",
                "-e",
                "EquipmentData",
                "-e",
                "ItemData"
            ]
        );
    }

    #[test]
    fn sync_args_without_config() {
        let tool = ProcessDsl::new("dsl", "/root");
        let args = strings(tool.sync_args(&SyncRequest {
            entities: &["ItemData"],
            config: None,
            dry_run: true,
        }));
        assert_eq!(args, ["sync", "-e", "ItemData", "--dry-run"]);
    }

    #[rstest]
    #[case::stderr_wins("out\n", "  err  \n", "err")]
    #[case::blank_stderr_falls_back("validation failed\n", "   ", "validation failed")]
    #[case::nothing_printed("", "", "Unknown error")]
    fn error_message_prefers_stderr_then_stdout(
        #[case] stdout: &str,
        #[case] stderr: &str,
        #[case] expected: &str,
    ) {
        let out = ToolOutput {
            success: false,
            stdout: stdout.into(),
            stderr: stderr.into(),
        };
        assert_eq!(out.error_message(), expected);
    }

    #[rstest]
    #[case::applied("Loading...\n  Applied 12 changes to Item\nDone\n", Some("Applied 12 changes to Item"))]
    #[case::operations_any_case("3 OPERATIONS executed\n", Some("3 OPERATIONS executed"))]
    #[case::first_match_wins("2 operations queued\nApplied 2\n", Some("2 operations queued"))]
    #[case::no_summary("ok\n", None)]
    fn summary_line_matches_applied_or_operations(
        #[case] stdout: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(ToolOutput::succeeded(stdout).summary_line(), expected);
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut tool = ProcessDsl::new(dir.path().join("no-such-dsl"), dir.path());
        let err = tool
            .apply(&ApplyRequest {
                spec: Path::new("a.yaml"),
                server_datasheet: Path::new("/data"),
                dry_run: false,
            })
            .unwrap_err();
        assert!(matches!(err, SyncError::Spawn { .. }), "got: {err}");
    }
}
