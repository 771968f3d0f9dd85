//! Entity detection against spec files on disk.
//!
//! Each `#[case]` gets an isolated `TempDir` — no shared state.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use patchrun_detector::{detect_entities, detect_entities_lenient, DetectError};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn write_spec(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let path = dir.path().join(filename);
    fs::write(&path, content).expect("write fixture");
    path
}

// ---------------------------------------------------------------------------
// Single-key specs
// ---------------------------------------------------------------------------

#[rstest]
#[case("items", "ItemData")]
#[case("equipment", "EquipmentData")]
#[case("evolutions", "EquipmentEvolutionData")]
#[case("materialEnchants", "MaterialEnchantData")]
#[case("enchants", "EquipmentEnchantData")]
#[case("itemStrings", "StrSheet_Item")]
fn client_key_detected(#[case] key: &str, #[case] entity: &str) {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(
        &dir,
        "01_spec.yaml",
        &format!("{key}:\n  - id: 100\n    name: sample\n"),
    );
    let detected = detect_entities(&path).expect("detect");
    assert_eq!(detected.client, BTreeSet::from([entity]));
    assert!(detected.server_only.is_empty());
}

#[rstest]
#[case("passivities")]
#[case("cCompensations")]
#[case("eCompensations")]
#[case("fCompensations")]
#[case("iCompensations")]
fn server_only_key_detected(#[case] key: &str) {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(&dir, "02_spec.yaml", &format!("{key}:\n  - id: 7\n"));
    let detected = detect_entities(&path).expect("detect");
    assert!(detected.client.is_empty());
    assert_eq!(detected.server_only.len(), 1);
    assert!(detected.server_only.contains(key));
}

// ---------------------------------------------------------------------------
// Mixed specs
// ---------------------------------------------------------------------------

#[test]
fn items_with_compensations() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(
        &dir,
        "03_loot.yaml",
        "items:\n  - id: 1\ncCompensations:\n  - id: 2\n",
    );
    let detected = detect_entities(&path).expect("detect");
    assert_eq!(detected.client, BTreeSet::from(["ItemData"]));
    assert_eq!(detected.server_only, BTreeSet::from(["cCompensations"]));
}

#[test]
fn multiple_documents_are_merged() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(
        &dir,
        "04_multi.yaml",
        "items:\n  - id: 1\n---\nenchants:\n  - id: 2\n---\n",
    );
    let detected = detect_entities(&path).expect("detect");
    assert_eq!(
        detected.client,
        BTreeSet::from(["EquipmentEnchantData", "ItemData"])
    );
}

#[test]
fn comment_only_spec_has_no_entities() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(&dir, "05_empty.yaml", "# intentionally empty\n");
    let detected = detect_entities(&path).expect("detect");
    assert!(detected.is_empty());
}

#[test]
fn unmapped_top_level_keys_are_ignored() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(
        &dir,
        "06_other.yaml",
        "version: 2\nzones:\n  - id: 9\nitems: []\n",
    );
    let detected = detect_entities(&path).expect("detect");
    assert_eq!(detected.client, BTreeSet::from(["ItemData"]));
    assert!(detected.server_only.is_empty());
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn sequence_root_is_not_a_mapping() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(&dir, "07_list.yaml", "- items\n- equipment\n");
    let err = detect_entities(&path).unwrap_err();
    assert!(matches!(err, DetectError::NotAMapping { .. }), "got: {err}");
    assert!(err.to_string().contains("07_list.yaml"));
}

#[test]
fn malformed_yaml_reports_parse_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(&dir, "08_broken.yaml", "items: [unclosed\n  - : :\n");
    let err = detect_entities(&path).unwrap_err();
    assert!(matches!(err, DetectError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("08_broken.yaml"));
}

#[test]
fn missing_file_reports_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = detect_entities(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, DetectError::Io { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// Lenient detection
// ---------------------------------------------------------------------------

#[rstest]
#[case::duplicate_key("items:\n  upsert: [1]\nitems:\n  update: [2]\n")]
#[case::bad_escape("items:\n  - id: 1\n    toolTip: \"C:\\path\\to\"\n")]
fn unparsable_spec_falls_back_to_line_scan(#[case] content: &str) {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(&dir, "09_tooltips.yaml", content);
    assert!(detect_entities(&path).is_err());

    let detection = detect_entities_lenient(&path).expect("lenient detect");
    assert_eq!(detection.entities.client, BTreeSet::from(["ItemData"]));
    assert!(
        matches!(detection.fallback, Some(DetectError::Parse { .. })),
        "got: {:?}",
        detection.fallback
    );
}

#[test]
fn lenient_detection_of_valid_spec_has_no_fallback() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_spec(&dir, "10_ok.yaml", "equipment:\n  - id: 3\n");
    let detection = detect_entities_lenient(&path).expect("lenient detect");
    assert_eq!(detection.entities.client, BTreeSet::from(["EquipmentData"]));
    assert!(detection.fallback.is_none());
}

#[test]
fn lenient_detection_still_reports_missing_file() {
    let dir = TempDir::new().expect("tempdir");
    let err = detect_entities_lenient(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, DetectError::Io { .. }), "got: {err}");
}
