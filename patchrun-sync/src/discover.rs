//! Spec discovery — every `.yaml` file under a patch folder, in a fixed order.
//!
//! Ordering is a plain lexical sort of the `/`-separated relative path. Root
//! files sort ahead of subdirectories only because authors give them numeric
//! prefixes; nothing here looks at directory depth.

use std::path::Path;

use patchrun_core::{layout::SPEC_EXTENSION, SpecFile};

use crate::error::{io_err, SyncError};

/// Walk `patch_dir` recursively and return its specs sorted by relative path.
pub fn discover_specs(patch_dir: &Path) -> Result<Vec<SpecFile>, SyncError> {
    let suffix = format!(".{SPEC_EXTENSION}");
    let mut specs = Vec::new();
    walk(patch_dir, patch_dir, &suffix, &mut specs)?;
    sort_specs(&mut specs);
    tracing::debug!(count = specs.len(), dir = %patch_dir.display(), "discovered specs");
    Ok(specs)
}

/// Sort specs into run order.
pub fn sort_specs(specs: &mut [SpecFile]) {
    specs.sort_by(|a, b| a.relative.cmp(&b.relative));
}

/// `(root-level, nested)` spec counts.
pub fn count_by_category<'a, I>(specs: I) -> (usize, usize)
where
    I: IntoIterator<Item = &'a SpecFile>,
{
    specs.into_iter().fold((0, 0), |(root, nested), spec| {
        if spec.is_nested() {
            (root, nested + 1)
        } else {
            (root + 1, nested)
        }
    })
}

/// Root-level specs whose file name does not begin with an ASCII digit.
pub fn unprefixed_root_specs(specs: &[SpecFile]) -> Vec<String> {
    specs
        .iter()
        .filter(|s| !s.is_nested())
        .filter(|s| !s.file_name().starts_with(|c: char| c.is_ascii_digit()))
        .map(|s| s.relative.clone())
        .collect()
}

fn walk(
    patch_dir: &Path,
    dir: &Path,
    suffix: &str,
    out: &mut Vec<SpecFile>,
) -> Result<(), SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            walk(patch_dir, &path, suffix, out)?;
        } else if entry.file_name().to_string_lossy().ends_with(suffix) {
            out.push(SpecFile::new(patch_dir, path));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "items: []\n").unwrap();
    }

    fn spec(rel: &str) -> SpecFile {
        let root = PathBuf::from("patch");
        SpecFile::new(&root, root.join(rel))
    }

    #[test]
    fn sorted_by_relative_path() {
        let dir = TempDir::new().unwrap();
        for rel in [
            "loot/zone_2.yaml",
            "02_equipment.yaml",
            "01_items.yaml",
            "loot/zone_10.yaml",
            "10_strings.yaml",
        ] {
            touch(dir.path(), rel);
        }
        let order: Vec<_> = discover_specs(dir.path())
            .unwrap()
            .into_iter()
            .map(|s| s.relative)
            .collect();
        assert_eq!(
            order,
            vec![
                "01_items.yaml",
                "02_equipment.yaml",
                "10_strings.yaml",
                "loot/zone_10.yaml",
                "loot/zone_2.yaml",
            ]
        );
    }

    #[test]
    fn non_yaml_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "01_items.yaml");
        touch(dir.path(), "notes.md");
        touch(dir.path(), "02_old.yml");
        touch(dir.path(), "03_items.yaml.bak");
        let specs = discover_specs(dir.path()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].relative, "01_items.yaml");
    }

    #[test]
    fn empty_dir_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(discover_specs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_specs(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn counts_root_and_nested() {
        let specs = vec![spec("01_a.yaml"), spec("loot/b.yaml"), spec("loot/deep/c.yaml")];
        assert_eq!(count_by_category(&specs), (1, 2));
    }

    #[test]
    fn unprefixed_only_checks_root_level() {
        let specs = vec![
            spec("01_items.yaml"),
            spec("items.yaml"),
            spec("loot/zone.yaml"),
            spec("_draft.yaml"),
        ];
        assert_eq!(unprefixed_root_specs(&specs), vec!["items.yaml", "_draft.yaml"]);
    }
}
