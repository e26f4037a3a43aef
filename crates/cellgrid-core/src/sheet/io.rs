use super::Sheet;
use crate::error::{GridError, Result};
use crate::storage::{parse_grd, read_grd_version, write_grd};
use cellgrid_engine::engine::NamePolicy;
use log::info;
use std::path::{Path, PathBuf};

impl Sheet {
    /// Create a sheet and load `path` if it exists.
    ///
    /// A path that does not exist yet becomes the save target of an empty sheet.
    pub fn with_file(path: Option<PathBuf>, policy: NamePolicy, version: &str) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load(&p, policy, version),
            Some(p) => {
                let mut sheet = Self::with_policy(policy, version);
                sheet.file_path = Some(p);
                Ok(sheet)
            }
            None => Ok(Self::with_policy(policy, version)),
        }
    }

    /// Load a sheet from a `.grd` file.
    ///
    /// Every entry is replayed through [`Sheet::set_contents`], so the graph
    /// and cached values are rebuilt exactly as if typed in. Fails if the file
    /// declares a version other than `version`.
    pub fn load(path: &Path, policy: NamePolicy, version: &str) -> Result<Self> {
        let parsed = parse_grd(path)?;
        if let Some(found) = parsed.version
            && found != version
        {
            return Err(GridError::VersionMismatch {
                expected: version.to_string(),
                found,
            });
        }

        let mut sheet = Self::with_policy(policy, version);
        for entry in &parsed.entries {
            sheet
                .set_contents(&entry.name, &entry.input)
                .map_err(|e| GridError::Parse {
                    line: entry.line,
                    message: e.to_string(),
                })?;
        }

        sheet.file_path = Some(path.to_path_buf());
        sheet.modified = false;
        sheet.undo_stack.clear();
        sheet.redo_stack.clear();
        info!("loaded {} cells from {}", sheet.len(), path.display());
        Ok(sheet)
    }

    /// Save to `path` and make it the current file path.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        write_grd(path, self)?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        info!("saved {} cells to {}", self.len(), path.display());
        Ok(())
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(GridError::NoFilePath);
        };
        self.save(&path)?;
        Ok(path)
    }

    /// Version label recorded in a saved file, if any.
    pub fn saved_version(path: &Path) -> Result<Option<String>> {
        read_grd_version(path)
    }
}

#[cfg(test)]
mod tests {
    use super::Sheet;
    use crate::error::GridError;
    use cellgrid_engine::engine::{CellValue, EvalError, NamePolicy};
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "cellgrid_{}_{}_{}_{:?}.grd",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            std::thread::current().id(),
        ))
    }

    struct Cleanup(PathBuf);
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("round_trip");
        let _cleanup = Cleanup(path.clone());

        let mut sheet = Sheet::new();
        // Forward reference: C is written before its dependee D exists.
        sheet.set_contents("C", "=D * 2").unwrap();
        sheet.set_contents("A", "1.5").unwrap();
        sheet.set_contents("B", "=A + C").unwrap();
        sheet.set_contents("D", "4").unwrap();
        sheet.set_contents("E", "say \"hi\"").unwrap();
        sheet.set_contents("F", "=1/0").unwrap();
        sheet.save(&path).unwrap();
        assert!(!sheet.is_modified());

        let loaded = Sheet::load(&path, NamePolicy::default(), "default").unwrap();
        assert_eq!(loaded.nonempty_cells(), sheet.nonempty_cells());
        for name in sheet.nonempty_cells() {
            assert_eq!(loaded.value(&name), sheet.value(&name), "value of {}", name);
            assert_eq!(loaded.content(&name), sheet.content(&name), "content of {}", name);
        }
        assert_eq!(loaded.graph(), sheet.graph());
        assert!(!loaded.is_modified());
        assert!(!loaded.can_undo());
        assert_eq!(loaded.file_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_large_literals_survive_save_and_load() {
        let path = temp_path("large_literal");
        let _cleanup = Cleanup(path.clone());

        let mut sheet = Sheet::new();
        assert!(matches!(
            sheet.set_contents("A", "=1e400 + 1"),
            Err(GridError::MalformedFormula { .. })
        ));
        assert!(sheet.is_empty());

        sheet.set_contents("B", "=1.7976931348623157e308 * 10").unwrap();
        sheet.set_contents("inf", "=1e300 * 2").unwrap();
        assert_eq!(sheet.value("B"), CellValue::Error(EvalError::NonFinite));
        sheet.save(&path).unwrap();

        let loaded = Sheet::load(&path, NamePolicy::default(), "default").unwrap();
        assert_eq!(loaded.value("B"), CellValue::Error(EvalError::NonFinite));
        assert_eq!(loaded.value("inf"), CellValue::Number(2e300));
        assert_eq!(loaded.content("B"), sheet.content("B"));
        assert!(loaded.direct_dependents("inf").is_empty());
    }

    #[test]
    fn test_version_is_recorded_and_checked() {
        let path = temp_path("version");
        let _cleanup = Cleanup(path.clone());

        let mut sheet = Sheet::with_policy(NamePolicy::default(), "v2");
        sheet.set_contents("A", "1").unwrap();
        sheet.save(&path).unwrap();

        assert_eq!(Sheet::saved_version(&path).unwrap(), Some("v2".to_string()));
        assert!(Sheet::load(&path, NamePolicy::default(), "v2").is_ok());
        assert!(matches!(
            Sheet::load(&path, NamePolicy::default(), "v3"),
            Err(GridError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_saved_version_of_unloadable_file() {
        let path = temp_path("version_only");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "@version v9\nA: not quoted\n").unwrap();

        assert_eq!(Sheet::saved_version(&path).unwrap(), Some("v9".to_string()));
        assert!(matches!(
            Sheet::load(&path, NamePolicy::default(), "v9"),
            Err(GridError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_load_reports_failing_line() {
        let path = temp_path("bad_line");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "A: =B\nB: =A\n").unwrap();

        match Sheet::load(&path, NamePolicy::default(), "default") {
            Err(GridError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("Circular"));
            }
            other => panic!("Expected parse error, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = temp_path("missing");
        assert!(matches!(
            Sheet::load(&path, NamePolicy::default(), "default"),
            Err(GridError::Io(_))
        ));
    }

    #[test]
    fn test_with_file_for_new_path() {
        let path = temp_path("new");
        let mut sheet =
            Sheet::with_file(Some(path.clone()), NamePolicy::default(), "default").unwrap();
        assert!(sheet.is_empty());
        assert_eq!(sheet.file_path.as_deref(), Some(path.as_path()));

        let _cleanup = Cleanup(path.clone());
        sheet.set_contents("A", "1").unwrap();
        assert_eq!(sheet.save_file().unwrap(), path);
        assert!(!sheet.is_modified());
    }

    #[test]
    fn test_save_file_without_path() {
        let mut sheet = Sheet::new();
        assert!(matches!(sheet.save_file(), Err(GridError::NoFilePath)));
    }
}
