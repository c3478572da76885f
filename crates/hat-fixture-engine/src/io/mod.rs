use crate::recording::{RecorderError, TestCaseFixture};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const FIXTURE_EXTENSION: &str = "yml";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid fixtures directory: {0}")]
    InvalidFixturesDir(String),
    #[error("Invalid fixture name: {0:?}")]
    InvalidFixtureName(String),
    #[error("Failed to parse fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        source: RecorderError,
    },
    #[error("Failed to encode fixture {path}: {source}")]
    Encode {
        path: PathBuf,
        source: RecorderError,
    },
    #[error("Fixture {path} is inconsistent: {reason}")]
    Inconsistent { path: PathBuf, reason: String },
}

/// One-line description of a checked fixture
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSummary {
    pub path: PathBuf,
    pub action: String,
    pub language_id: String,
    pub target_count: usize,
    pub marks_to_check: usize,
}

/// File stem for a fixture named by its spoken form: "take air past bat"
/// becomes "takeAirPastBat"
pub fn fixture_file_name(name: &str) -> Result<String, IoError> {
    let mut stem = String::with_capacity(name.len());
    for word in name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if stem.is_empty() {
                stem.push(first.to_ascii_lowercase());
            } else {
                stem.push(first.to_ascii_uppercase());
            }
            stem.extend(chars);
        }
    }

    if stem.is_empty() {
        return Err(IoError::InvalidFixtureName(name.to_string()));
    }
    Ok(stem)
}

/// Write `fixture` as `<fixtures_root>/<name>.yml`, never overwriting an
/// existing fixture: clashing names get a numeric suffix
pub fn write_fixture(
    fixtures_root: &Path,
    name: &str,
    fixture: &TestCaseFixture,
) -> Result<PathBuf, IoError> {
    let stem = fixture_file_name(name)?;
    let yaml = fixture.to_yaml().map_err(|source| IoError::Encode {
        path: fixtures_root.join(&stem),
        source,
    })?;

    fs::create_dir_all(fixtures_root).map_err(IoError::Io)?;

    let mut path = fixtures_root.join(format!("{stem}.{FIXTURE_EXTENSION}"));
    let mut suffix = 2;
    // create_new makes claiming a name atomic
    let mut file = loop {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => break file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                path = fixtures_root.join(format!("{stem}{suffix}.{FIXTURE_EXTENSION}"));
                suffix += 1;
            }
            Err(e) => return Err(IoError::Io(e)),
        }
    };

    file.write_all(yaml.as_bytes()).map_err(IoError::Io)?;
    log::info!("wrote fixture {}", path.display());
    Ok(path)
}

/// Read and parse a fixture file
pub fn read_fixture(path: &Path) -> Result<TestCaseFixture, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let yaml = fs::read_to_string(path).map_err(IoError::Io)?;
    TestCaseFixture::from_yaml(&yaml).map_err(|source| IoError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a fixture and verify it survives a serialize/parse round trip and
/// that every mark it checks was captured in its initial state
pub fn check_fixture(path: &Path) -> Result<FixtureSummary, IoError> {
    let fixture = read_fixture(path)?;
    let inconsistent = |reason: String| IoError::Inconsistent {
        path: path.to_path_buf(),
        reason,
    };

    let reparsed = fixture
        .to_yaml()
        .and_then(|yaml| TestCaseFixture::from_yaml(&yaml))
        .map_err(|source| IoError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if reparsed != fixture {
        return Err(inconsistent("does not round-trip".to_string()));
    }

    let marks_to_check = fixture.marks_to_check.as_deref().unwrap_or_default();
    if !marks_to_check.is_empty() {
        let initial_marks = fixture.initial_state.marks.as_ref();
        let missing: Vec<_> = marks_to_check
            .iter()
            .filter(|key| !initial_marks.is_some_and(|marks| marks.contains_key(*key)))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(inconsistent(format!(
                "marks to check missing from initial state: {}",
                missing.join(", ")
            )));
        }
    }

    Ok(FixtureSummary {
        path: path.to_path_buf(),
        action: fixture.command.action.clone(),
        language_id: fixture.language_id.clone(),
        target_count: fixture.full_targets.len(),
        marks_to_check: marks_to_check.len(),
    })
}

/// Scan for fixture files in the fixtures directory
pub fn scan_fixture_files(fixtures_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !fixtures_root.exists() {
        return Err(IoError::InvalidFixturesDir(
            "fixtures directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(fixtures_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == FIXTURE_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_fixtures_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidFixturesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_fixtures_dir, sample_fixture};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("take air past bat", "takeAirPastBat")]
    #[case("copy air", "copyAir")]
    #[case("Chuck   line", "chuckLine")]
    #[case("bring 3 to end", "bring3ToEnd")]
    #[case("fold-funk", "foldFunk")]
    fn test_fixture_file_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(fixture_file_name(name).unwrap(), expected);
    }

    #[test]
    fn test_fixture_file_name_rejects_empty() {
        assert!(matches!(
            fixture_file_name(" -- "),
            Err(IoError::InvalidFixtureName(_))
        ));
    }

    #[test]
    fn test_write_and_read_fixture() {
        let fixtures_dir = create_test_fixtures_dir();
        let fixture = sample_fixture("copy");

        let path = write_fixture(fixtures_dir.path(), "copy air", &fixture).unwrap();

        assert_eq!(path.file_name().unwrap(), "copyAir.yml");
        assert_eq!(read_fixture(&path).unwrap(), fixture);
    }

    #[test]
    fn test_write_fixture_does_not_overwrite() {
        let fixtures_dir = create_test_fixtures_dir();
        let fixture = sample_fixture("copy");

        let first = write_fixture(fixtures_dir.path(), "copy air", &fixture).unwrap();
        let second = write_fixture(fixtures_dir.path(), "copy air", &fixture).unwrap();

        assert_eq!(first.file_name().unwrap(), "copyAir.yml");
        assert_eq!(second.file_name().unwrap(), "copyAir2.yml");
    }

    #[test]
    fn test_write_fixture_keeps_existing_file_contents() {
        let fixtures_dir = create_test_fixtures_dir();
        let existing = create_test_file(&fixtures_dir, "copyAir.yml", "hand edited");
        create_test_file(&fixtures_dir, "copyAir2.yml", "also taken");

        let path = write_fixture(fixtures_dir.path(), "copy air", &sample_fixture("copy")).unwrap();

        assert_eq!(path.file_name().unwrap(), "copyAir3.yml");
        assert_eq!(fs::read_to_string(existing).unwrap(), "hand edited");
        assert_eq!(read_fixture(&path).unwrap(), sample_fixture("copy"));
    }

    #[test]
    fn test_write_fixture_creates_parent_directories() {
        let fixtures_dir = create_test_fixtures_dir();
        let nested = fixtures_dir.path().join("recorded").join("actions");

        let path = write_fixture(&nested, "fold air", &sample_fixture("fold")).unwrap();

        assert!(path.starts_with(&nested));
        assert!(nested.is_dir());
    }

    #[test]
    fn test_read_fixture_not_found() {
        let fixtures_dir = create_test_fixtures_dir();
        let result = read_fixture(&fixtures_dir.path().join("missing.yml"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_read_fixture_parse_error() {
        let fixtures_dir = create_test_fixtures_dir();
        let path = create_test_file(&fixtures_dir, "broken.yml", "languageId: [unclosed");

        let result = read_fixture(&path);
        assert!(matches!(result, Err(IoError::Parse { .. })));
    }

    #[test]
    fn test_check_fixture_summary() {
        let fixtures_dir = create_test_fixtures_dir();
        let mut fixture = sample_fixture("clearAndSetSelection");
        fixture.marks_to_check = Some(vec!["default.a".to_string()]);
        let path = write_fixture(fixtures_dir.path(), "take air", &fixture).unwrap();

        let summary = check_fixture(&path).unwrap();

        assert_eq!(summary.action, "clearAndSetSelection");
        assert_eq!(summary.language_id, "plaintext");
        assert_eq!(summary.target_count, 1);
        assert_eq!(summary.marks_to_check, 1);
    }

    #[test]
    fn test_check_fixture_reports_missing_marks() {
        let fixtures_dir = create_test_fixtures_dir();
        let mut fixture = sample_fixture("clearAndSetSelection");
        fixture.marks_to_check = Some(vec!["default.a".to_string(), "blue.x".to_string()]);
        let path = write_fixture(fixtures_dir.path(), "take air", &fixture).unwrap();

        let error = check_fixture(&path).unwrap_err();

        assert!(matches!(error, IoError::Inconsistent { .. }));
        assert!(error.to_string().contains("blue.x"));
    }

    #[test]
    fn test_scan_fixture_files() {
        // Given a fixtures directory with nested fixtures and other files
        let fixtures_dir = create_test_fixtures_dir();
        create_test_file(&fixtures_dir, "copyAir.yml", "");
        create_test_file(&fixtures_dir, "actions/foldAir.yml", "");
        create_test_file(&fixtures_dir, "notes.md", "# Notes");

        // When scanning for files
        let files = scan_fixture_files(fixtures_dir.path()).unwrap();

        // Then only fixtures are found, sorted
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("actions/foldAir.yml"));
        assert!(files[1].ends_with("copyAir.yml"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = scan_fixture_files(Path::new("/this/path/does/not/exist"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("fixtures directory"));
    }

    #[test]
    fn test_validate_fixtures_dir() {
        let fixtures_dir = create_test_fixtures_dir();
        assert!(validate_fixtures_dir(fixtures_dir.path()).is_ok());
        assert!(matches!(
            validate_fixtures_dir(Path::new("/nonexistent/path")),
            Err(IoError::InvalidFixturesDir(_))
        ));
    }
}
