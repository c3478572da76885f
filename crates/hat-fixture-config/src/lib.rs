use hat_fixture_engine::recording::{
    ExtraSnapshotField, ReadOnlyHatMap, SnapshotProvider, TestCase, TestCaseCommand,
    TestCaseContext, TestCaseOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Failed to write config file at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Where recorded fixtures are written and checked
    pub fixtures_path: PathBuf,
    /// Used when the host cannot report the document's language
    #[serde(default = "default_language_id")]
    pub language_id: String,
    /// Add `timeOffsetSeconds` to every snapshot
    #[serde(default)]
    pub capture_time_offsets: bool,
}

fn default_language_id() -> String {
    "plaintext".to_string()
}

impl Config {
    pub fn new(fixtures_path: PathBuf) -> Self {
        Self {
            fixtures_path,
            language_id: default_language_id(),
            capture_time_offsets: false,
        }
    }

    /// Default location, `~/.config/hat-fixture/config.toml`
    pub fn config_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde("~/.config/hat-fixture").into_owned()).join("config.toml")
    }

    /// `Ok(None)` when no config file exists yet
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let fixtures_path = Self::expand_path(&config.fixtures_path);
        Ok(Some(Config {
            fixtures_path,
            ..config
        }))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, content).map_err(write_error)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(Self::config_path())
    }

    /// Recording options for a test case started now
    pub fn test_case_options(&self, is_hat_token_map_test: bool) -> TestCaseOptions {
        let extra_snapshot_fields = if self.capture_time_offsets {
            vec![ExtraSnapshotField::TimeOffsetSeconds]
        } else {
            Vec::new()
        };

        TestCaseOptions {
            is_hat_token_map_test,
            extra_snapshot_fields,
            ..TestCaseOptions::default()
        }
    }

    /// Context for a new test case. The host's language wins; the configured
    /// one covers documents the host cannot classify.
    pub fn test_case_context(
        &self,
        host_language_id: Option<String>,
        hat_token_map: Arc<dyn ReadOnlyHatMap>,
    ) -> TestCaseContext {
        let language_id = host_language_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.language_id.clone());
        TestCaseContext::new(language_id, hat_token_map)
    }

    pub fn start_test_case(
        &self,
        command: TestCaseCommand,
        context: TestCaseContext,
        provider: Arc<dyn SnapshotProvider>,
        is_hat_token_map_test: bool,
    ) -> TestCase {
        TestCase::new(
            command,
            context,
            provider,
            self.test_case_options(is_hat_token_map_test),
        )
    }

    /// Expand `~` and `$VARS`; a path that fails to expand is kept as written
    fn expand_path(path: &Path) -> PathBuf {
        shellexpand::full(&path.to_string_lossy())
            .map(|expanded| PathBuf::from(expanded.into_owned()))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
