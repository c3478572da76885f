//! The persisted fixture record and its YAML form.
//!
//! Field order in the output follows the struct declaration and mark maps are
//! ordered by key, so serializing the same fixture twice yields the same bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::recording::command::TestCaseCommand;
use crate::recording::error::RecorderError;
use crate::recording::snapshot::TestCaseSnapshot;
use crate::recording::target::Target;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseFixture {
    pub language_id: String,
    pub command: TestCaseCommand,
    /// Marks the follow-up command checks; only set for hat token map tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks_to_check: Option<Vec<String>>,
    pub initial_state: TestCaseSnapshot,
    pub final_state: TestCaseSnapshot,
    #[serde(default)]
    pub return_value: Value,
    /// Inferred full targets, kept for context
    pub full_targets: Vec<Target>,
}

impl TestCaseFixture {
    pub fn to_yaml(&self) -> Result<String, RecorderError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RecorderError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
