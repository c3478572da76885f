//! # Test Case Orchestrator
//!
//! One [`TestCase`] records one command execution. The caller drives it
//! strictly in order:
//!
//! ```text
//! new -> record_initial_state -> (host runs command) -> record_final_state
//!     -> [filter_marks] -> to_yaml
//! ```
//!
//! Each recording step asks the exclusion policy which fields matter, picks
//! the marks to embed and delegates the capture itself to the
//! [`SnapshotProvider`]. A failed capture leaves the test case where it was;
//! nothing partial is ever stored.
//!
//! Hat token map tests are the exception to "marks come from the targets":
//! their subject is the hat assignment itself, so both snapshots embed the
//! whole table and [`TestCase::filter_marks`] narrows it once the follow-up
//! command is known.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::recording::command::TestCaseCommand;
use crate::recording::error::RecorderError;
use crate::recording::exclusion::{ExcludedFields, excluded_fields};
use crate::recording::fixture::TestCaseFixture;
use crate::recording::marks::{
    ReadOnlyHatMap, SerializedMarks, all_marks, extract_targeted_marks, marks_to_plain_object,
    pick_marks,
};
use crate::recording::snapshot::{
    ExtraSnapshotField, SnapshotProvider, SnapshotRequest, SnapshotTiming, TestCaseSnapshot,
    ThatMark,
};
use crate::recording::target::{Target, extract_keys};

/// Host state a test case reads, injected at construction
#[derive(Clone)]
pub struct TestCaseContext {
    pub language_id: String,
    pub that_mark: Arc<ThatMark>,
    pub source_mark: Arc<ThatMark>,
    pub targets: Vec<Target>,
    pub hat_token_map: Arc<dyn ReadOnlyHatMap>,
}

impl TestCaseContext {
    /// Context with no targets and fresh, empty previous-command marks
    pub fn new(language_id: impl Into<String>, hat_token_map: Arc<dyn ReadOnlyHatMap>) -> Self {
        Self {
            language_id: language_id.into(),
            that_mark: Arc::new(ThatMark::new()),
            source_mark: Arc::new(ThatMark::new()),
            targets: Vec::new(),
            hat_token_map,
        }
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    /// Share the host's marks so snapshots see what earlier commands left
    pub fn with_marks(mut self, that_mark: Arc<ThatMark>, source_mark: Arc<ThatMark>) -> Self {
        self.that_mark = that_mark;
        self.source_mark = source_mark;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TestCaseOptions {
    /// Record the full hat assignment instead of the targeted marks
    pub is_hat_token_map_test: bool,
    pub extra_snapshot_fields: Vec<ExtraSnapshotField>,
    /// When the command started; snapshots report offsets from here
    pub start: Instant,
}

impl Default for TestCaseOptions {
    fn default() -> Self {
        Self {
            is_hat_token_map_test: false,
            extra_snapshot_fields: Vec::new(),
            start: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPhase {
    Created,
    InitialRecorded,
    FinalRecorded,
    MarksFiltered,
}

pub struct TestCase {
    command: TestCaseCommand,
    context: TestCaseContext,
    provider: Arc<dyn SnapshotProvider>,
    options: TestCaseOptions,
    full_targets: Vec<Target>,
    target_keys: Vec<String>,
    initial_state: Option<TestCaseSnapshot>,
    final_state: Option<TestCaseSnapshot>,
    return_value: Value,
    marks_to_check: Option<Vec<String>>,
    awaiting_final_mark_info: bool,
    phase: RecordingPhase,
}

impl TestCase {
    pub fn new(
        command: TestCaseCommand,
        context: TestCaseContext,
        provider: Arc<dyn SnapshotProvider>,
        options: TestCaseOptions,
    ) -> Self {
        let full_targets = context.targets.clone();
        let target_keys = extract_keys(&full_targets);
        let awaiting_final_mark_info = options.is_hat_token_map_test;

        log::debug!(
            "new test case for '{}' tracking marks {target_keys:?}",
            command.action
        );

        Self {
            command,
            context,
            provider,
            options,
            full_targets,
            target_keys,
            initial_state: None,
            final_state: None,
            return_value: Value::Null,
            marks_to_check: None,
            awaiting_final_mark_info,
            phase: RecordingPhase::Created,
        }
    }

    pub fn command(&self) -> &TestCaseCommand {
        &self.command
    }

    pub fn language_id(&self) -> &str {
        &self.context.language_id
    }

    pub fn phase(&self) -> RecordingPhase {
        self.phase
    }

    pub fn target_keys(&self) -> &[String] {
        &self.target_keys
    }

    pub fn full_targets(&self) -> &[Target] {
        &self.full_targets
    }

    pub fn initial_state(&self) -> Option<&TestCaseSnapshot> {
        self.initial_state.as_ref()
    }

    pub fn final_state(&self) -> Option<&TestCaseSnapshot> {
        self.final_state.as_ref()
    }

    pub fn return_value(&self) -> &Value {
        &self.return_value
    }

    pub fn marks_to_check(&self) -> Option<&[String]> {
        self.marks_to_check.as_deref()
    }

    /// True while a hat token map test still waits for its follow-up command;
    /// the fixture must not be treated as final until this clears.
    pub fn awaiting_final_mark_info(&self) -> bool {
        self.awaiting_final_mark_info
    }

    pub fn excluded_fields(&self, initial_snapshot: bool) -> ExcludedFields {
        excluded_fields(&self.command, initial_snapshot, &self.full_targets)
    }

    fn marks(&self) -> SerializedMarks {
        let hat_map = self.context.hat_token_map.as_ref();
        let marks = if self.options.is_hat_token_map_test {
            // Whole table; narrowed later by filter_marks
            all_marks(hat_map)
        } else {
            extract_targeted_marks(&self.target_keys, hat_map)
        };
        marks_to_plain_object(&marks)
    }

    async fn take_snapshot(
        &self,
        excluded: &ExcludedFields,
        marks: Option<&SerializedMarks>,
    ) -> Result<TestCaseSnapshot, RecorderError> {
        let request = SnapshotRequest {
            excluded,
            extra_fields: &self.options.extra_snapshot_fields,
            marks,
            that_mark: &self.context.that_mark,
            source_mark: &self.context.source_mark,
            timing: SnapshotTiming {
                start: self.options.start,
            },
        };
        Ok(self.provider.take_snapshot(request).await?)
    }

    pub async fn record_initial_state(&mut self) -> Result<(), RecorderError> {
        if self.phase != RecordingPhase::Created {
            return Err(RecorderError::IllegalState(
                "Initial state has already been recorded",
            ));
        }

        let excluded = self.excluded_fields(true);
        let marks = self.marks();
        let snapshot = self.take_snapshot(&excluded, Some(&marks)).await?;

        self.initial_state = Some(snapshot);
        self.phase = RecordingPhase::InitialRecorded;
        log::debug!(
            "recorded initial state for '{}' without {excluded}",
            self.command.action
        );
        Ok(())
    }

    /// Record the state after the command ran. Marks are only captured for
    /// hat token map tests, where the new assignment is what gets checked.
    pub async fn record_final_state(&mut self, return_value: Value) -> Result<(), RecorderError> {
        if self.phase != RecordingPhase::InitialRecorded {
            return Err(RecorderError::IllegalState(
                "Initial state must be recorded before final state",
            ));
        }

        let excluded = self.excluded_fields(false);
        let marks = self.options.is_hat_token_map_test.then(|| self.marks());
        let snapshot = self.take_snapshot(&excluded, marks.as_ref()).await?;

        self.return_value = return_value;
        self.final_state = Some(snapshot);
        self.phase = RecordingPhase::FinalRecorded;
        log::debug!(
            "recorded final state for '{}' without {excluded}",
            self.command.action
        );
        Ok(())
    }

    /// Narrow both snapshots' marks to the keys this test and the follow-up
    /// `next_command` depend on. Keys missing from a snapshot stay missing.
    pub fn filter_marks(
        &mut self,
        next_command: &TestCaseCommand,
        context: &TestCaseContext,
    ) -> Result<(), RecorderError> {
        let (Some(initial_state), Some(final_state)) =
            (self.initial_state.as_mut(), self.final_state.as_mut())
        else {
            return Err(RecorderError::IllegalState(
                "Both snapshots must be taken before filtering marks",
            ));
        };

        let marks_to_check = extract_keys(&context.targets);
        let mut keys = self.target_keys.clone();
        for key in &marks_to_check {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }

        for snapshot in [initial_state, final_state] {
            if let Some(marks) = snapshot.marks.as_mut() {
                *marks = pick_marks(marks, &keys);
            }
        }

        log::debug!(
            "filtered marks to {keys:?} for follow-up command '{}'",
            next_command.action
        );

        self.marks_to_check = Some(marks_to_check);
        self.awaiting_final_mark_info = false;
        self.phase = RecordingPhase::MarksFiltered;
        Ok(())
    }

    /// Assemble the fixture record. Fails until both snapshots exist.
    pub fn fixture(&self) -> Result<TestCaseFixture, RecorderError> {
        let (Some(initial_state), Some(final_state)) = (&self.initial_state, &self.final_state)
        else {
            return Err(RecorderError::IllegalState(
                "Two snapshots must be taken before serializing",
            ));
        };

        log::debug!("assembling fixture for '{}'", self.command.action);
        Ok(TestCaseFixture {
            language_id: self.context.language_id.clone(),
            command: self.command.clone(),
            marks_to_check: self.marks_to_check.clone(),
            initial_state: initial_state.clone(),
            final_state: final_state.clone(),
            return_value: self.return_value.clone(),
            full_targets: self.full_targets.clone(),
        })
    }

    pub fn to_yaml(&self) -> Result<String, RecorderError> {
        self.fixture()?.to_yaml()
    }
}
