//! # Editor State Snapshots
//!
//! A [`TestCaseSnapshot`] is a point-in-time capture of the bounded subset of
//! editor state a fixture cares about. Capturing live state belongs to the
//! host, so the orchestrator only ever talks to a [`SnapshotProvider`]; it
//! hands the provider a [`SnapshotRequest`] naming the fields to omit, the
//! marks to embed and the timing reference, and gets a finished snapshot back.
//!
//! [`EditorState`] and [`InMemoryEditor`] are a plain-data provider for hosts
//! that can hand over their state up front, and for tests.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recording::exclusion::{ExcludedFields, SnapshotField};
use crate::recording::marks::SerializedMarks;
use crate::recording::plain::{RangePlainObject, SelectionPlainObject};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Host failed to report editor state: {0}")]
    Host(String),
}

/// Optional fields a test case can ask for beyond the default set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtraSnapshotField {
    TimeOffsetSeconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseSnapshot {
    pub document_contents: String,
    pub selections: Vec<SelectionPlainObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_ranges: Option<Vec<RangePlainObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<SerializedMarks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub that_mark: Option<Vec<SelectionPlainObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_mark: Option<Vec<SelectionPlainObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_offset_seconds: Option<f64>,
}

/// Holder for the "that" or "source" mark: the selections the previous
/// command produced. Empty until a command sets it.
#[derive(Debug, Default)]
pub struct ThatMark {
    selections: Mutex<Option<Vec<SelectionPlainObject>>>,
}

impl ThatMark {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, selections: Vec<SelectionPlainObject>) {
        *self.lock() = Some(selections);
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn get(&self) -> Option<Vec<SelectionPlainObject>> {
        self.lock().clone()
    }

    pub fn exists(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<SelectionPlainObject>>> {
        self.selections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reference point for `timeOffsetSeconds`
#[derive(Debug, Clone, Copy)]
pub struct SnapshotTiming {
    pub start: Instant,
}

impl SnapshotTiming {
    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Everything a provider needs to produce one snapshot
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRequest<'a> {
    pub excluded: &'a ExcludedFields,
    pub extra_fields: &'a [ExtraSnapshotField],
    pub marks: Option<&'a SerializedMarks>,
    pub that_mark: &'a ThatMark,
    pub source_mark: &'a ThatMark,
    pub timing: SnapshotTiming,
}

impl SnapshotRequest<'_> {
    pub fn wants(&self, field: SnapshotField) -> bool {
        self.excluded.includes(field)
    }

    pub fn wants_extra(&self, field: ExtraSnapshotField) -> bool {
        self.extra_fields.contains(&field)
    }
}

/// Capability to read the host's live editor state.
///
/// Implementations may suspend while the host settles. Failures are returned
/// as-is to the caller of the recording operation; there is no retry.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn take_snapshot(
        &self,
        request: SnapshotRequest<'_>,
    ) -> Result<TestCaseSnapshot, SnapshotError>;
}

/// Plain copy of the host state a snapshot can draw from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub document_contents: String,
    pub selections: Vec<SelectionPlainObject>,
    pub clipboard: String,
    pub visible_ranges: Vec<RangePlainObject>,
}

impl EditorState {
    pub fn new(document_contents: impl Into<String>) -> Self {
        Self {
            document_contents: document_contents.into(),
            ..Self::default()
        }
    }

    /// Project this state onto the fields `request` asks for
    pub fn project(&self, request: &SnapshotRequest<'_>) -> TestCaseSnapshot {
        let mut snapshot = TestCaseSnapshot {
            document_contents: self.document_contents.clone(),
            selections: self.selections.clone(),
            marks: request.marks.cloned(),
            ..TestCaseSnapshot::default()
        };

        if request.wants(SnapshotField::Clipboard) {
            snapshot.clipboard = Some(self.clipboard.clone());
        }
        if request.wants(SnapshotField::VisibleRanges) {
            snapshot.visible_ranges = Some(self.visible_ranges.clone());
        }
        if request.wants(SnapshotField::ThatMark) {
            snapshot.that_mark = request.that_mark.get();
        }
        if request.wants(SnapshotField::SourceMark) {
            snapshot.source_mark = request.source_mark.get();
        }
        if request.wants_extra(ExtraSnapshotField::TimeOffsetSeconds) {
            snapshot.time_offset_seconds = Some(request.timing.elapsed_seconds());
        }

        snapshot
    }
}

/// Provider over an [`EditorState`] the caller updates between recordings
#[derive(Debug, Default)]
pub struct InMemoryEditor {
    state: Mutex<EditorState>,
}

impl InMemoryEditor {
    pub fn new(state: EditorState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn update(&self, edit: impl FnOnce(&mut EditorState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        edit(&mut *state);
    }

    pub fn state(&self) -> EditorState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SnapshotProvider for InMemoryEditor {
    async fn take_snapshot(
        &self,
        request: SnapshotRequest<'_>,
    ) -> Result<TestCaseSnapshot, SnapshotError> {
        Ok(self.state().project(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::plain::PositionPlainObject;
    use pretty_assertions::assert_eq;

    fn state() -> EditorState {
        EditorState {
            document_contents: "hello world".to_string(),
            selections: vec![SelectionPlainObject::cursor(0, 5)],
            clipboard: "copied".to_string(),
            visible_ranges: vec![RangePlainObject::on_line(0, 0, 11)],
        }
    }

    fn request<'a>(
        excluded: &'a ExcludedFields,
        extra_fields: &'a [ExtraSnapshotField],
        that_mark: &'a ThatMark,
        source_mark: &'a ThatMark,
    ) -> SnapshotRequest<'a> {
        SnapshotRequest {
            excluded,
            extra_fields,
            marks: None,
            that_mark,
            source_mark,
            timing: SnapshotTiming {
                start: Instant::now(),
            },
        }
    }

    #[test]
    fn test_project_omits_excluded_fields() {
        let excluded: ExcludedFields = [SnapshotField::Clipboard, SnapshotField::VisibleRanges]
            .into_iter()
            .collect();
        let that_mark = ThatMark::new();
        that_mark.set(vec![SelectionPlainObject::cursor(0, 0)]);
        let source_mark = ThatMark::new();

        let snapshot = state().project(&request(&excluded, &[], &that_mark, &source_mark));

        assert_eq!(snapshot.clipboard, None);
        assert_eq!(snapshot.visible_ranges, None);
        assert_eq!(snapshot.that_mark, Some(vec![SelectionPlainObject::cursor(0, 0)]));
        assert_eq!(snapshot.source_mark, None);
        assert_eq!(snapshot.time_offset_seconds, None);
        assert_eq!(snapshot.document_contents, "hello world");
    }

    #[test]
    fn test_project_includes_requested_fields() {
        let excluded = ExcludedFields::default();
        let mark = ThatMark::new();

        let snapshot = state().project(&request(
            &excluded,
            &[ExtraSnapshotField::TimeOffsetSeconds],
            &mark,
            &mark,
        ));

        assert_eq!(snapshot.clipboard.as_deref(), Some("copied"));
        assert_eq!(
            snapshot.visible_ranges,
            Some(vec![RangePlainObject::on_line(0, 0, 11)])
        );
        assert!(snapshot.time_offset_seconds.is_some_and(|t| t >= 0.0));
    }

    #[test]
    fn test_that_mark_lifecycle() {
        let mark = ThatMark::new();
        assert!(!mark.exists());

        let selection = SelectionPlainObject::new(
            PositionPlainObject::new(1, 0),
            PositionPlainObject::new(1, 4),
        );
        mark.set(vec![selection]);
        assert_eq!(mark.get(), Some(vec![selection]));

        mark.clear();
        assert_eq!(mark.get(), None);
    }

    #[test]
    fn test_snapshot_skips_absent_fields_when_serialized() {
        let snapshot = TestCaseSnapshot {
            document_contents: "abc".to_string(),
            selections: vec![SelectionPlainObject::cursor(0, 3)],
            ..TestCaseSnapshot::default()
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["documentContents", "selections"]);
    }

    #[tokio::test]
    async fn test_in_memory_editor_reflects_updates() {
        let editor = InMemoryEditor::new(state());
        let excluded = ExcludedFields::default();
        let mark = ThatMark::new();

        editor.update(|state| state.document_contents = "changed".to_string());
        let snapshot = editor
            .take_snapshot(request(&excluded, &[], &mark, &mark))
            .await
            .unwrap();

        assert_eq!(snapshot.document_contents, "changed");
        assert_eq!(editor.state().clipboard, "copied");
    }
}
