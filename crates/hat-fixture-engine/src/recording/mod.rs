/*!
 * # Recording Core Module
 *
 * Turns one command execution into a replayable fixture: a "before" and
 * "after" snapshot of the editor state that command can affect, the marks
 * its targets depend on, and the command's return value.
 *
 * ## Architecture Overview
 *
 * ### 1. Targets are a closed tree
 * - **`Target`** is `Primitive(mark)`, `List(elements)` or `Range(anchor, active)`
 * - The walker and the key extractor match exhaustively; unknown shapes are
 *   rejected when a target is deserialized, never guessed at
 *
 * ### 2. Declarative field relevance
 * - **`EXCLUSION_RULES`** maps each optional snapshot field to the condition
 *   under which it is left out
 * - Clipboard only matters to copy/paste, visible ranges only to fold and
 *   scroll commands, "that"/"source" marks only when a target consumes them
 * - Final snapshots always keep "that"/"source": a command may produce them
 *
 * ### 3. Capture is a capability
 * - The orchestrator never reads host state itself; it asks a
 *   **`SnapshotProvider`** with an explicit **`SnapshotRequest`**
 * - Host objects (marks, hat table, language) arrive through an injected
 *   **`TestCaseContext`**, so tests run without a host
 *
 * ### 4. Strict lifecycle
 * - `Created -> InitialRecorded -> FinalRecorded -> [MarksFiltered]`
 * - Out-of-order calls fail with `RecorderError::IllegalState`
 * - Fixtures are assembled on demand and serialize deterministically
 *
 * ## Module Structure
 *
 * - **`target`**: `Mark`, `Target`, mark-type walker and hat key extraction
 * - **`marks`**: hat token table access and mark serialization
 * - **`plain`**: plain position/range/selection values
 * - **`command`**: the recorded command
 * - **`exclusion`**: field exclusion policy
 * - **`snapshot`**: snapshot record, provider capability, in-memory provider
 * - **`test_case`**: the orchestrator
 * - **`fixture`**: fixture record and YAML form
 *
 * ## Usage Pattern
 *
 * ```rust
 * use std::collections::BTreeMap;
 * use std::sync::Arc;
 * use hat_fixture_engine::recording::*;
 *
 * # tokio_test_block_on(async {
 * let editor = Arc::new(InMemoryEditor::new(EditorState::new("hello world")));
 * let context = TestCaseContext {
 *     language_id: "plaintext".to_string(),
 *     that_mark: Arc::new(ThatMark::new()),
 *     source_mark: Arc::new(ThatMark::new()),
 *     targets: vec![Target::primitive(Mark::decorated_symbol("default", "h"))],
 *     hat_token_map: Arc::new(BTreeMap::<String, Token>::new()),
 * };
 *
 * let mut test_case = TestCase::new(
 *     TestCaseCommand::new("clearAndSetSelection"),
 *     context,
 *     editor.clone(),
 *     TestCaseOptions::default(),
 * );
 *
 * test_case.record_initial_state().await?;
 * editor.update(|state| state.document_contents = " world".to_string());
 * test_case.record_final_state(serde_json::Value::Null).await?;
 *
 * let yaml = test_case.to_yaml()?;
 * assert!(yaml.starts_with("languageId: plaintext"));
 * # Ok::<(), RecorderError>(())
 * # }).unwrap();
 * # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
 * #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
 * # }
 * ```
 */

pub mod command;
pub mod error;
pub mod exclusion;
pub mod fixture;
pub mod marks;
pub mod plain;
pub mod snapshot;
pub mod target;
pub mod test_case;

// Public API re-exports
pub use command::TestCaseCommand;
pub use error::RecorderError;
pub use exclusion::{EXCLUSION_RULES, ExcludedFields, ExclusionRule, SnapshotField, excluded_fields};
pub use fixture::TestCaseFixture;
pub use marks::{ReadOnlyHatMap, SerializedMarks, Token, hat_key};
pub use plain::{PositionPlainObject, RangePlainObject, SelectionPlainObject};
pub use snapshot::{
    EditorState, ExtraSnapshotField, InMemoryEditor, SnapshotError, SnapshotProvider,
    SnapshotRequest, SnapshotTiming, TestCaseSnapshot, ThatMark,
};
pub use target::{
    ListTarget, Mark, MarkType, PrimitiveTarget, RangeTarget, Target, extract_keys,
    extract_target_keys,
};
pub use test_case::{RecordingPhase, TestCase, TestCaseContext, TestCaseOptions};
