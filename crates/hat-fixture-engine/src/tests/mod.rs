//! Shared helpers for unit tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;

use crate::recording::{
    EditorState, Mark, RangePlainObject, SelectionPlainObject, Target, TestCaseCommand,
    TestCaseFixture, TestCaseSnapshot, Token, hat_key,
};

pub fn hat(character: &str) -> Target {
    Target::primitive(Mark::decorated_symbol("default", character))
}

/// Hats `a`, `b`, `c` over "alpha", "beta", "gamma"
pub fn hat_table() -> BTreeMap<String, Token> {
    BTreeMap::from([
        (hat_key("default", "a"), Token::new("alpha", RangePlainObject::on_line(0, 0, 5))),
        (hat_key("default", "b"), Token::new("beta", RangePlainObject::on_line(0, 6, 10))),
        (hat_key("default", "c"), Token::new("gamma", RangePlainObject::on_line(1, 0, 5))),
    ])
}

pub fn state_with_text(text: &str) -> EditorState {
    EditorState {
        selections: vec![SelectionPlainObject::cursor(0, 0)],
        ..EditorState::new(text)
    }
}

pub fn sample_fixture(action: &str) -> TestCaseFixture {
    let snapshot = TestCaseSnapshot {
        document_contents: "alpha beta".to_string(),
        selections: vec![SelectionPlainObject::cursor(0, 0)],
        marks: Some(BTreeMap::from([(
            hat_key("default", "a"),
            RangePlainObject::on_line(0, 0, 5),
        )])),
        ..TestCaseSnapshot::default()
    };

    TestCaseFixture {
        language_id: "plaintext".to_string(),
        command: TestCaseCommand::new(action).with_argument("spokenForm", format!("{action} air")),
        marks_to_check: None,
        initial_state: snapshot.clone(),
        final_state: snapshot,
        return_value: Value::Null,
        full_targets: vec![hat("a")],
    }
}

/// Helper function to create a temporary fixtures directory
pub fn create_test_fixtures_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper function to create a file inside a test fixtures directory
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(name);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}
