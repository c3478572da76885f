//! Hat token table access and mark serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::recording::plain::RangePlainObject;

/// Mark key to plain range, as stored in a snapshot's `marks` field.
/// Ordered so serialized fixtures are stable.
pub type SerializedMarks = BTreeMap<String, RangePlainObject>;

/// Key of a hat in the token table: `"<hatStyle>.<character>"`
pub fn hat_key(hat_style: &str, character: &str) -> String {
    format!("{hat_style}.{character}")
}

/// A document token a hat is drawn over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub range: RangePlainObject,
}

impl Token {
    pub fn new(text: impl Into<String>, range: RangePlainObject) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }
}

/// Read-only view of the host's current hat assignment
pub trait ReadOnlyHatMap: Send + Sync {
    /// Every (key, token) pair currently assigned
    fn entries(&self) -> Vec<(String, Token)>;

    fn get_token(&self, key: &str) -> Option<Token>;
}

impl ReadOnlyHatMap for BTreeMap<String, Token> {
    fn entries(&self) -> Vec<(String, Token)> {
        self.iter()
            .map(|(key, token)| (key.clone(), token.clone()))
            .collect()
    }

    fn get_token(&self, key: &str) -> Option<Token> {
        self.get(key).cloned()
    }
}

/// Tokens for `keys` that are present in `hat_map`; unassigned keys are skipped
pub fn extract_targeted_marks(keys: &[String], hat_map: &dyn ReadOnlyHatMap) -> BTreeMap<String, Token> {
    keys.iter()
        .filter_map(|key| hat_map.get_token(key).map(|token| (key.clone(), token)))
        .collect()
}

/// The whole table, used when the assignment itself is under test
pub fn all_marks(hat_map: &dyn ReadOnlyHatMap) -> BTreeMap<String, Token> {
    hat_map.entries().into_iter().collect()
}

pub fn marks_to_plain_object(marks: &BTreeMap<String, Token>) -> SerializedMarks {
    marks
        .iter()
        .map(|(key, token)| (key.clone(), token.range))
        .collect()
}

/// Keep only entries whose key is in `keys`
pub fn pick_marks(marks: &SerializedMarks, keys: &[String]) -> SerializedMarks {
    marks
        .iter()
        .filter(|(key, _)| keys.contains(key))
        .map(|(key, range)| (key.clone(), *range))
        .collect()
}
