use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A normalized command as recorded in a fixture: an action name plus
/// whatever arguments the host attached to it (spoken form, targets, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseCommand {
    pub action: String,
    #[serde(flatten)]
    pub arguments: Map<String, Value>,
}

impl TestCaseCommand {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn is_action(&self, actions: &[&str]) -> bool {
        actions.contains(&self.action.as_str())
    }

    /// The spoken form, when the host recorded one
    pub fn spoken_form(&self) -> Option<&str> {
        self.arguments.get("spokenForm").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_flatten_beside_action() {
        let command = TestCaseCommand::new("copy")
            .with_argument("spokenForm", "copy air")
            .with_argument("version", 1);

        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "copy", "spokenForm": "copy air", "version": 1})
        );
        assert_eq!(command.spoken_form(), Some("copy air"));
    }

    #[test]
    fn test_is_action() {
        let command = TestCaseCommand::new("paste");
        assert!(command.is_action(&["copy", "paste"]));
        assert!(!command.is_action(&["fold"]));
    }
}
