use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::question::QuestionId;

/// Lookup alias for an answered field: its key or the question that asked it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKey {
    Name(String),
    Question(QuestionId),
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKey::Name(name) => f.write_str(name),
            ValueKey::Question(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for ValueKey {
    fn from(value: &str) -> Self {
        ValueKey::Name(value.to_string())
    }
}

impl From<String> for ValueKey {
    fn from(value: String) -> Self {
        ValueKey::Name(value)
    }
}

impl From<&String> for ValueKey {
    fn from(value: &String) -> Self {
        ValueKey::Name(value.clone())
    }
}

impl From<QuestionId> for ValueKey {
    fn from(value: QuestionId) -> Self {
        ValueKey::Question(value)
    }
}

/// Why a skip condition could not produce a boolean.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// The condition needs an answer that has not been collected yet.
    #[error("answer for '{0}' is not available yet")]
    Missing(ValueKey),
    /// The condition itself is broken, independent of answer availability.
    #[error("{message}")]
    Invalid { message: String },
}

impl ConditionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConditionError::Invalid {
            message: message.into(),
        }
    }
}

/// Read-only snapshot of the answers known when a condition is evaluated.
///
/// Every answered field is reachable under both its key and its question
/// identity; both aliases always hold the same answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    entries: BTreeMap<ValueKey, Value>,
    fields: usize,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one answered field under both of its aliases.
    pub fn record(&mut self, key: &str, question: QuestionId, answer: Value) {
        self.entries
            .insert(ValueKey::Question(question), answer.clone());
        if self
            .entries
            .insert(ValueKey::Name(key.to_string()), answer)
            .is_none()
        {
            self.fields += 1;
        }
    }

    pub fn get(&self, key: impl Into<ValueKey>) -> Result<&Value, ConditionError> {
        let key = key.into();
        match self.entries.get(&key) {
            Some(value) => Ok(value),
            None => Err(ConditionError::Missing(key)),
        }
    }

    pub fn contains(&self, key: impl Into<ValueKey>) -> bool {
        self.entries.contains_key(&key.into())
    }

    /// Number of answered fields (not aliases).
    pub fn len(&self) -> usize {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answers_are_reachable_by_key_and_question() {
        let id = QuestionId::next();
        let mut values = Values::new();
        values.record("color", id, json!("blue"));

        assert_eq!(values.get("color").unwrap(), &json!("blue"));
        assert_eq!(values.get(id).unwrap(), &json!("blue"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn missing_answers_report_the_requested_alias() {
        let values = Values::new();
        assert_eq!(
            values.get("shade"),
            Err(ConditionError::Missing(ValueKey::Name("shade".into())))
        );
        assert!(!values.contains("shade"));
        assert!(values.is_empty());
    }
}
