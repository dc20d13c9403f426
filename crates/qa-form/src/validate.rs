use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::spec::{Constraint, QuestionKind, QuestionSpec};

/// Why an answer was rejected for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub question_id: String,
    pub message: String,
    pub code: String,
}

/// Checks a parsed answer against the question's type, choices and constraint.
pub fn validate_answer(question: &QuestionSpec, value: &Value) -> Option<ValidationError> {
    if !matches_type(question.kind, value) {
        return Some(base_error(question, "type mismatch", "type_mismatch"));
    }

    if question.kind.uses_choices() {
        let choices = question.choices();
        let unknown = match value {
            Value::String(text) => !choices.contains(text),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|text| !choices.iter().any(|choice| choice == text)),
            _ => false,
        };
        if unknown {
            return Some(base_error(question, "invalid choice", "choice_mismatch"));
        }
    }

    if let Some(constraint) = &question.constraint {
        return enforce_constraint(question, value, constraint);
    }

    None
}

fn matches_type(kind: QuestionKind, value: &Value) -> bool {
    match kind {
        QuestionKind::Text | QuestionKind::Select => value.is_string(),
        QuestionKind::Confirm => value.is_boolean(),
        QuestionKind::Integer => value.is_i64(),
        QuestionKind::Number => value.is_number(),
        QuestionKind::Checkbox => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
    }
}

fn enforce_constraint(
    question: &QuestionSpec,
    value: &Value,
    constraint: &Constraint,
) -> Option<ValidationError> {
    if let Some(pattern) = &constraint.pattern
        && let Some(text) = value.as_str()
        && let Ok(regex) = Regex::new(pattern)
        && !regex.is_match(text)
    {
        return Some(base_error(
            question,
            "value does not match pattern",
            "pattern_mismatch",
        ));
    }

    let length = match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    };

    if let Some(min_len) = constraint.min_len
        && let Some(length) = length
        && length < min_len
    {
        return Some(base_error(question, "answer shorter than min length", "min_length"));
    }

    if let Some(max_len) = constraint.max_len
        && let Some(length) = length
        && length > max_len
    {
        return Some(base_error(question, "answer longer than max length", "max_length"));
    }

    if let Some(min) = constraint.min
        && let Some(value) = value.as_f64()
        && value < min
    {
        return Some(base_error(question, "value below minimum", "min"));
    }

    if let Some(max) = constraint.max
        && let Some(value) = value.as_f64()
        && value > max
    {
        return Some(base_error(question, "value above maximum", "max"));
    }

    None
}

fn base_error(question: &QuestionSpec, message: &str, code: &str) -> ValidationError {
    ValidationError {
        question_id: question.id.clone(),
        message: message.into(),
        code: code.into(),
    }
}
