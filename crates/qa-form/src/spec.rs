use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::SkipCondition;
use crate::expr::Expr;
use crate::form::{Form, FormField};
use crate::question::Question;
use crate::validate::validate_answer;

/// Kind of prompt a question is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text.
    Text,
    /// Yes/no.
    Confirm,
    /// One item out of `choices`.
    Select,
    /// Any subset of `choices`.
    Checkbox,
    Integer,
    Number,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Confirm => "confirm",
            QuestionKind::Select => "select",
            QuestionKind::Checkbox => "checkbox",
            QuestionKind::Integer => "integer",
            QuestionKind::Number => "number",
        }
    }

    pub fn uses_choices(&self) -> bool {
        matches!(self, QuestionKind::Select | QuestionKind::Checkbox)
    }
}

/// Limits applied to an answer after it has been parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// One question of a form file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    /// Key of the answer in the resulting record.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Recorded when the question is skipped or the user accepts it with an empty line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    /// Skip the question, recording its default, when this holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_if: Option<Expr>,
}

impl QuestionSpec {
    pub fn choices(&self) -> &[String] {
        self.choices.as_deref().unwrap_or_default()
    }

    /// The configured default, or `null` when none is set.
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }
}

/// Top-level form file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<QuestionSpec>,
}

/// Problem found by [`FormSpec::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecIssue {
    pub question_id: String,
    pub message: String,
}

impl FormSpec {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn json_schema() -> Value {
        serde_json::to_value(schemars::schema_for!(FormSpec)).unwrap_or(Value::Null)
    }

    pub fn question(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// Builds a form with one field per question, in file order, using
    /// `bind` to create the question that will be asked.
    pub fn build_form<F>(&self, mut bind: F) -> Form
    where
        F: FnMut(&QuestionSpec) -> Box<dyn Question>,
    {
        let mut form = Form::new(
            self.questions
                .iter()
                .map(|question| FormField::boxed(question.id.clone(), bind(question))),
        );
        form.skip_conditions(self.questions.iter().filter_map(|question| {
            question
                .skip_if
                .clone()
                .map(|expr| (question.id.clone(), SkipCondition::from(expr)))
        }));
        form
    }

    /// Static checks that do not need answers.
    ///
    /// Skip conditions are not inspected: unsatisfiable conditions only
    /// surface when the form is resolved.
    pub fn check(&self) -> Vec<SpecIssue> {
        let mut issues = Vec::new();
        let mut seen = BTreeSet::new();

        for question in &self.questions {
            let mut report = |message: String| {
                issues.push(SpecIssue {
                    question_id: question.id.clone(),
                    message,
                })
            };

            if !seen.insert(question.id.as_str()) {
                report("duplicate question id".into());
            }
            if question.kind.uses_choices() && question.choices().is_empty() {
                report(format!(
                    "{} questions require at least one choice",
                    question.kind.as_str()
                ));
            }
            if let Some(pattern) = question
                .constraint
                .as_ref()
                .and_then(|constraint| constraint.pattern.as_ref())
                && let Err(err) = regex::Regex::new(pattern)
            {
                report(format!("invalid pattern: {err}"));
            }
            if let Some(default) = &question.default
                && let Some(error) = validate_answer(question, default)
            {
                report(format!("default value rejected: {}", error.message));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(questions: Value) -> FormSpec {
        serde_json::from_value(json!({
            "id": "demo",
            "title": "Demo",
            "questions": questions
        }))
        .unwrap()
    }

    #[test]
    fn parses_skip_conditions() {
        let spec = spec(json!([
            { "id": "color", "type": "select", "message": "Color?", "choices": ["red", "blue"], "default": "red" },
            {
                "id": "shade", "type": "text", "message": "Shade?", "default": "none",
                "skip_if": {
                    "op": "eq",
                    "left": { "kind": "answer", "key": "color" },
                    "right": { "kind": "literal", "value": "red" }
                }
            }
        ]));
        let shade = spec.question("shade").unwrap();
        assert_eq!(shade.default_value(), json!("none"));
        assert_eq!(shade.skip_if.as_ref().unwrap().referenced_keys(), vec!["color"]);
        assert!(spec.check().is_empty());
    }

    #[test]
    fn check_reports_structural_problems() {
        let spec = spec(json!([
            { "id": "a", "type": "select", "message": "A?" },
            { "id": "a", "type": "confirm", "message": "Again?", "default": "maybe" },
            { "id": "b", "type": "text", "message": "B?", "constraint": { "pattern": "(" } }
        ]));
        let issues = spec.check();
        let messages: Vec<_> = issues
            .iter()
            .map(|issue| (issue.question_id.as_str(), issue.message.as_str()))
            .collect();

        assert!(messages.contains(&("a", "select questions require at least one choice")));
        assert!(messages.contains(&("a", "duplicate question id")));
        assert!(messages.contains(&("a", "default value rejected: type mismatch")));
        assert!(messages.iter().any(|(id, message)| *id == "b" && message.starts_with("invalid pattern")));
    }

    #[test]
    fn schema_describes_questions() {
        let schema = FormSpec::json_schema();
        let text = schema.to_string();
        assert!(text.contains("questions"));
        assert!(text.contains("skip_if"));
    }
}
