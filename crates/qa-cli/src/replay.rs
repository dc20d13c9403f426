use serde_json::{Map, Value};

use qa_form::{AskError, Question, QuestionId, QuestionSpec, validate_answer};

/// Question that answers from a previously recorded answers file.
pub struct RecordedQuestion {
    id: QuestionId,
    spec: QuestionSpec,
    answer: Option<Value>,
}

impl RecordedQuestion {
    pub fn new(spec: QuestionSpec, recorded: &Map<String, Value>) -> Self {
        let answer = recorded.get(&spec.id).cloned();
        Self {
            id: QuestionId::next(),
            spec,
            answer,
        }
    }
}

impl Question for RecordedQuestion {
    fn id(&self) -> QuestionId {
        self.id
    }

    fn ask(&mut self) -> Result<Value, AskError> {
        let answer = self
            .answer
            .clone()
            .ok_or_else(|| AskError::Invalid(format!("no recorded answer for '{}'", self.spec.id)))?;
        match validate_answer(&self.spec, &answer) {
            Some(error) => Err(AskError::Invalid(format!(
                "recorded answer for '{}' rejected: {}",
                self.spec.id, error.message
            ))),
            None => Ok(answer),
        }
    }

    fn default_value(&self) -> Value {
        self.spec.default_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> QuestionSpec {
        serde_json::from_value(json!({
            "id": "count",
            "type": "integer",
            "message": "How many?",
            "default": 1
        }))
        .unwrap()
    }

    fn recorded(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn replays_valid_answers() {
        let mut question = RecordedQuestion::new(spec(), &recorded(json!({ "count": 3 })));
        assert_eq!(question.ask().unwrap(), json!(3));
        assert_eq!(question.default_value(), json!(1));
    }

    #[test]
    fn missing_or_invalid_answers_fail() {
        let mut question = RecordedQuestion::new(spec(), &recorded(json!({})));
        assert!(matches!(question.ask(), Err(AskError::Invalid(_))));

        let mut question = RecordedQuestion::new(spec(), &recorded(json!({ "count": "three" })));
        let error = question.ask().unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid answer: recorded answer for 'count' rejected: type mismatch"
        );
    }
}
