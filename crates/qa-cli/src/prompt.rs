use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use qa_form::{AskError, Question, QuestionId, QuestionKind, QuestionSpec, validate_answer};
use serde_json::{Number, Value};
use tracing::debug;

use crate::presenter::{self, AnswerParseError, Verbosity};

/// Line-oriented terminal shared by every question of a form.
pub struct Console {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    interrupted: Arc<AtomicBool>,
    verbosity: Verbosity,
}

pub type SharedConsole = Rc<RefCell<Console>>;

impl Console {
    pub fn new(
        input: Box<dyn BufRead>,
        output: Box<dyn Write>,
        interrupted: Arc<AtomicBool>,
        verbosity: Verbosity,
    ) -> SharedConsole {
        Rc::new(RefCell::new(Self {
            input,
            output,
            interrupted,
            verbosity,
        }))
    }

    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    /// Reads one line; end of input or a received Ctrl-C counts as a cancel.
    fn read_line(&mut self) -> Result<String, AskError> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if self.interrupted.load(Ordering::SeqCst) || read == 0 {
            writeln!(self.output)?;
            return Err(AskError::Interrupted);
        }
        Ok(line)
    }
}

/// Question bound to a terminal prompt.
pub struct TerminalQuestion {
    id: QuestionId,
    spec: QuestionSpec,
    console: SharedConsole,
}

impl TerminalQuestion {
    pub fn new(spec: QuestionSpec, console: SharedConsole) -> Self {
        Self {
            id: QuestionId::next(),
            spec,
            console,
        }
    }
}

impl Question for TerminalQuestion {
    fn id(&self) -> QuestionId {
        self.id
    }

    fn ask(&mut self) -> Result<Value, AskError> {
        let mut console = self.console.borrow_mut();
        let verbosity = console.verbosity;
        loop {
            presenter::show_prompt(console.output(), &self.spec, verbosity)?;
            let line = console.read_line()?;
            let parsed = parse_answer(&self.spec, line.trim()).and_then(|value| {
                match validate_answer(&self.spec, &value) {
                    Some(error) => Err(AnswerParseError::new(
                        format!("{}.", capitalize(&error.message)),
                        Some(error.code),
                    )),
                    None => Ok(value),
                }
            });
            match parsed {
                Ok(value) => {
                    debug!(question = %self.spec.id, "answer accepted");
                    return Ok(value);
                }
                Err(err) => presenter::show_parse_error(console.output(), &err, verbosity)?,
            }
        }
    }

    fn default_value(&self) -> Value {
        self.spec.default_value()
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parses one line of input for `question`; an empty line takes the default.
pub fn parse_answer(question: &QuestionSpec, raw: &str) -> Result<Value, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        if let Some(default) = question.default.as_ref().filter(|value| !value.is_null()) {
            return Ok(default.clone());
        }
        return match question.kind {
            QuestionKind::Text => Ok(Value::String(String::new())),
            QuestionKind::Checkbox => Ok(Value::Array(Vec::new())),
            _ => Err(AnswerParseError::new(
                "This question requires an answer.",
                None,
            )),
        };
    }

    match question.kind {
        QuestionKind::Text => Ok(Value::String(raw.to_string())),
        QuestionKind::Confirm => parse_boolean(raw),
        QuestionKind::Integer => parse_integer(raw),
        QuestionKind::Number => parse_number(raw),
        QuestionKind::Select => parse_choice(question.choices(), raw).map(Value::String),
        QuestionKind::Checkbox => parse_checkbox(question.choices(), raw),
    }
}

fn parse_boolean(raw: &str) -> Result<Value, AnswerParseError> {
    match raw.to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
        "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
        _ => Err(AnswerParseError::new(
            "Please enter yes or no.",
            Some("expected boolean (y/n/true/false)".to_string()),
        )),
    }
}

fn parse_integer(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<i64>()
        .map(Number::from)
        .map(Value::Number)
        .map_err(|_| {
            AnswerParseError::new(
                "Please enter a whole number.",
                Some("expected integer".to_string()),
            )
        })
}

fn parse_number(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<f64>()
        .map_err(|_| {
            AnswerParseError::new(
                "Please enter a number.",
                Some("expected number".to_string()),
            )
        })
        .and_then(|value| {
            Number::from_f64(value).map(Value::Number).ok_or_else(|| {
                AnswerParseError::new(
                    "Please enter a finite number.",
                    Some("number must be finite".to_string()),
                )
            })
        })
}

/// Accepts a choice label (case-insensitive) or its 1-based position.
/// A matching label wins over a position.
fn parse_choice(choices: &[String], raw: &str) -> Result<String, AnswerParseError> {
    if let Some(choice) = choices.iter().find(|choice| choice.eq_ignore_ascii_case(raw)) {
        return Ok(choice.clone());
    }
    raw.parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| choices.get(index))
        .cloned()
        .ok_or_else(|| {
            AnswerParseError::new(
                format!("Choose one of: {}.", choices.join(", ")),
                Some(format!("allowed values: {}", choices.join(", "))),
            )
        })
}

fn parse_checkbox(choices: &[String], raw: &str) -> Result<Value, AnswerParseError> {
    let mut selected: Vec<String> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let choice = parse_choice(choices, part)?;
        if !selected.contains(&choice) {
            selected.push(choice);
        }
    }
    // Keep the order the choices were offered in.
    selected.sort_by_key(|choice| choices.iter().position(|candidate| candidate == choice));
    Ok(Value::Array(selected.into_iter().map(Value::String).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn question(value: Value) -> QuestionSpec {
        serde_json::from_value(value).unwrap()
    }

    fn console(input: &str) -> SharedConsole {
        Console::new(
            Box::new(Cursor::new(input.as_bytes().to_vec())),
            Box::new(Vec::new()),
            Arc::new(AtomicBool::new(false)),
            Verbosity::Clean,
        )
    }

    #[test]
    fn parse_answer_boolean_accepts_yes() {
        let question = question(json!({ "id": "ok", "type": "confirm", "message": "Ok?" }));
        assert_eq!(parse_answer(&question, "yes").unwrap(), Value::Bool(true));
        assert!(parse_answer(&question, "maybe").is_err());
    }

    #[test]
    fn parse_answer_integer_handles_numbers() {
        let question = question(json!({ "id": "n", "type": "integer", "message": "N?" }));
        assert_eq!(
            parse_answer(&question, "42").unwrap(),
            Value::Number(Number::from(42))
        );
        assert!(parse_answer(&question, "4.2").is_err());
    }

    #[test]
    fn parse_answer_select_accepts_label_or_position() {
        let question = question(json!({
            "id": "color",
            "type": "select",
            "message": "Color?",
            "choices": ["red", "blue"]
        }));
        assert_eq!(parse_answer(&question, "BLUE").unwrap(), json!("blue"));
        assert_eq!(parse_answer(&question, "1").unwrap(), json!("red"));
        assert!(parse_answer(&question, "3").is_err());
        assert!(parse_answer(&question, "green").is_err());
    }

    #[test]
    fn parse_answer_select_prefers_numeric_labels_over_positions() {
        let rating = question(json!({
            "id": "rating",
            "type": "select",
            "message": "Rating?",
            "choices": ["3", "2", "1"]
        }));
        assert_eq!(parse_answer(&rating, "1").unwrap(), json!("1"));
        assert_eq!(parse_answer(&rating, "3").unwrap(), json!("3"));
        assert!(parse_answer(&rating, "4").is_err());

        let mixed = question(json!({
            "id": "size",
            "type": "select",
            "message": "Size?",
            "choices": ["small", "2", "large"]
        }));
        assert_eq!(parse_answer(&mixed, "1").unwrap(), json!("small"));
        assert_eq!(parse_answer(&mixed, "2").unwrap(), json!("2"));
        assert_eq!(parse_answer(&mixed, "3").unwrap(), json!("large"));
    }

    #[test]
    fn parse_answer_checkbox_collects_in_choice_order() {
        let question = question(json!({
            "id": "toppings",
            "type": "checkbox",
            "message": "Toppings?",
            "choices": ["ham", "olives", "corn"]
        }));
        assert_eq!(
            parse_answer(&question, "corn, 1, ham").unwrap(),
            json!(["ham", "corn"])
        );
        assert_eq!(parse_answer(&question, "").unwrap(), json!([]));
    }

    #[test]
    fn parse_answer_respects_defaults() {
        let question = question(json!({
            "id": "name",
            "type": "text",
            "message": "Name?",
            "default": "default-value"
        }));
        assert_eq!(parse_answer(&question, "").unwrap(), json!("default-value"));
    }

    #[test]
    fn terminal_question_reprompts_until_valid() {
        let spec = question(json!({
            "id": "age",
            "type": "integer",
            "message": "Age?",
            "constraint": { "min": 0 }
        }));
        let mut question = TerminalQuestion::new(spec, console("abc\n-4\n33\n"));
        assert_eq!(question.ask().unwrap(), json!(33));
    }

    #[test]
    fn end_of_input_interrupts() {
        let spec = question(json!({ "id": "name", "type": "text", "message": "Name?" }));
        let mut question = TerminalQuestion::new(spec, console(""));
        assert!(matches!(question.ask(), Err(AskError::Interrupted)));
    }

    #[test]
    fn ctrl_c_flag_interrupts() {
        let spec = question(json!({ "id": "name", "type": "text", "message": "Name?" }));
        let console = console("Ada\n");
        console.borrow().interrupted.store(true, Ordering::SeqCst);
        let mut question = TerminalQuestion::new(spec, console);
        assert!(matches!(question.ask(), Err(AskError::Interrupted)));
    }
}
