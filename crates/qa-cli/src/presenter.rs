use std::fmt::Write as _;
use std::io::{self, Write};

use qa_form::{Answers, FormSpec, QuestionKind, QuestionSpec};

/// Controls which bits of state the prompts print.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: descriptions, choices and parse expectations.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Output encoding for the collected answers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum AnswerFormat {
    Json,
    Cbor,
}

pub fn show_header(out: &mut dyn Write, spec: &FormSpec) -> io::Result<()> {
    writeln!(out, "Form: {}", spec.title)?;
    if let Some(description) = &spec.description {
        writeln!(out, "{}", description)?;
    }
    Ok(())
}

pub fn show_prompt(
    out: &mut dyn Write,
    question: &QuestionSpec,
    verbosity: Verbosity,
) -> io::Result<()> {
    let mut line = format!("? {}", question.message);
    if let Some(hint) = hint(question) {
        line.push(' ');
        line.push_str(&hint);
    }
    if let Some(default) = default_label(question) {
        line.push_str(&format!(" [{}]", default));
    }
    writeln!(out, "{}", line)?;
    if verbosity.is_verbose()
        && let Some(description) = &question.description
    {
        writeln!(out, "  {}", description)?;
    }
    if question.kind.uses_choices() {
        for (index, choice) in question.choices().iter().enumerate() {
            writeln!(out, "  {}) {}", index + 1, choice)?;
        }
    }
    write!(out, "> ")?;
    out.flush()
}

pub fn show_parse_error(
    out: &mut dyn Write,
    error: &AnswerParseError,
    verbosity: Verbosity,
) -> io::Result<()> {
    writeln!(out, "Invalid answer: {}", error.user_message)?;
    if verbosity.is_verbose()
        && let Some(debug) = &error.debug_message
    {
        writeln!(out, "  Expected: {}", debug)?;
    }
    Ok(())
}

pub fn show_answers(out: &mut dyn Write, answers: &Answers, format: AnswerFormat) -> io::Result<()> {
    match format {
        AnswerFormat::Json => {
            let pretty = answers.to_json_pretty().map_err(io::Error::other)?;
            writeln!(out, "{}", pretty)
        }
        AnswerFormat::Cbor => {
            let bytes = answers.to_cbor().map_err(io::Error::other)?;
            writeln!(out, "{}", encode_hex(&bytes))
        }
    }
}

fn hint(question: &QuestionSpec) -> Option<String> {
    match question.kind {
        QuestionKind::Confirm => Some("(yes/no)".to_string()),
        QuestionKind::Integer => Some("(integer)".to_string()),
        QuestionKind::Number => Some("(number)".to_string()),
        QuestionKind::Select => Some("(choose one, name or number)".to_string()),
        QuestionKind::Checkbox => Some("(comma separated, blank for none)".to_string()),
        QuestionKind::Text => None,
    }
}

fn default_label(question: &QuestionSpec) -> Option<String> {
    let default = question.default.as_ref()?;
    let label = match default {
        serde_json::Value::Null => return None,
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Bool(true) => "Y/n".to_string(),
        serde_json::Value::Bool(false) => "y/N".to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(String::from).unwrap_or_else(|| item.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    Some(label)
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
