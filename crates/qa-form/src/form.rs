use std::collections::HashMap;
use std::io::{self, Write};

use tracing::{debug, trace, warn};

use crate::answers::Answers;
use crate::condition::{Decision, SkipCondition};
use crate::error::FormError;
use crate::expr::Expr;
use crate::options::AskOptions;
use crate::question::Question;
use crate::values::{ConditionError, Values};

/// A named question within a form.
pub struct FormField {
    pub key: String,
    pub question: Box<dyn Question>,
}

impl FormField {
    pub fn new(key: impl Into<String>, question: impl Question + 'static) -> Self {
        Self {
            key: key.into(),
            question: Box::new(question),
        }
    }

    pub fn boxed(key: impl Into<String>, question: Box<dyn Question>) -> Self {
        Self {
            key: key.into(),
            question,
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub answers: Answers,
    /// Number of passes over the fields, including the final one.
    pub passes: usize,
}

/// Multi-question prompt. Questions are asked one after another and the
/// answers are returned with one entry per field key.
///
/// Any field may carry a skip condition that reads other answers. Fields
/// whose condition depends on answers that are not known yet are retried on
/// the next pass, so registration order only decides the visiting order.
#[derive(Default)]
pub struct Form {
    fields: Vec<FormField>,
    skip_conditions: HashMap<String, SkipCondition>,
}

/// Builds a form from `(key, question)` bindings, keeping their order.
pub fn form<K, I>(fields: I) -> Form
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Box<dyn Question>)>,
{
    Form::new(
        fields
            .into_iter()
            .map(|(key, question)| FormField::boxed(key, question)),
    )
}

impl Form {
    /// Key uniqueness is left to the caller.
    pub fn new(fields: impl IntoIterator<Item = FormField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            skip_conditions: HashMap::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, question: impl Question + 'static) -> Self {
        self.fields.push(FormField::new(key, question));
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Attaches skip conditions, replacing any previous condition per key.
    pub fn skip_conditions<K, I>(&mut self, conditions: I) -> &mut Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SkipCondition)>,
    {
        for (key, condition) in conditions {
            self.skip_conditions.insert(key.into(), condition);
        }
        self
    }

    /// Skips `key` (recording its default) whenever `predicate` holds.
    pub fn skip_if<F>(&mut self, key: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&Values) -> Result<bool, ConditionError> + 'static,
    {
        self.skip_conditions([(key, SkipCondition::predicate(predicate))])
    }

    pub fn skip_when(&mut self, key: impl Into<String>, expr: Expr) -> &mut Self {
        self.skip_conditions([(key, SkipCondition::from(expr))])
    }

    /// Asks every field and lets interruptions propagate.
    pub fn unsafe_ask(&mut self) -> Result<Answers, FormError> {
        self.resolve().map(|resolution| resolution.answers)
    }

    /// Asks every field; a user interruption prints the configured message
    /// to stdout and yields empty answers instead of an error.
    pub fn ask(&mut self, options: &AskOptions) -> Result<Answers, FormError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.ask_to(options, &mut out)
    }

    pub fn ask_to<W: Write>(
        &mut self,
        options: &AskOptions,
        out: &mut W,
    ) -> Result<Answers, FormError> {
        match self.unsafe_ask() {
            Err(FormError::Interrupted { key }) => {
                debug!(%key, "form cancelled by user");
                writeln!(out)?;
                writeln!(out, "{}", options.interrupt_message)?;
                writeln!(out)?;
                out.flush()?;
                Ok(Answers::new())
            }
            other => other,
        }
    }

    /// Runs passes over the fields until every key has an answer.
    ///
    /// A pass that records nothing new while fields remain means the skip
    /// conditions can never be satisfied (a cycle, a self-reference or an
    /// unknown key), and fails with [`FormError::Dependency`].
    pub fn resolve(&mut self) -> Result<Resolution, FormError> {
        let mut answers = Answers::new();
        let mut previous_count = 0;
        let mut passes = 0;

        while !self.is_complete(&answers) {
            passes += 1;
            for index in 0..self.fields.len() {
                let key = &self.fields[index].key;
                if answers.contains_key(key) {
                    continue;
                }
                let decision = match self.skip_conditions.get(key) {
                    Some(condition) => {
                        let values = snapshot(&self.fields, &answers);
                        condition
                            .decide(&values)
                            .map_err(|error| FormError::Condition {
                                key: key.clone(),
                                message: error.to_string(),
                            })?
                    }
                    None => Decision::Ask,
                };

                let field = &mut self.fields[index];
                match decision {
                    Decision::Pending(waiting_on) => {
                        trace!(
                            key = %field.key,
                            %waiting_on,
                            pass = passes,
                            "field waiting on answer"
                        );
                    }
                    Decision::Ask => {
                        let answer = field
                            .question
                            .ask()
                            .map_err(|error| FormError::from_ask(&field.key, error))?;
                        answers.insert(field.key.clone(), answer);
                    }
                    Decision::Skip => {
                        trace!(key = %field.key, "field skipped, recording default");
                        answers.insert(field.key.clone(), field.question.default_value());
                    }
                }
            }

            if answers.len() == previous_count {
                let unresolved: Vec<String> = self
                    .fields
                    .iter()
                    .filter(|field| !answers.contains_key(&field.key))
                    .map(|field| field.key.clone())
                    .collect();
                warn!(pass = passes, ?unresolved, "form resolution stalled");
                return Err(FormError::Dependency { unresolved });
            }
            debug!(
                pass = passes,
                answered = answers.len(),
                total = self.fields.len(),
                "form pass complete"
            );
            previous_count = answers.len();
        }

        Ok(Resolution { answers, passes })
    }

    fn is_complete(&self, answers: &Answers) -> bool {
        self.fields
            .iter()
            .all(|field| answers.contains_key(&field.key))
    }
}

/// Builds the values view from the answers collected so far.
fn snapshot(fields: &[FormField], answers: &Answers) -> Values {
    let mut values = Values::new();
    for field in fields {
        if let Some(answer) = answers.get(&field.key) {
            values.record(&field.key, field.question.id(), answer.clone());
        }
    }
    values
}
