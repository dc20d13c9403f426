//! Deterministic question doubles for exercising forms without a terminal.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;

use crate::error::AskError;
use crate::question::{Question, QuestionId};

enum Reply {
    Answer(Value),
    Interrupt,
    Fail(String),
}

/// Answers from a script and counts how often it was asked.
///
/// Once the script is exhausted the last answer is repeated, so the same
/// question can be reused across several resolutions.
pub struct ScriptedQuestion {
    id: QuestionId,
    default: Value,
    replies: VecDeque<Reply>,
    last: Option<Value>,
    asked: Rc<Cell<usize>>,
    log: Option<(String, Rc<RefCell<Vec<String>>>)>,
}

impl ScriptedQuestion {
    pub fn new(default: impl Into<Value>) -> Self {
        Self {
            id: QuestionId::next(),
            default: default.into(),
            replies: VecDeque::new(),
            last: None,
            asked: Rc::new(Cell::new(0)),
            log: None,
        }
    }

    pub fn answering(answer: impl Into<Value>) -> Self {
        Self::new(Value::Null).then(answer)
    }

    pub fn then(mut self, answer: impl Into<Value>) -> Self {
        self.replies.push_back(Reply::Answer(answer.into()));
        self
    }

    pub fn then_interrupt(mut self) -> Self {
        self.replies.push_back(Reply::Interrupt);
        self
    }

    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.replies.push_back(Reply::Fail(message.into()));
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Appends `name` to `log` every time this question is asked.
    pub fn logging_to(mut self, name: impl Into<String>, log: &Rc<RefCell<Vec<String>>>) -> Self {
        self.log = Some((name.into(), Rc::clone(log)));
        self
    }

    /// Shared handle to the number of times [`Question::ask`] ran.
    pub fn asked(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.asked)
    }
}

impl Question for ScriptedQuestion {
    fn id(&self) -> QuestionId {
        self.id
    }

    fn ask(&mut self) -> Result<Value, AskError> {
        self.asked.set(self.asked.get() + 1);
        if let Some((name, log)) = &self.log {
            log.borrow_mut().push(name.clone());
        }
        match self.replies.pop_front() {
            Some(Reply::Answer(value)) => {
                self.last = Some(value.clone());
                Ok(value)
            }
            Some(Reply::Interrupt) => Err(AskError::Interrupted),
            Some(Reply::Fail(message)) => Err(AskError::Invalid(message)),
            None => self
                .last
                .clone()
                .ok_or_else(|| AskError::Invalid("scripted question has no answers left".into())),
        }
    }

    fn default_value(&self) -> Value {
        self.default.clone()
    }
}
