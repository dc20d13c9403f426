use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use schemars::JsonSchema;
use serde_json::Value;

use crate::error::AskError;

static NEXT_QUESTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a question instance.
///
/// Conditions may refer to an answer through the question that produced it
/// instead of through the field key it was registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
pub struct QuestionId(u64);

impl QuestionId {
    /// Mints a fresh identity. Each question should call this once on construction.
    pub fn next() -> Self {
        Self(NEXT_QUESTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "question#{}", self.0)
    }
}

/// A single prompt that produces exactly one answer when asked.
///
/// The form engine never looks at how the answer is collected; it only asks,
/// or falls back to [`Question::default_value`] when the field is skipped.
pub trait Question {
    fn id(&self) -> QuestionId;

    /// Blocks until the user answers or cancels.
    fn ask(&mut self) -> Result<Value, AskError>;

    fn default_value(&self) -> Value;
}

impl<Q: Question + ?Sized> Question for Box<Q> {
    fn id(&self) -> QuestionId {
        (**self).id()
    }

    fn ask(&mut self) -> Result<Value, AskError> {
        (**self).ask()
    }

    fn default_value(&self) -> Value {
        (**self).default_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_distinct() {
        let first = QuestionId::next();
        let second = QuestionId::next();
        assert_ne!(first, second);
        assert!(first < second);
    }
}
