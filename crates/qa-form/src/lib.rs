#![allow(missing_docs)]

pub mod answers;
pub mod condition;
pub mod error;
pub mod expr;
pub mod form;
pub mod options;
pub mod question;
pub mod spec;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod validate;
pub mod values;

pub use answers::Answers;
pub use condition::{Decision, SkipCondition};
pub use error::{AskError, FormError};
pub use expr::{Expr, Operand};
pub use form::{Form, FormField, Resolution, form};
pub use options::{AskOptions, DEFAULT_INTERRUPT_MESSAGE};
pub use question::{Question, QuestionId};
pub use spec::{Constraint, FormSpec, QuestionKind, QuestionSpec, SpecIssue};
pub use validate::{ValidationError, validate_answer};
pub use values::{ConditionError, ValueKey, Values};
