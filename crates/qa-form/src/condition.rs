use std::fmt;

use crate::expr::Expr;
use crate::values::{ConditionError, ValueKey, Values};

pub type Predicate = Box<dyn Fn(&Values) -> Result<bool, ConditionError>>;

/// Outcome of evaluating a field's skip condition for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Record the question's default without asking.
    Skip,
    Ask,
    /// The condition reads an answer that is not collected yet; retry next pass.
    Pending(ValueKey),
}

/// Decides whether a field is bypassed in favour of its default.
pub enum SkipCondition {
    Predicate(Predicate),
    Expr(Expr),
}

impl SkipCondition {
    /// Wraps a free-form predicate. Use [`Values::get`] with `?` so that
    /// unanswered dependencies surface as [`ConditionError::Missing`].
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Values) -> Result<bool, ConditionError> + 'static,
    {
        SkipCondition::Predicate(Box::new(predicate))
    }

    pub fn never() -> Self {
        SkipCondition::Expr(Expr::LiteralBool { value: false })
    }

    pub fn always() -> Self {
        SkipCondition::Expr(Expr::LiteralBool { value: true })
    }

    /// Only [`ConditionError::Invalid`] is returned as an error; a missing
    /// answer becomes [`Decision::Pending`].
    pub fn decide(&self, values: &Values) -> Result<Decision, ConditionError> {
        let outcome = match self {
            SkipCondition::Predicate(predicate) => predicate(values),
            SkipCondition::Expr(expr) => expr.evaluate(values),
        };
        match outcome {
            Ok(true) => Ok(Decision::Skip),
            Ok(false) => Ok(Decision::Ask),
            Err(ConditionError::Missing(key)) => Ok(Decision::Pending(key)),
            Err(error) => Err(error),
        }
    }
}

impl From<Expr> for SkipCondition {
    fn from(expr: Expr) -> Self {
        SkipCondition::Expr(expr)
    }
}

impl fmt::Debug for SkipCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipCondition::Predicate(_) => f.write_str("SkipCondition::Predicate(..)"),
            SkipCondition::Expr(expr) => f.debug_tuple("SkipCondition::Expr").field(expr).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Operand;
    use crate::question::QuestionId;
    use serde_json::json;

    #[test]
    fn predicate_outcomes_map_to_tri_state() {
        let condition =
            SkipCondition::predicate(|values| Ok(values.get("color")?.as_str() == Some("red")));

        assert_eq!(
            condition.decide(&Values::new()),
            Ok(Decision::Pending(ValueKey::Name("color".into())))
        );

        let mut values = Values::new();
        values.record("color", QuestionId::next(), json!("red"));
        assert_eq!(condition.decide(&values), Ok(Decision::Skip));

        let mut values = Values::new();
        values.record("color", QuestionId::next(), json!("blue"));
        assert_eq!(condition.decide(&values), Ok(Decision::Ask));
    }

    #[test]
    fn broken_predicates_are_not_pending() {
        let condition = SkipCondition::predicate(|_| Err(ConditionError::invalid("boom")));
        assert_eq!(
            condition.decide(&Values::new()),
            Err(ConditionError::invalid("boom"))
        );
    }

    #[test]
    fn expressions_convert_into_conditions() {
        let condition: SkipCondition = Operand::answer("size").eq("large").into();
        assert!(matches!(
            condition.decide(&Values::new()),
            Ok(Decision::Pending(_))
        ));
        assert_eq!(SkipCondition::never().decide(&Values::new()), Ok(Decision::Ask));
        assert_eq!(SkipCondition::always().decide(&Values::new()), Ok(Decision::Skip));
    }
}
