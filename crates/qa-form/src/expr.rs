use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::question::QuestionId;
use crate::values::{ConditionError, ValueKey, Values};

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    /// Answer recorded under a field key.
    Answer { key: String },
    Literal { value: Value },
    /// Answer produced by a specific question; only constructible in code.
    #[serde(skip)]
    Question { id: QuestionId },
}

impl Operand {
    pub fn answer(key: impl Into<String>) -> Self {
        Operand::Answer { key: key.into() }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal {
            value: value.into(),
        }
    }

    pub fn question(id: QuestionId) -> Self {
        Operand::Question { id }
    }

    fn resolve<'a>(&'a self, values: &'a Values) -> Result<&'a Value, ConditionError> {
        match self {
            Operand::Answer { key } => values.get(ValueKey::Name(key.clone())),
            Operand::Question { id } => values.get(*id),
            Operand::Literal { value } => Ok(value),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Expr {
        Expr::Eq {
            left: self,
            right: Operand::literal(value),
        }
    }

    pub fn ne(self, value: impl Into<Value>) -> Expr {
        Expr::Ne {
            left: self,
            right: Operand::literal(value),
        }
    }

    /// Compares against another field's answer instead of a literal.
    pub fn eq_answer(self, key: impl Into<String>) -> Expr {
        Expr::Eq {
            left: self,
            right: Operand::answer(key),
        }
    }

    pub fn is_in<I, V>(self, candidates: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Expr::In {
            item: self,
            collection: Operand::literal(Value::Array(
                candidates.into_iter().map(Into::into).collect(),
            )),
        }
    }

    /// True when a list answer (e.g. a checkbox) contains `value`.
    pub fn contains(self, value: impl Into<Value>) -> Expr {
        Expr::In {
            item: Operand::literal(value),
            collection: self,
        }
    }

    pub fn truthy(self) -> Expr {
        Expr::Truthy { operand: self }
    }
}

/// Declarative skip condition evaluated against a [`Values`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    LiteralBool { value: bool },
    Eq { left: Operand, right: Operand },
    Ne { left: Operand, right: Operand },
    In { item: Operand, collection: Operand },
    And { expressions: Vec<Expr> },
    Or { expressions: Vec<Expr> },
    Not { expression: Box<Expr> },
    Truthy { operand: Operand },
}

impl Expr {
    pub fn all(expressions: impl IntoIterator<Item = Expr>) -> Self {
        Expr::And {
            expressions: expressions.into_iter().collect(),
        }
    }

    pub fn any(expressions: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or {
            expressions: expressions.into_iter().collect(),
        }
    }

    pub fn negate(expression: Expr) -> Self {
        Expr::Not {
            expression: Box::new(expression),
        }
    }

    /// Evaluates the expression left to right.
    ///
    /// The first answer that is not available yet stops evaluation with
    /// [`ConditionError::Missing`]; `and`/`or` short-circuit before reaching
    /// operands that are not needed.
    pub fn evaluate(&self, values: &Values) -> Result<bool, ConditionError> {
        match self {
            Expr::LiteralBool { value } => Ok(*value),
            Expr::Eq { left, right } => Ok(left.resolve(values)? == right.resolve(values)?),
            Expr::Ne { left, right } => Ok(left.resolve(values)? != right.resolve(values)?),
            Expr::In { item, collection } => {
                let item = item.resolve(values)?;
                match collection.resolve(values)? {
                    Value::Array(items) => Ok(items.contains(item)),
                    other => Err(ConditionError::invalid(format!(
                        "'in' expects a list to search, found {other}"
                    ))),
                }
            }
            Expr::And { expressions } => {
                for expr in expressions {
                    if !expr.evaluate(values)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Expr::Or { expressions } => {
                for expr in expressions {
                    if expr.evaluate(values)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Expr::Not { expression } => expression.evaluate(values).map(|value| !value),
            Expr::Truthy { operand } => match operand.resolve(values)? {
                Value::Bool(value) => Ok(*value),
                other => Err(ConditionError::invalid(format!(
                    "expected a boolean answer, found {other}"
                ))),
            },
        }
    }

    /// Field keys this expression reads by name.
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
        match self {
            Expr::LiteralBool { .. } => {}
            Expr::Eq { left, right } | Expr::Ne { left, right } => {
                push_key(left, keys);
                push_key(right, keys);
            }
            Expr::In { item, collection } => {
                push_key(item, keys);
                push_key(collection, keys);
            }
            Expr::Truthy { operand } => push_key(operand, keys),
            Expr::And { expressions } | Expr::Or { expressions } => {
                for expr in expressions {
                    expr.collect_keys(keys);
                }
            }
            Expr::Not { expression } => expression.collect_keys(keys),
        }
    }
}

fn push_key<'a>(operand: &'a Operand, keys: &mut Vec<&'a str>) {
    if let Operand::Answer { key } = operand {
        keys.push(key.as_str());
    }
}
