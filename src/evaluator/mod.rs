//! The tree-walking evaluator.
//!
//! An [Evaluator] holds the data root, the function registry and the
//! instance-tag table, and evaluates parsed queries against them. Missing
//! data degrades to null and compares as false; only structural misuse and
//! failing functions abort evaluation.

use log::{debug, trace};
use std::{collections::HashMap, error::Error as StdError, fmt::Display};

use crate::{
    error::Error,
    functions::{FunctionRegistry, FunctionResult},
    lexer::Lexer,
    parser::{
        self,
        ast::{
            ArithOp, BoolExpr, Call, CallArg, Condition, EqOp, IdentPath, InLhs, InList, MathExpr,
            Predication, RelOp, TextExpr, TextOp,
        },
    },
    resolver::{self, ResolveError},
    value::Value,
};

#[derive(Debug)]
pub enum EvalError {
    UnknownFunction {
        name: String,
    },
    FunctionExecution {
        name: String,
        cause: Box<dyn StdError + Send + Sync>,
    },
    TypeMismatch(String),
    DivisionByZero,
}

impl Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::UnknownFunction { name } => write!(f, "Unknown function: {name}"),
            EvalError::FunctionExecution { name, cause } => {
                write!(f, "Function execution failed: {name} ({cause})")
            }
            EvalError::TypeMismatch(message) => f.write_str(message),
            EvalError::DivisionByZero => f.write_str("Function execution failed: division by zero"),
        }
    }
}

impl StdError for EvalError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EvalError::FunctionExecution { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<ResolveError> for EvalError {
    fn from(value: ResolveError) -> Self {
        EvalError::TypeMismatch(value.0)
    }
}

/// Evaluates queries against one data root. The registry is per evaluator,
/// so custom registrations never leak between evaluators.
pub struct Evaluator {
    root: Value,
    functions: FunctionRegistry,
    instances: HashMap<String, usize>,
}

impl Evaluator {
    pub fn new(root: Value) -> Self {
        Self {
            root,
            functions: FunctionRegistry::with_builtins(),
            instances: HashMap::new(),
        }
    }

    /// Build an evaluator from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let root = serde_json::from_str::<Value>(json)
            .map_err(|e| Error::Argument(format!("input is not a valid JSON document: {e}")))?;
        Ok(Self::new(root))
    }

    /// Register a custom function. Re-registration replaces the previous
    /// callable of the same name.
    pub fn register(
        &mut self,
        name: &str,
        callable: impl Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    ) -> Result<(), Error> {
        self.functions
            .register(name, callable)
            .map_err(|e| Error::Argument(e.to_string()))
    }

    /// Map an `@tag` instance index to a concrete list position.
    pub fn register_instance(&mut self, tag: impl Into<String>, index: usize) {
        self.instances.insert(tag.into(), index);
    }

    /// Evaluate a query against the held data root.
    pub fn evaluate(&self, query: &str) -> Result<bool, Error> {
        if query.trim().is_empty() {
            return Err(Error::Argument("query must not be empty".to_string()));
        }

        debug!("evaluating query '{query}'");

        let tokens = Lexer::new(query)
            .lex()
            .map_err(|e| Error::Parse(vec![e.into()]))?;
        let predication = parser::parse(tokens).map_err(Error::Parse)?;

        let result = self
            .eval_predication(&predication)
            .map_err(|cause| Error::Evaluation {
                query: query.to_owned(),
                cause,
            })?;

        match result {
            Value::Bool(result) => Ok(result),
            other => Err(Error::ResultType {
                query: query.to_owned(),
                message: format!(
                    "query evaluated to a {} instead of a boolean",
                    other.type_name()
                ),
            }),
        }
    }

    fn resolve(&self, path: &IdentPath) -> Result<Value, EvalError> {
        resolver::resolve(&self.root, path, &self.instances).map_err(EvalError::from)
    }

    fn eval_predication(&self, predication: &Predication) -> Result<Value, EvalError> {
        match predication {
            Predication::And(lhs, rhs) => {
                if !self.eval_operand(lhs)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_operand(rhs)?))
            }
            Predication::Or(lhs, rhs) => {
                if self.eval_operand(lhs)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_operand(rhs)?))
            }
            Predication::Condition(condition) => {
                Ok(Value::Bool(self.eval_condition(condition)?))
            }
        }
    }

    fn eval_operand(&self, predication: &Predication) -> Result<bool, EvalError> {
        match self.eval_predication(predication)? {
            Value::Bool(value) => Ok(value),
            other => Err(EvalError::TypeMismatch(format!(
                "logical operand evaluated to a {} instead of a boolean",
                other.type_name()
            ))),
        }
    }

    fn eval_condition(&self, condition: &Condition) -> Result<bool, EvalError> {
        trace!("evaluating condition {condition:?}");

        match condition {
            Condition::Between { value, low, high } => {
                let value = self.eval_math(value)?;
                let low = self.eval_math(low)?;
                let high = self.eval_math(high)?;

                // null anywhere makes the range test fail
                let (Some(value), Some(low), Some(high)) =
                    (value.as_f64(), low.as_f64(), high.as_f64())
                else {
                    return Ok(false);
                };

                Ok(low <= value && value <= high)
            }
            Condition::In { lhs, list, negated } => self.eval_in(lhs, list, *negated),
            Condition::Relational { lhs, op, rhs } => {
                let lhs = self.eval_math(lhs)?;
                let rhs = self.eval_math(rhs)?;
                Ok(Self::compare_numbers(&lhs, &rhs, *op))
            }
            Condition::TextMatch { lhs, op, rhs } => self.eval_text_match(lhs, *op, rhs),
            Condition::Bool(expr) => self.eval_bool_expr(expr),
        }
    }

    fn eval_in(&self, lhs: &InLhs, list: &InList, negated: bool) -> Result<bool, EvalError> {
        let lhs = match lhs {
            InLhs::Math(expr) => self.eval_math(expr)?,
            InLhs::Text(expr) => self.eval_raw_text(expr)?,
        };

        // a missing needle is in no list, negated or not
        if lhs.is_null() {
            return Ok(false);
        }

        let items: Vec<Value> = match list {
            InList::Numbers(items) => items
                .iter()
                .map(|item| self.eval_math(item))
                .collect::<Result<_, _>>()?,
            InList::Texts(items) => items
                .iter()
                .map(|item| self.eval_raw_text(item))
                .collect::<Result<_, _>>()?,
            InList::Path(path) => match self.resolve(path)? {
                Value::List(items) => items,
                Value::Null => return Ok(false),
                other => {
                    return Err(EvalError::TypeMismatch(format!(
                        "'{path}' resolved to a {} instead of a list",
                        other.type_name()
                    )))
                }
            },
        };

        let contained = items.iter().any(|item| Self::values_equal(&lhs, item));
        Ok(if negated { !contained } else { contained })
    }

    /// Membership equality: numbers compare as floats, text as text,
    /// booleans as booleans. Different kinds never match.
    fn values_equal(lhs: &Value, rhs: &Value) -> bool {
        match (lhs, rhs) {
            (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            _ => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                _ => false,
            },
        }
    }

    fn compare_numbers(lhs: &Value, rhs: &Value, op: RelOp) -> bool {
        // a missing operand makes every relational comparison false
        if lhs.is_null() || rhs.is_null() {
            return false;
        }

        match op {
            RelOp::Eq => Self::numbers_equal(lhs, rhs),
            RelOp::Ne => !Self::numbers_equal(lhs, rhs),
            ordering => {
                let (Some(lhs), Some(rhs)) = (lhs.as_f64(), rhs.as_f64()) else {
                    return false;
                };
                match ordering {
                    RelOp::Lt => lhs < rhs,
                    RelOp::Lte => lhs <= rhs,
                    RelOp::Gt => lhs > rhs,
                    RelOp::Gte => lhs >= rhs,
                    RelOp::Eq | RelOp::Ne => unreachable!(),
                }
            }
        }
    }

    /// Integers compare exactly among themselves, everything else through
    /// floats.
    fn numbers_equal(lhs: &Value, rhs: &Value) -> bool {
        match (lhs, rhs) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs == rhs,
            _ => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(lhs), Some(rhs)) => lhs == rhs,
                _ => false,
            },
        }
    }

    fn eval_math(&self, expr: &MathExpr) -> Result<Value, EvalError> {
        match expr {
            MathExpr::Integer(value) => Ok(Value::Integer(*value)),
            MathExpr::Float(value) => Ok(Value::Float(*value)),
            MathExpr::Power { base, exponent } => {
                let base = self.eval_math(base)?;
                let exponent = self.eval_math(exponent)?;
                match (base.as_f64(), exponent.as_f64()) {
                    (Some(base), Some(exponent)) => Ok(Value::Float(base.powf(exponent))),
                    _ => Ok(Value::Null),
                }
            }
            MathExpr::Binary { op, lhs, rhs } => {
                let lhs = self.eval_math(lhs)?;
                let rhs = self.eval_math(rhs)?;
                Self::apply_arith(*op, &lhs, &rhs)
            }
            MathExpr::Path(path) => {
                let value = self.resolve(path)?;
                // only numbers survive in arithmetic position
                match value {
                    Value::Integer(_) | Value::Float(_) => Ok(value),
                    _ => Ok(Value::Null),
                }
            }
            MathExpr::Call(call) => {
                let value = self.eval_call(call)?;
                match value {
                    Value::Integer(_) | Value::Float(_) | Value::Null => Ok(value),
                    _ => Ok(Value::Null),
                }
            }
            MathExpr::Parens(inner) => self.eval_math(inner),
        }
    }

    /// Arithmetic stays integral while both operands are integers and
    /// widens to floats otherwise. Null absorbs everything.
    fn apply_arith(op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
        if lhs.is_null() || rhs.is_null() {
            return Ok(Value::Null);
        }

        if let (Value::Integer(lhs), Value::Integer(rhs)) = (lhs, rhs) {
            return match op {
                ArithOp::Add => Ok(match lhs.checked_add(*rhs) {
                    Some(value) => Value::Integer(value),
                    None => Value::Float(*lhs as f64 + *rhs as f64),
                }),
                ArithOp::Sub => Ok(match lhs.checked_sub(*rhs) {
                    Some(value) => Value::Integer(value),
                    None => Value::Float(*lhs as f64 - *rhs as f64),
                }),
                ArithOp::Mul => Ok(match lhs.checked_mul(*rhs) {
                    Some(value) => Value::Integer(value),
                    None => Value::Float(*lhs as f64 * *rhs as f64),
                }),
                ArithOp::Div => {
                    if *rhs == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    Ok(match lhs.checked_div(*rhs) {
                        Some(value) => Value::Integer(value),
                        None => Value::Float(*lhs as f64 / *rhs as f64),
                    })
                }
                ArithOp::Mod => {
                    if *rhs == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    Ok(match lhs.checked_rem(*rhs) {
                        Some(value) => Value::Integer(value),
                        None => Value::Float(*lhs as f64 % *rhs as f64),
                    })
                }
            };
        }

        let (Some(lhs), Some(rhs)) = (lhs.as_f64(), rhs.as_f64()) else {
            return Ok(Value::Null);
        };

        match op {
            ArithOp::Add => Ok(Value::Float(lhs + rhs)),
            ArithOp::Sub => Ok(Value::Float(lhs - rhs)),
            ArithOp::Mul => Ok(Value::Float(lhs * rhs)),
            ArithOp::Div => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(lhs / rhs))
            }
            ArithOp::Mod => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(lhs % rhs))
            }
        }
    }

    fn eval_text(&self, expr: &TextExpr) -> Result<Value, EvalError> {
        match expr {
            TextExpr::Literal(text) => Ok(Value::String(text.clone())),
            TextExpr::Null => Ok(Value::Null),
            TextExpr::Parens(inner) => self.eval_text(inner),
            TextExpr::Path(path) => {
                let value = self.resolve(path)?;
                Ok(match value.string_form() {
                    Some(text) => Value::String(text),
                    None => Value::Null,
                })
            }
            TextExpr::Call(call) => {
                let value = self.eval_call(call)?;
                Ok(match value.string_form() {
                    Some(text) => Value::String(text),
                    None => Value::Null,
                })
            }
        }
    }

    /// Like [Self::eval_text], but identifier paths and calls keep their raw
    /// value. Membership tests compare by kind, not by textual form.
    fn eval_raw_text(&self, expr: &TextExpr) -> Result<Value, EvalError> {
        match expr {
            TextExpr::Path(path) => self.resolve(path),
            TextExpr::Call(call) => self.eval_call(call),
            TextExpr::Parens(inner) => self.eval_raw_text(inner),
            other => self.eval_text(other),
        }
    }

    fn eval_text_match(
        &self,
        lhs: &TextExpr,
        op: TextOp,
        rhs: &TextExpr,
    ) -> Result<bool, EvalError> {
        let lhs_is_literal_null = lhs.is_literal_null();
        let rhs_is_literal_null = rhs.is_literal_null();

        if lhs_is_literal_null && rhs_is_literal_null {
            return Ok(!op.is_negated());
        }

        // the literal NULL turns the match into a null-ness test
        if lhs_is_literal_null || rhs_is_literal_null {
            let other = if lhs_is_literal_null { rhs } else { lhs };
            let is_null = self.eval_text(other)?.is_null();
            return Ok(if op.is_negated() { !is_null } else { is_null });
        }

        let lhs = self.eval_text(lhs)?;
        let rhs = self.eval_text(rhs)?;
        let (Value::String(lhs), Value::String(rhs)) = (lhs, rhs) else {
            // missing data never matches; only `!=` asserts a non-match
            return Ok(matches!(op, TextOp::Ne));
        };

        let (lhs, rhs) = if op.is_case_insensitive() {
            (lhs.to_lowercase(), rhs.to_lowercase())
        } else {
            (lhs, rhs)
        };

        let matched = match op {
            TextOp::Eq | TextOp::Ne => lhs == rhs,
            _ => Self::wildcard_match(&lhs, &rhs),
        };

        Ok(if op.is_negated() { !matched } else { matched })
    }

    /// `%` at the edges of the pattern: leading means ends-with, trailing
    /// means starts-with, both mean contains, none means equals.
    fn wildcard_match(text: &str, pattern: &str) -> bool {
        let leading = pattern.starts_with('%');
        let trailing = pattern.ends_with('%') && pattern.len() > 1;

        match (leading, trailing) {
            (true, true) => text.contains(&pattern[1..pattern.len() - 1]),
            (true, false) => text.ends_with(&pattern[1..]),
            (false, true) => text.starts_with(&pattern[..pattern.len() - 1]),
            (false, false) => text == pattern,
        }
    }

    fn eval_bool_expr(&self, expr: &BoolExpr) -> Result<bool, EvalError> {
        match expr {
            BoolExpr::Lit(value) => Ok(*value),
            BoolExpr::Parens(inner) => self.eval_bool_expr(inner),
            BoolExpr::Compare { op, lhs, rhs } => {
                let lhs = self.eval_bool_expr(lhs)?;
                let rhs = self.eval_bool_expr(rhs)?;
                Ok(match op {
                    EqOp::Eq => lhs == rhs,
                    EqOp::Ne => lhs != rhs,
                })
            }
            BoolExpr::Path(path) => {
                let value = self.resolve(path)?;
                Ok(match value {
                    Value::Bool(value) => value,
                    // compatibility coercion: anything whose string form is
                    // not "true" counts as false
                    other => other
                        .string_form()
                        .map(|text| text.eq_ignore_ascii_case("true"))
                        .unwrap_or(false),
                })
            }
            BoolExpr::Call(call) => match self.eval_call(call)? {
                Value::Bool(value) => Ok(value),
                other => Err(EvalError::TypeMismatch(format!(
                    "function '{}' returned a {} where a boolean was required",
                    call.name,
                    other.type_name()
                ))),
            },
        }
    }

    fn eval_call(&self, call: &Call) -> Result<Value, EvalError> {
        trace!("calling function '{}'", call.name);

        let Some(callable) = self.functions.get(&call.name) else {
            return Err(EvalError::UnknownFunction {
                name: call.name.clone(),
            });
        };

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_call_arg(arg)?);
        }

        callable(&args).map_err(|cause| EvalError::FunctionExecution {
            name: call.name.clone(),
            cause,
        })
    }

    fn eval_call_arg(&self, arg: &CallArg) -> Result<Value, EvalError> {
        match arg {
            // paths hand the raw value to the function
            CallArg::Path(path) => self.resolve(path),
            CallArg::Text(expr) => self.eval_text(expr),
            CallArg::Math(expr) => self.eval_math(expr),
            CallArg::Bool(value) => Ok(Value::Bool(*value)),
        }
    }
}
