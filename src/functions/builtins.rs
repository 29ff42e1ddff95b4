//! The built-in function library.
//!
//! Every built-in checks its own arity and argument types and reports
//! misuse as an error; the evaluator wraps those into
//! function-execution-failed errors carrying the function name.

use regex::Regex;
use std::error::Error;

use super::{FunctionRegistry, FunctionResult};
use crate::value::Value;

type Cause = Box<dyn Error + Send + Sync>;

pub fn register_all(registry: &mut FunctionRegistry) {
    let entries: [(&str, super::Callable); 16] = [
        ("replace", Box::new(replace)),
        ("upper", Box::new(upper)),
        ("lower", Box::new(lower)),
        ("substring", Box::new(substring)),
        ("concat", Box::new(concat)),
        ("length", Box::new(length)),
        ("min", Box::new(min)),
        ("max", Box::new(max)),
        ("abs", Box::new(abs)),
        ("round", Box::new(round)),
        ("ceil", Box::new(ceil)),
        ("floor", Box::new(floor)),
        ("sqrt", Box::new(sqrt)),
        ("contains", Box::new(contains)),
        ("startsWith", Box::new(starts_with)),
        ("endsWith", Box::new(ends_with)),
    ];

    for (name, callable) in entries {
        registry.functions.insert(name.to_owned(), callable);
    }
}

fn expect_arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), Cause> {
    if args.len() < min || args.len() > max {
        let expectation = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(format!(
            "{name}() expects {expectation} argument(s), got {}",
            args.len()
        )
        .into());
    }
    Ok(())
}

/// The textual form of a scalar argument; `None` for null, an error for
/// lists and maps.
fn text_arg(name: &str, args: &[Value], index: usize) -> Result<Option<String>, Cause> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.string_form() {
            Some(text) => Ok(Some(text)),
            None => Err(format!(
                "{name}() cannot use a {} value as text (argument {})",
                value.type_name(),
                index + 1
            )
            .into()),
        },
    }
}

fn integer_arg(name: &str, args: &[Value], index: usize) -> Result<Option<i64>, Cause> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Integer(value)) => Ok(Some(*value)),
        Some(value) => Err(format!(
            "{name}() expects an integer as argument {}, got {}",
            index + 1,
            value.type_name()
        )
        .into()),
    }
}

fn flag_arg(name: &str, args: &[Value], index: usize) -> Result<bool, Cause> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(value)) => Ok(*value),
        Some(value) => Err(format!(
            "{name}() expects a boolean as argument {}, got {}",
            index + 1,
            value.type_name()
        )
        .into()),
    }
}

/// Regex replace-all; null in any argument makes the result null.
fn replace(args: &[Value]) -> FunctionResult {
    expect_arity("replace", args, 3, 3)?;

    let (Some(text), Some(pattern), Some(replacement)) = (
        text_arg("replace", args, 0)?,
        text_arg("replace", args, 1)?,
        text_arg("replace", args, 2)?,
    ) else {
        return Ok(Value::Null);
    };

    let regex = Regex::new(&pattern).map_err(|e| format!("invalid pattern: {e}"))?;
    Ok(Value::String(
        regex.replace_all(&text, replacement.as_str()).into_owned(),
    ))
}

fn upper(args: &[Value]) -> FunctionResult {
    expect_arity("upper", args, 1, 1)?;

    match text_arg("upper", args, 0)? {
        Some(text) => Ok(Value::String(text.to_uppercase())),
        None => Ok(Value::Null),
    }
}

fn lower(args: &[Value]) -> FunctionResult {
    expect_arity("lower", args, 1, 1)?;

    match text_arg("lower", args, 0)? {
        Some(text) => Ok(Value::String(text.to_lowercase())),
        None => Ok(Value::Null),
    }
}

/// 0-based substring; the end is clamped to the length of the text.
fn substring(args: &[Value]) -> FunctionResult {
    expect_arity("substring", args, 2, 3)?;

    let (Some(text), Some(start)) = (
        text_arg("substring", args, 0)?,
        integer_arg("substring", args, 1)?,
    ) else {
        return Ok(Value::Null);
    };

    let chars = text.chars().collect::<Vec<_>>();
    let start = start.max(0) as usize;
    let end = match integer_arg("substring", args, 2)? {
        Some(end) => (end.max(0) as usize).min(chars.len()),
        None => chars.len(),
    };

    if start >= end {
        return Ok(Value::String(String::new()));
    }

    Ok(Value::String(chars[start..end].iter().collect()))
}

/// Concatenate the string forms of all non-null arguments. Never null.
fn concat(args: &[Value]) -> FunctionResult {
    expect_arity("concat", args, 1, usize::MAX)?;

    let mut result = String::new();
    for (index, _) in args.iter().enumerate() {
        if let Some(text) = text_arg("concat", args, index)? {
            result.push_str(&text);
        }
    }

    Ok(Value::String(result))
}

fn length(args: &[Value]) -> FunctionResult {
    expect_arity("length", args, 1, 1)?;

    match &args[0] {
        Value::Null => Ok(Value::Null),
        Value::String(text) => Ok(Value::Integer(text.chars().count() as i64)),
        Value::List(items) => Ok(Value::Integer(items.len() as i64)),
        _ => Ok(Value::Integer(0)),
    }
}

fn numeric_fold(name: &str, args: &[Value], pick: fn(f64, f64) -> f64) -> FunctionResult {
    expect_arity(name, args, 1, usize::MAX)?;

    let mut result: Option<f64> = None;
    for value in args {
        if let Some(number) = value.as_f64() {
            result = Some(match result {
                Some(current) => pick(current, number),
                None => number,
            });
        }
    }

    match result {
        Some(number) => Ok(Value::Float(number)),
        None => Err(format!("{name}() needs at least one numeric argument").into()),
    }
}

fn min(args: &[Value]) -> FunctionResult {
    numeric_fold("min", args, f64::min)
}

fn max(args: &[Value]) -> FunctionResult {
    numeric_fold("max", args, f64::max)
}

fn abs(args: &[Value]) -> FunctionResult {
    expect_arity("abs", args, 1, 1)?;

    match &args[0] {
        Value::Null => Ok(Value::Null),
        Value::Integer(value) => Ok(Value::Integer(value.abs())),
        Value::Float(value) => Ok(Value::Float(value.abs())),
        value => Err(format!("abs() expects a number, got {}", value.type_name()).into()),
    }
}

fn rounding(name: &str, args: &[Value], op: fn(f64) -> f64) -> FunctionResult {
    expect_arity(name, args, 1, 1)?;

    match &args[0] {
        Value::Null => Ok(Value::Null),
        // already whole
        Value::Integer(value) => Ok(Value::Integer(*value)),
        Value::Float(value) => Ok(Value::Float(op(*value))),
        value => Err(format!("{name}() expects a number, got {}", value.type_name()).into()),
    }
}

fn round(args: &[Value]) -> FunctionResult {
    rounding("round", args, f64::round)
}

fn ceil(args: &[Value]) -> FunctionResult {
    rounding("ceil", args, f64::ceil)
}

fn floor(args: &[Value]) -> FunctionResult {
    rounding("floor", args, f64::floor)
}

fn sqrt(args: &[Value]) -> FunctionResult {
    expect_arity("sqrt", args, 1, 1)?;

    match &args[0] {
        Value::Null => Ok(Value::Null),
        value => match value.as_f64() {
            Some(number) => Ok(Value::Float(number.sqrt())),
            None => Err(format!("sqrt() expects a number, got {}", value.type_name()).into()),
        },
    }
}

fn text_predicate(
    name: &str,
    args: &[Value],
    test: fn(&str, &str) -> bool,
) -> FunctionResult {
    expect_arity(name, args, 2, 3)?;

    let (Some(text), Some(probe)) = (text_arg(name, args, 0)?, text_arg(name, args, 1)?) else {
        // a missing operand never matches
        return Ok(Value::Bool(false));
    };

    let case_insensitive = flag_arg(name, args, 2)?;
    let (text, probe) = if case_insensitive {
        (text.to_lowercase(), probe.to_lowercase())
    } else {
        (text, probe)
    };

    Ok(Value::Bool(test(&text, &probe)))
}

fn contains(args: &[Value]) -> FunctionResult {
    text_predicate("contains", args, |text, probe| text.contains(probe))
}

fn starts_with(args: &[Value]) -> FunctionResult {
    text_predicate("startsWith", args, |text, probe| text.starts_with(probe))
}

fn ends_with(args: &[Value]) -> FunctionResult {
    text_predicate("endsWith", args, |text, probe| text.ends_with(probe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace() {
        let result = replace(&[
            Value::String("banana".into()),
            Value::String("a".into()),
            Value::String("o".into()),
        ]);
        assert_eq!(Value::String("bonono".into()), result.unwrap());
    }

    #[test]
    fn test_replace_with_regex_pattern() {
        let result = replace(&[
            Value::String("a1b22c".into()),
            Value::String("[0-9]+".into()),
            Value::String("#".into()),
        ]);
        assert_eq!(Value::String("a#b#c".into()), result.unwrap());
    }

    #[test]
    fn test_replace_null_passthrough() {
        let result = replace(&[
            Value::Null,
            Value::String("a".into()),
            Value::String("b".into()),
        ]);
        assert_eq!(Value::Null, result.unwrap());
    }

    #[test]
    fn test_replace_rejects_bad_arity() {
        assert!(replace(&[Value::Null]).is_err());
    }

    #[test]
    fn test_replace_rejects_invalid_pattern() {
        let result = replace(&[
            Value::String("x".into()),
            Value::String("[".into()),
            Value::String("y".into()),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(
            Value::String("HELLO".into()),
            upper(&[Value::String("Hello".into())]).unwrap()
        );
        assert_eq!(
            Value::String("hello".into()),
            lower(&[Value::String("Hello".into())]).unwrap()
        );
        assert_eq!(Value::Null, upper(&[Value::Null]).unwrap());
    }

    #[test]
    fn test_substring() {
        let text = Value::String("Hello World".into());
        assert_eq!(
            Value::String("Hello".into()),
            substring(&[text.clone(), Value::Integer(0), Value::Integer(5)]).unwrap()
        );
        // the end is clamped
        assert_eq!(
            Value::String("World".into()),
            substring(&[text.clone(), Value::Integer(6), Value::Integer(100)]).unwrap()
        );
        // without an end the rest of the text is taken
        assert_eq!(
            Value::String("World".into()),
            substring(&[text.clone(), Value::Integer(6)]).unwrap()
        );
        assert_eq!(
            Value::Null,
            substring(&[Value::Null, Value::Integer(0)]).unwrap()
        );
    }

    #[test]
    fn test_concat_skips_nulls_and_stringifies() {
        let result = concat(&[
            Value::String("a".into()),
            Value::Null,
            Value::Integer(1),
            Value::Bool(true),
        ]);
        assert_eq!(Value::String("a1true".into()), result.unwrap());
    }

    #[test]
    fn test_length() {
        assert_eq!(
            Value::Integer(5),
            length(&[Value::String("Hello".into())]).unwrap()
        );
        assert_eq!(
            Value::Integer(2),
            length(&[Value::List(vec![Value::Integer(1), Value::Integer(2)])]).unwrap()
        );
        assert_eq!(Value::Null, length(&[Value::Null]).unwrap());
        assert_eq!(Value::Integer(0), length(&[Value::Integer(42)]).unwrap());
    }

    #[test]
    fn test_min_max() {
        let args = [Value::Integer(3), Value::Null, Value::Float(1.5)];
        assert_eq!(Value::Float(1.5), min(&args).unwrap());
        assert_eq!(Value::Float(3.0), max(&args).unwrap());
    }

    #[test]
    fn test_min_requires_a_number() {
        assert!(min(&[Value::Null, Value::String("x".into())]).is_err());
    }

    #[test]
    fn test_math_builtins() {
        assert_eq!(Value::Integer(4), abs(&[Value::Integer(-4)]).unwrap());
        assert_eq!(Value::Float(2.0), round(&[Value::Float(1.6)]).unwrap());
        assert_eq!(Value::Float(2.0), ceil(&[Value::Float(1.2)]).unwrap());
        assert_eq!(Value::Float(1.0), floor(&[Value::Float(1.8)]).unwrap());
        assert_eq!(Value::Float(3.0), sqrt(&[Value::Integer(9)]).unwrap());
        assert_eq!(Value::Null, sqrt(&[Value::Null]).unwrap());
    }

    #[test]
    fn test_text_predicates() {
        let text = Value::String("Hello World".into());
        assert_eq!(
            Value::Bool(true),
            contains(&[text.clone(), Value::String("lo W".into())]).unwrap()
        );
        assert_eq!(
            Value::Bool(false),
            starts_with(&[text.clone(), Value::String("world".into())]).unwrap()
        );
        assert_eq!(
            Value::Bool(true),
            ends_with(&[
                text.clone(),
                Value::String("WORLD".into()),
                Value::Bool(true)
            ])
            .unwrap()
        );
    }

    #[test]
    fn test_text_predicates_with_null_are_false() {
        assert_eq!(
            Value::Bool(false),
            contains(&[Value::Null, Value::String("x".into())]).unwrap()
        );
    }
}
