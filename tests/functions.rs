use anyhow::Result;
use objectql::{error::Error, Evaluator, Value};

const DATA: &str = r#"{
    "age": 25,
    "name": "John Doe",
    "status": "active",
    "scores": [10, 20, 30],
    "nested": {"value": 42},
    "missing": null,
    "text": "Hello World"
}"#;

fn evaluator() -> Evaluator {
    Evaluator::from_json(DATA).expect("valid JSON")
}

#[test]
fn test_text_builtins() -> Result<()> {
    let evaluator = evaluator();

    assert!(evaluator.evaluate("upper(status) == 'ACTIVE'")?);
    assert!(evaluator.evaluate("lower(name) ~ 'john%'")?);
    assert!(evaluator.evaluate("substring(name, 0, 4) == 'John'")?);
    assert!(evaluator.evaluate("substring(name, 5) == 'Doe'")?);
    assert!(evaluator.evaluate("concat(status, '#') == 'active#'")?);
    assert!(evaluator.evaluate("replace(status, 'a', 'o') == 'octive'")?);
    Ok(())
}

#[test]
fn test_length_builtin() -> Result<()> {
    let evaluator = evaluator();

    assert!(evaluator.evaluate("length(text) == 11")?);
    assert!(evaluator.evaluate("length(scores) == 3")?);
    assert!(evaluator.evaluate("length(missing) == null")?);
    assert!(evaluator.evaluate("length(age) == 0")?);
    Ok(())
}

#[test]
fn test_numeric_builtins() -> Result<()> {
    let evaluator = evaluator();

    assert!(evaluator.evaluate("min(scores[0], 5) == 5")?);
    assert!(evaluator.evaluate("max(scores[0], scores[2]) == 30")?);
    assert!(evaluator.evaluate("abs(0 - age) == 25")?);
    assert!(evaluator.evaluate("sqrt(nested.value + 7) == 7")?);
    assert!(evaluator.evaluate("round(2.4) == 2")?);
    assert!(evaluator.evaluate("ceil(2.1) == 3")?);
    assert!(evaluator.evaluate("floor(2.9) == 2")?);
    Ok(())
}

#[test]
fn test_text_predicate_builtins() -> Result<()> {
    let evaluator = evaluator();

    assert!(evaluator.evaluate("contains(text, 'World')")?);
    assert!(!evaluator.evaluate("contains(text, 'world')")?);
    assert!(evaluator.evaluate("contains(text, 'world', true)")?);
    assert!(evaluator.evaluate("startsWith(name, 'John')")?);
    assert!(evaluator.evaluate("endsWith(name, 'DOE', true)")?);
    assert!(!evaluator.evaluate("startsWith(missing, 'x')")?);
    Ok(())
}

#[test]
fn test_builtins_compose() -> Result<()> {
    let evaluator = evaluator();

    assert!(evaluator.evaluate("length(upper(status)) == 6")?);
    assert!(evaluator.evaluate("upper(substring(name, 0, 4)) == 'JOHN'")?);
    Ok(())
}

#[test]
fn test_register_custom_function() -> Result<()> {
    let mut evaluator = evaluator();
    evaluator
        .register("isAdult", |args| {
            let age = args
                .first()
                .and_then(Value::as_f64)
                .ok_or("isAdult() needs a numeric argument")?;
            Ok(Value::Bool(age >= 18.0))
        })
        .unwrap();

    // the evaluator keeps custom registrations across queries
    assert!(evaluator.evaluate("isAdult(age)")?);
    assert!(evaluator.evaluate("isAdult(age) AND status == 'active'")?);
    assert!(!evaluator.evaluate("isAdult(age - 10)")?);
    Ok(())
}

#[test]
fn test_re_registration_replaces_the_function() -> Result<()> {
    let mut evaluator = evaluator();

    evaluator
        .register("answer", |_| Ok(Value::Integer(1)))
        .unwrap();
    assert!(evaluator.evaluate("answer() == 1")?);

    evaluator
        .register("answer", |_| Ok(Value::Integer(42)))
        .unwrap();
    assert!(evaluator.evaluate("answer() == 42")?);
    assert!(!evaluator.evaluate("answer() == 1")?);
    Ok(())
}

#[test]
fn test_registering_a_blank_name_is_an_argument_error() {
    let mut evaluator = evaluator();
    let result = evaluator.register("  ", |_| Ok(Value::Null));
    assert!(matches!(result, Err(Error::Argument(_))));
}

#[test]
fn test_custom_function_errors_are_wrapped() {
    let mut evaluator = evaluator();
    evaluator
        .register("explode", |_| Err("boom".into()))
        .unwrap();

    let result = evaluator.evaluate("explode()");
    let Err(Error::Evaluation { cause, .. }) = result else {
        panic!("expected an evaluation error, got {result:?}");
    };
    assert_eq!("Function execution failed: explode (boom)", format!("{cause}"));
}

#[test]
fn test_logical_operators_short_circuit() -> Result<()> {
    let mut evaluator = evaluator();
    evaluator
        .register("explode", |_| Err("boom".into()))
        .unwrap();

    // the failing function sits behind a decided operand and is never run
    assert!(!evaluator.evaluate("age == 99 AND explode()")?);
    assert!(evaluator.evaluate("age == 25 OR explode()")?);

    // but it does run when the left side leaves the outcome open
    assert!(evaluator.evaluate("age == 25 AND explode()").is_err());
    Ok(())
}

#[test]
fn test_instance_tags_resolve_through_the_registered_table() -> Result<()> {
    let mut evaluator = evaluator();
    evaluator.register_instance("first", 0);
    evaluator.register_instance("last", 2);

    assert!(evaluator.evaluate("scores[@first] == 10")?);
    assert!(evaluator.evaluate("scores[@last] == 30")?);
    Ok(())
}

#[test]
fn test_functions_inside_membership_lists() -> Result<()> {
    let evaluator = evaluator();
    assert!(evaluator.evaluate("status >+< [lower('ACTIVE'), 'pending']")?);
    Ok(())
}
