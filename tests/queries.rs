use anyhow::Result;
use objectql::{evaluate_json, Evaluator};

/// A flat document exercising every value kind.
const PROFILE: &str = r#"{
    "age": 25,
    "name": "John Doe",
    "status": "active",
    "scores": [10, 20, 30],
    "isActive": true,
    "nested": {"value": 42},
    "missing": null,
    "text": "Hello World"
}"#;

/// A deeply nested document with lists of maps.
const PERSON: &str = r#"{
    "person": {
        "age": 30,
        "name": "Alice Smith",
        "contact": {
            "email": "Alice.Smith@example.com",
            "phones": [
                {"number": "555 0100", "active": true},
                {"number": "555 0101", "active": false}
            ],
            "address": {
                "city": "Springfield",
                "coordinates": {"lat": 42.5, "lng": -71.3}
            }
        },
        "orders": [
            {"items": [{"sku": "A1", "price": 10.0}], "total": 10.0, "status": "shipped"},
            {"items": [{"sku": "B2", "price": 99.99}], "total": 99.99, "status": "pending"}
        ]
    }
}"#;

fn check(data: &str, query: &str, expected: bool) {
    let result = evaluate_json(data, query)
        .unwrap_or_else(|e| panic!("query '{query}' failed to evaluate: {e}"));
    assert_eq!(expected, result, "query '{query}'");
}

#[test]
fn test_range_test() {
    check(PROFILE, "age >=< [18, 65]", true);
    check(PROFILE, "age >=< [30, 65]", false);
    check(PROFILE, "age BETWEEN [18, 65]", true);
}

#[test]
fn test_range_test_with_missing_value_is_false() {
    check(PROFILE, "missing >=< [10, 20]", false);
}

#[test]
fn test_membership() {
    check(PROFILE, "status >+< ['active', 'pending']", true);
    check(PROFILE, "status >+< ['archived', 'deleted']", false);
    check(PROFILE, "age >+< [18, 21, 25]", true);
    check(PROFILE, "status IN ['active', 'pending']", true);
}

#[test]
fn test_negated_membership() {
    check(PROFILE, "status <> ['archived', 'deleted']", true);
    check(PROFILE, "status <> ['active']", false);
    check(PROFILE, "status NOT IN ['archived']", true);
}

#[test]
fn test_membership_against_a_list_in_the_data() {
    check(PROFILE, "scores[0] >+< scores", true);
    check(PROFILE, "age >+< scores", false);
    check(PROFILE, "missing >+< scores", false);
}

#[test]
fn test_wildcard_matching() {
    check(PROFILE, "name ~ 'John%'", true);
    check(PROFILE, "name ~ '%Doe'", true);
    check(PROFILE, "name ~ '%hn D%'", true);
    check(PROFILE, "name ~ 'John Doe'", true);
    check(PROFILE, "name ~ 'Jane%'", false);
    check(PROFILE, "name !~ 'Jane%'", true);
    check(PROFILE, "name LIKE 'John%'", true);
    check(PROFILE, "name NOT LIKE 'Jane%'", true);
}

#[test]
fn test_case_insensitive_matching() {
    check(PROFILE, "text ~~ 'hello%'", true);
    check(PROFILE, "text ~ 'hello%'", false);
    check(PROFILE, "text !~~ '%planet'", true);
    check(PROFILE, "text ILIKE '%world'", true);
    check(PROFILE, "name NOT ILIKE 'jane%'", true);
}

#[test]
fn test_arithmetic() {
    check(PROFILE, "nested.value * 2 == 84", true);
    check(PROFILE, "age + 5 == 30", true);
    check(PROFILE, "age - 5 < 25", true);
    check(PROFILE, "age / 2 == 12", true);
    check(PROFILE, "age % 2 == 1", true);
    check(PROFILE, "age * 2 + 10 == 60", true);
    check(PROFILE, "age + 2 * 10 == 45", true);
    check(PROFILE, "(age + 2) * 10 == 270", true);
    check(PROFILE, "2^10 == 1024", true);
}

#[test]
fn test_alphabetic_relational_spellings() {
    check(PROFILE, "age EQ 25", true);
    check(PROFILE, "age NE 30", true);
    check(PROFILE, "age GT 18", true);
    check(PROFILE, "age GTE 25", true);
    check(PROFILE, "age LT 65", true);
    check(PROFILE, "age LTE 25", true);
}

#[test]
fn test_null_comparisons() {
    check(PROFILE, "replace(missing, 'a', 'b') == null", true);
    check(PROFILE, "missing == null", true);
    check(PROFILE, "missing != null", false);
    check(PROFILE, "name != null", true);
    check(PROFILE, "null == null", true);
    check(PROFILE, "unknownField == null", true);
}

#[test]
fn test_list_indexing() {
    check(PROFILE, "scores[1] == 20", true);
    check(PROFILE, "scores[0] + scores[2] == 40", true);
    check(PROFILE, "scores[3] == null", true);
}

#[test]
fn test_identifier_length_round_trip() {
    check(
        PROFILE,
        "length(scores) == 3 AND scores[2] != null AND scores[3] == null",
        true,
    );
}

#[test]
fn test_boolean_fields() {
    check(PROFILE, "isActive", true);
    check(PROFILE, "isActive == true", true);
    check(PROFILE, "isActive != false", true);
    check(PROFILE, "true", true);
    check(PROFILE, "false", false);
}

#[test]
fn test_null_absorbs_arithmetic() {
    check(PROFILE, "missing + 1 == 1", false);
    check(PROFILE, "missing * 2 == 0", false);
    check(PROFILE, "age + missing == 25", false);
}

#[test]
fn test_logical_operators() {
    check(PROFILE, "age == 25 AND isActive", true);
    check(PROFILE, "age == 99 AND isActive", false);
    check(PROFILE, "age == 99 OR isActive", true);
    check(PROFILE, "age == 99 OR status == 'archived'", false);
}

#[test]
fn test_and_and_or_share_a_precedence_level() {
    // grammar-literal semantics: `a OR b AND c` is `(a OR b) AND c`, so the
    // false tail pulls the whole query down
    check(PROFILE, "age == 25 OR isActive AND age == 99", false);
    // with conventional precedence this would be true
    check(PROFILE, "age == 25 OR (isActive AND age == 99)", true);
}

#[test]
fn test_logical_operators_commute() {
    for (a, b) in [
        ("age == 25", "isActive"),
        ("age == 99", "isActive"),
        ("name ~ 'John%'", "status == 'active'"),
    ] {
        let forward = evaluate_json(PROFILE, &format!("{a} AND {b}")).unwrap();
        let backward = evaluate_json(PROFILE, &format!("{b} AND {a}")).unwrap();
        assert_eq!(forward, backward, "{a} AND {b}");
    }
}

#[test]
fn test_parenthesised_grouping_is_associative() {
    let left = evaluate_json(PROFILE, "(age == 25 AND isActive) AND name ~ 'John%'").unwrap();
    let right = evaluate_json(PROFILE, "age == 25 AND (isActive AND name ~ 'John%')").unwrap();
    assert_eq!(left, right);
    assert!(left);
}

#[test]
fn test_repeated_evaluation_is_stable() {
    let evaluator = Evaluator::from_json(PROFILE).unwrap();
    let query = "age >=< [18, 65] AND status >+< ['active', 'pending']";
    assert_eq!(
        evaluator.evaluate(query).unwrap(),
        evaluator.evaluate(query).unwrap()
    );
}

#[test]
fn test_deep_paths() {
    check(
        PERSON,
        "person.contact.phones[0].active == true AND person.contact.address.city == 'Springfield'",
        true,
    );
    check(PERSON, "person.contact.phones[1].active == true", false);
}

#[test]
fn test_deep_paths_with_list_of_maps() {
    check(
        PERSON,
        "person.orders[1].items[0].price == person.orders[1].total AND person.orders[1].status == 'pending'",
        true,
    );
}

#[test]
fn test_parenthesised_arithmetic_over_deep_paths() {
    check(
        PERSON,
        "(person.age + person.contact.address.coordinates.lat) >=< [70, 80] AND person.contact.email ~~ 'alice%'",
        true,
    );
}

#[test]
fn test_quoting_styles_are_interchangeable() {
    check(PERSON, "person.contact.address.city == \"Springfield\"", true);
}

#[test]
fn test_case_insensitive_logical_keywords() -> Result<()> {
    assert!(evaluate_json(PROFILE, "age == 25 and isActive")?);
    assert!(evaluate_json(PROFILE, "age == 99 or isActive")?);
    Ok(())
}

#[test]
fn test_evaluate_with_prebuilt_value_tree() -> Result<()> {
    let root: objectql::Value = serde_json::from_str(PROFILE)?;
    assert!(objectql::evaluate(root, "age == 25")?);
    Ok(())
}
