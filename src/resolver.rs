//! Resolution of identifier paths against the data tree.
//!
//! Missing map keys and out-of-range list indices resolve to null; missing
//! data is not a failure. Only structural misuse (indexing a scalar, dotting
//! into a list) is an error.

use std::{collections::HashMap, error::Error, fmt::Display};

use crate::{
    parser::ast::{IdentPath, PathIndex},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError(pub String);

impl Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for ResolveError {}

/// Walk `path` from `root` and return the value it names. Instance tags in
/// index position are looked up in `instances`.
pub fn resolve(
    root: &Value,
    path: &IdentPath,
    instances: &HashMap<String, usize>,
) -> Result<Value, ResolveError> {
    let mut current = root;

    for segment in &path.segments {
        current = match current {
            Value::Map(map) => match map.get(&segment.name) {
                Some(value) => value,
                // no such field: the rest of the path stays unresolved
                None => return Ok(Value::Null),
            },
            other => {
                return Err(ResolveError(format!(
                    "cannot access property '{}' of a {} value (in '{path}')",
                    segment.name,
                    other.type_name(),
                )))
            }
        };

        let Some(index) = &segment.index else {
            continue;
        };

        let position = match index {
            PathIndex::Position(position) => *position,
            PathIndex::Instance(tag) => match instances.get(tag) {
                Some(position) => *position,
                None => {
                    return Err(ResolveError(format!(
                        "unresolved instance tag '@{tag}' (in '{path}')"
                    )))
                }
            },
        };

        current = match current {
            Value::List(items) => match items.get(position) {
                Some(value) => value,
                // the list exists but is too short
                None => return Ok(Value::Null),
            },
            other => {
                return Err(ResolveError(format!(
                    "cannot index into a {} value (in '{path}')",
                    other.type_name(),
                )))
            }
        };
    }

    Ok(current.clone())
}
