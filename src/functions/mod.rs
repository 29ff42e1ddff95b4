//! The function registry.
//!
//! Maps function names to callables. A fresh registry is seeded with the
//! built-in library; hosts can register additional functions (or replace
//! existing ones) at any time.

mod builtins;

use std::{collections::HashMap, error::Error, fmt::Display};

use crate::value::Value;

/// What a callable returns: a value, or a cause to be wrapped into a
/// function-execution-failed error by the evaluator.
pub type FunctionResult = Result<Value, Box<dyn Error + Send + Sync>>;

pub type Callable = Box<dyn Fn(&[Value]) -> FunctionResult + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryError(pub String);

impl Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for RegistryError {}

pub struct FunctionRegistry {
    functions: HashMap<String, Callable>,
}

impl FunctionRegistry {
    /// An empty registry without even the built-ins.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// A registry seeded with the built-in library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        builtins::register_all(&mut registry);
        registry
    }

    /// Register a callable under `name`. Re-registration replaces the
    /// previous callable.
    pub fn register(
        &mut self,
        name: &str,
        callable: impl Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError(
                "function name must not be blank".to_string(),
            ));
        }

        self.functions.insert(name.to_owned(), Box::new(callable));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.functions.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}
