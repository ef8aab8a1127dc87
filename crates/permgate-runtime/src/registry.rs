//! Named predicate registry.
//!
//! Declarative manifests cannot carry code, so predicate requirements refer
//! to predicates by name. The registry resolves those names.
//!
//! # Builtins
//!
//! [`PredicateRegistry::with_builtins`] pre-registers:
//!
//! | Name | Matches when |
//! |------|--------------|
//! | `always` | always |
//! | `never` | never |
//! | `resource_owner` | the record's `owner` string is among the granted permissions |

use async_trait::async_trait;
use permgate_core::{Permission, Predicate, PredicateError, PredicateInput};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps predicate names to implementations.
pub struct PredicateRegistry<P: Permission> {
    predicates: HashMap<String, Arc<dyn Predicate<P>>>,
}

impl<P: Permission> PredicateRegistry<P> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }

    /// Registers a predicate under `name`. A previous entry with the same
    /// name is replaced and returned.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        predicate: impl Predicate<P> + 'static,
    ) -> Option<Arc<dyn Predicate<P>>> {
        let name = name.into();
        let previous = self.predicates.insert(name.clone(), Arc::new(predicate));
        if previous.is_some() {
            tracing::debug!(predicate = %name, "replaced registered predicate");
        }
        previous
    }

    /// Removes a predicate. Returns `true` if it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.predicates.remove(name).is_some()
    }

    /// Looks up a predicate by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Predicate<P>>> {
        self.predicates.get(name).cloned()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Number of registered predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<P: Permission> Default for PredicateRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Permission> std::fmt::Debug for PredicateRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl PredicateRegistry<String> {
    /// Creates a registry holding the builtin predicates.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("always", Constant(true));
        registry.register("never", Constant(false));
        registry.register("resource_owner", ResourceOwner);
        registry
    }
}

struct Constant(bool);

#[async_trait]
impl<P: Permission> Predicate<P> for Constant {
    async fn evaluate(&self, _input: PredicateInput<'_, P>) -> Result<bool, PredicateError> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        if self.0 {
            "always"
        } else {
            "never"
        }
    }
}

struct ResourceOwner;

#[async_trait]
impl Predicate<String> for ResourceOwner {
    async fn evaluate(&self, input: PredicateInput<'_, String>) -> Result<bool, PredicateError> {
        let Some(record) = input.record else {
            return Ok(false);
        };
        match record.get("owner") {
            None | Some(serde_json::Value::Null) => Ok(false),
            Some(serde_json::Value::String(owner)) => {
                Ok(input.permissions.as_slice().iter().any(|p| p == owner))
            }
            Some(other) => Err(PredicateError::new(format!(
                "record owner must be a string, got {other}"
            ))),
        }
    }

    fn name(&self) -> &str {
        "resource_owner"
    }
}
