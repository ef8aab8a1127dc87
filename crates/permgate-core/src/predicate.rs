//! Custom predicate requirements.
//!
//! A [`Predicate`] decides a requirement with arbitrary logic, typically
//! when the decision depends on the record or resource being acted on.
//!
//! Predicates are always asynchronous at the trait boundary. A synchronous
//! decision is simply an `async fn` that never awaits; [`FnPredicate`]
//! adapts a plain closure that way.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use permgate_core::{Predicate, PredicateError, PredicateInput};
//!
//! struct OwnerOnly;
//!
//! #[async_trait]
//! impl Predicate<String> for OwnerOnly {
//!     async fn evaluate(
//!         &self,
//!         input: PredicateInput<'_, String>,
//!     ) -> Result<bool, PredicateError> {
//!         let owner = input
//!             .record
//!             .and_then(|r| r.get("owner"))
//!             .and_then(|o| o.as_str());
//!         Ok(owner.is_some_and(|o| input.permissions.contains(&o.to_string())))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "owner_only"
//!     }
//! }
//! ```

use crate::requirement::Permission;
use async_trait::async_trait;
use permgate_types::{GrantedPermissions, ResolveContext};
use serde_json::Value;
use thiserror::Error;

/// Everything a predicate may look at.
///
/// `exact` is the flag declared on the mapping entry; it is always present
/// and defaults to `false`.
#[derive(Debug)]
pub struct PredicateInput<'a, P> {
    /// The actor's granted permissions.
    pub permissions: &'a GrantedPermissions<P>,
    /// The record being acted on, if any.
    pub record: Option<&'a Value>,
    /// The resource identifier, if any.
    pub resource: Option<&'a str>,
    /// The `exact` flag of the mapping entry.
    pub exact: bool,
}

impl<'a, P> PredicateInput<'a, P> {
    /// Builds the input from the shared resolution context.
    #[must_use]
    pub fn new(
        permissions: &'a GrantedPermissions<P>,
        ctx: &'a ResolveContext,
        exact: bool,
    ) -> Self {
        Self {
            permissions,
            record: ctx.record(),
            resource: ctx.resource(),
            exact,
        }
    }
}

/// Failure raised by a predicate.
///
/// Predicate failures are never masked: they fail the whole resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    /// Creates a predicate error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A requirement decided by custom logic.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the resolver evaluates every
/// mapping entry concurrently.
#[async_trait]
pub trait Predicate<P: Permission>: Send + Sync {
    /// Decides whether the requirement is met.
    ///
    /// # Errors
    ///
    /// Returns [`PredicateError`] when the decision cannot be made. The
    /// error propagates unmodified to the caller of the resolution.
    async fn evaluate(&self, input: PredicateInput<'_, P>) -> Result<bool, PredicateError>;

    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Adapts a synchronous closure into a [`Predicate`].
///
/// The closure's result is returned as an already-completed future, so a
/// synchronous predicate and an asynchronous one reach the same outcome.
pub struct FnPredicate<F> {
    name: String,
    f: F,
}

impl<F> FnPredicate<F> {
    /// Wraps `f` under the given name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> std::fmt::Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P, F> Predicate<P> for FnPredicate<F>
where
    P: Permission,
    F: Fn(&PredicateInput<'_, P>) -> Result<bool, PredicateError> + Send + Sync,
{
    async fn evaluate(&self, input: PredicateInput<'_, P>) -> Result<bool, PredicateError> {
        (self.f)(&input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
