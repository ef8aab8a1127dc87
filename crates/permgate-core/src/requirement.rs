//! Requirement specifications.

use crate::predicate::{FnPredicate, Predicate, PredicateError, PredicateInput};
use std::fmt;
use std::sync::Arc;

/// Bound for permission identities.
///
/// Anything equality-comparable that can cross task boundaries qualifies:
/// role names, enums, numeric ids.
pub trait Permission: PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> Permission for T where T: PartialEq + fmt::Debug + Send + Sync + 'static {}

/// What a mapping entry requires.
///
/// The three shapes are dispatched explicitly by the matcher; see
/// [`match_one`](crate::match_one) for the precedence table.
pub enum Requirement<P: Permission> {
    /// A single permission value.
    Scalar(P),
    /// A finite ordered set of permission values.
    Set(Vec<P>),
    /// Custom logic.
    Predicate(Arc<dyn Predicate<P>>),
}

impl<P: Permission> Requirement<P> {
    /// Single-value requirement.
    #[must_use]
    pub fn scalar(value: impl Into<P>) -> Self {
        Self::Scalar(value.into())
    }

    /// Set requirement, order preserved.
    #[must_use]
    pub fn set<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<P>,
    {
        Self::Set(values.into_iter().map(Into::into).collect())
    }

    /// Predicate requirement from any [`Predicate`] implementation.
    #[must_use]
    pub fn predicate(predicate: impl Predicate<P> + 'static) -> Self {
        Self::Predicate(Arc::new(predicate))
    }

    /// Predicate requirement from a synchronous, infallible closure.
    ///
    /// ```
    /// use permgate_core::Requirement;
    ///
    /// let req: Requirement<String> =
    ///     Requirement::from_fn("products_only", |input| input.resource == Some("products"));
    /// assert_eq!(req.kind(), "predicate");
    /// ```
    #[must_use]
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&PredicateInput<'_, P>) -> bool + Send + Sync + 'static,
    {
        Self::try_from_fn(name, move |input: &PredicateInput<'_, P>| Ok(f(input)))
    }

    /// Predicate requirement from a synchronous, fallible closure.
    #[must_use]
    pub fn try_from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&PredicateInput<'_, P>) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self::predicate(FnPredicate::new(name, f))
    }

    /// Shape name for logs: `"scalar"`, `"set"` or `"predicate"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Set(_) => "set",
            Self::Predicate(_) => "predicate",
        }
    }
}

impl<P: Permission + Clone> Clone for Requirement<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Scalar(value) => Self::Scalar(value.clone()),
            Self::Set(values) => Self::Set(values.clone()),
            Self::Predicate(predicate) => Self::Predicate(Arc::clone(predicate)),
        }
    }
}

impl<P: Permission> fmt::Debug for Requirement<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Set(values) => f.debug_tuple("Set").field(values).finish(),
            Self::Predicate(predicate) => f
                .debug_tuple("Predicate")
                .field(&predicate.name())
                .finish(),
        }
    }
}

/// One entry of a mapping list: a requirement, its `exact` flag, and the
/// payload handed back when it matches.
///
/// Immutable once constructed. The payload is never inspected.
#[derive(Debug, Clone)]
pub struct RequirementSpec<P: Permission, T> {
    requirement: Requirement<P>,
    exact: bool,
    payload: T,
}

impl<P: Permission, T> RequirementSpec<P, T> {
    /// Creates an entry with `exact = false`.
    #[must_use]
    pub fn new(requirement: Requirement<P>, payload: T) -> Self {
        Self {
            requirement,
            exact: false,
            payload,
        }
    }

    /// Creates an entry with `exact = true`.
    #[must_use]
    pub fn exact(requirement: Requirement<P>, payload: T) -> Self {
        Self {
            requirement,
            exact: true,
            payload,
        }
    }

    /// Creates an entry with an explicit `exact` flag.
    #[must_use]
    pub fn with_exact(requirement: Requirement<P>, exact: bool, payload: T) -> Self {
        Self {
            requirement,
            exact,
            payload,
        }
    }

    /// The requirement.
    #[must_use]
    pub fn requirement(&self) -> &Requirement<P> {
        &self.requirement
    }

    /// The `exact` flag.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// The payload.
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes the entry, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> T {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_exact() {
        let a: RequirementSpec<&str, u8> = RequirementSpec::new(Requirement::scalar("a"), 1);
        let b: RequirementSpec<&str, u8> = RequirementSpec::exact(Requirement::scalar("b"), 2);
        let c: RequirementSpec<&str, u8> =
            RequirementSpec::with_exact(Requirement::scalar("c"), true, 3);

        assert!(!a.is_exact());
        assert!(b.is_exact());
        assert!(c.is_exact());
        assert_eq!(*c.payload(), 3);
        assert_eq!(c.into_payload(), 3);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Requirement::<&str>::scalar("a").kind(), "scalar");
        assert_eq!(Requirement::<&str>::set(["a", "b"]).kind(), "set");
        assert_eq!(Requirement::<&str>::from_fn("p", |_| true).kind(), "predicate");
    }

    #[test]
    fn debug_shows_predicate_name() {
        let req = Requirement::<&str>::from_fn("owner_only", |_| false);
        assert_eq!(format!("{req:?}"), r#"Predicate("owner_only")"#);

        let req = Requirement::<&str>::set(["x"]);
        assert_eq!(format!("{req:?}"), r#"Set(["x"])"#);
    }

    #[test]
    fn clone_shares_predicate() {
        let req = Requirement::<&str>::from_fn("p", |_| true);
        let cloned = req.clone();
        match (&req, &cloned) {
            (Requirement::Predicate(a), Requirement::Predicate(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected predicates"),
        }
    }
}
