//! Permission value shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single permission or a finite ordered set of permissions.
///
/// Order is preserved exactly as supplied. Duplicates are kept; they never
/// change the outcome of a membership test.
///
/// Serializes untagged: a bare value for `One`, an array for `Many`.
///
/// # Example
///
/// ```
/// use permgate_types::PermissionValue;
///
/// let one: PermissionValue<String> = serde_json::from_str(r#""admin""#).unwrap();
/// assert_eq!(one, PermissionValue::one("admin".to_string()));
///
/// let many: PermissionValue<String> = serde_json::from_str(r#"["a", "b"]"#).unwrap();
/// assert!(many.is_many());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue<P> {
    /// A single permission (e.g. a role name).
    One(P),
    /// An ordered set of permissions.
    Many(Vec<P>),
}

/// The permissions held by the current actor, as supplied by an authority.
pub type GrantedPermissions<P> = PermissionValue<P>;

impl<P> PermissionValue<P> {
    /// Creates a single-permission value.
    #[must_use]
    pub fn one(value: impl Into<P>) -> Self {
        Self::One(value.into())
    }

    /// Creates a set value from any iterator, preserving order.
    #[must_use]
    pub fn many<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<P>,
    {
        Self::Many(values.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for the `One` shape.
    #[must_use]
    pub fn is_one(&self) -> bool {
        matches!(self, Self::One(_))
    }

    /// Returns `true` for the `Many` shape.
    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Returns the permissions as a slice (`One` yields a one-element slice).
    #[must_use]
    pub fn as_slice(&self) -> &[P] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    /// Number of permissions carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` only for an empty `Many`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl<P: PartialEq> PermissionValue<P> {
    /// Membership test.
    ///
    /// For `One` this is plain equality.
    #[must_use]
    pub fn contains(&self, permission: &P) -> bool {
        match self {
            Self::One(value) => value == permission,
            Self::Many(values) => values.contains(permission),
        }
    }
}

impl PermissionValue<String> {
    /// Builds a value from a list of names: one name gives `One`,
    /// anything else gives `Many`.
    ///
    /// This is how command-line flags and comma-separated environment
    /// variables are interpreted.
    ///
    /// ```
    /// use permgate_types::PermissionValue;
    ///
    /// assert!(PermissionValue::from_names(vec!["admin".to_string()]).is_one());
    /// assert!(PermissionValue::from_names(vec!["a".into(), "b".into()]).is_many());
    /// assert!(PermissionValue::from_names(Vec::new()).is_many());
    /// ```
    #[must_use]
    pub fn from_names(mut names: Vec<String>) -> Self {
        if names.len() == 1 {
            if let Some(name) = names.pop() {
                return Self::One(name);
            }
        }
        Self::Many(names)
    }

    /// Parses a comma-separated list, trimming whitespace and skipping
    /// empty items.
    #[must_use]
    pub fn parse_list(list: &str) -> Self {
        Self::from_names(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl<P> From<Vec<P>> for PermissionValue<P> {
    fn from(values: Vec<P>) -> Self {
        Self::Many(values)
    }
}

impl<P: fmt::Display> fmt::Display for PermissionValue<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(value) => write!(f, "{value}"),
            Self::Many(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_contains_is_equality() {
        let value: PermissionValue<&str> = PermissionValue::one("admin");
        assert!(value.contains(&"admin"));
        assert!(!value.contains(&"user"));
    }

    #[test]
    fn many_contains_is_membership() {
        let value: PermissionValue<&str> = PermissionValue::many(["x", "y"]);
        assert!(value.contains(&"y"));
        assert!(!value.contains(&"z"));
    }

    #[test]
    fn as_slice_of_one() {
        let value: PermissionValue<u32> = PermissionValue::One(3);
        assert_eq!(value.as_slice(), &[3]);
        assert_eq!(value.len(), 1);
        assert!(!value.is_empty());
    }

    #[test]
    fn empty_many() {
        let value: PermissionValue<u32> = PermissionValue::Many(Vec::new());
        assert!(value.is_empty());
        assert!(value.is_many());
    }

    #[test]
    fn parse_list_single_is_one() {
        assert_eq!(
            PermissionValue::parse_list(" admin "),
            PermissionValue::One("admin".to_string())
        );
    }

    #[test]
    fn parse_list_multiple_is_many() {
        assert_eq!(
            PermissionValue::parse_list("a, b,,c"),
            PermissionValue::Many(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn display_formats() {
        assert_eq!(PermissionValue::One("admin").to_string(), "admin");
        assert_eq!(PermissionValue::Many(vec!["a", "b"]).to_string(), "[a, b]");
    }

    #[test]
    fn serde_untagged_shapes() {
        let one: PermissionValue<String> = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(one, PermissionValue::One("admin".into()));

        let many: PermissionValue<String> = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(many, PermissionValue::Many(vec!["x".into(), "y".into()]));

        assert_eq!(serde_json::to_string(&one).unwrap(), r#""admin""#);
    }
}
