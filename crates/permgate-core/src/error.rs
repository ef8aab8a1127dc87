//! Resolution errors.
//!
//! A resolution either completes (with a match or with no match) or fails
//! as a whole. "No match" is not an error: it is `Ok(None)`.

use crate::predicate::PredicateError;
use permgate_types::ErrorCode;
use thiserror::Error;

/// Failure of a matcher or resolver call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// A predicate requirement failed. Never masked or skipped.
    #[error("predicate '{predicate}' failed at mapping {index}: {source}")]
    Predicate {
        /// Position of the failing entry in the mapping list.
        index: usize,
        /// Name reported by the predicate.
        predicate: String,
        /// The predicate's own error.
        #[source]
        source: PredicateError,
    },
}

impl ResolveError {
    /// Creates a predicate failure.
    pub fn predicate(index: usize, predicate: impl Into<String>, source: PredicateError) -> Self {
        Self::Predicate {
            index,
            predicate: predicate.into(),
            source,
        }
    }

    /// Position of the mapping entry that failed.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Predicate { index, .. } => *index,
        }
    }
}

impl ErrorCode for ResolveError {
    fn code(&self) -> &'static str {
        match self {
            Self::Predicate { .. } => "RESOLVE_PREDICATE_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permgate_types::assert_error_code;

    #[test]
    fn predicate_failure_display() {
        let err = ResolveError::predicate(3, "owner_only", PredicateError::new("no record"));
        let msg = err.to_string();
        assert!(msg.contains("owner_only"), "got: {msg}");
        assert!(msg.contains("mapping 3"), "got: {msg}");
        assert!(msg.contains("no record"), "got: {msg}");
        assert_eq!(err.index(), 3);
    }

    #[test]
    fn source_is_predicate_error() {
        use std::error::Error as _;

        let err = ResolveError::predicate(0, "p", PredicateError::new("inner"));
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("inner"));
    }

    #[test]
    fn error_codes() {
        let err = ResolveError::predicate(0, "p", PredicateError::new("x"));
        assert_error_code(&err, "RESOLVE_");
        assert!(!err.is_recoverable());
    }
}
