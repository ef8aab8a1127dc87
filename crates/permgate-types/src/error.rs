//! Unified error code interface.
//!
//! Every permgate error type implements [`ErrorCode`] so callers can
//! branch on a stable machine-readable code instead of message text.
//!
//! # Code Format
//!
//! - **UPPER_SNAKE_CASE**: e.g. `"RESOLVE_PREDICATE_FAILED"`
//! - **Namespace-prefixed**: `RESOLVE_`, `AUTHORITY_`, `GATE_`, `DECL_`, `CONFIG_`
//! - **Stable**: codes do not change once published
//!
//! # Example
//!
//! ```
//! use permgate_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum FetchError {
//!     Timeout,
//!     Rejected,
//! }
//!
//! impl ErrorCode for FetchError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Timeout => "FETCH_TIMEOUT",
//!             Self::Rejected => "FETCH_REJECTED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//! }
//!
//! assert_eq!(FetchError::Timeout.code(), "FETCH_TIMEOUT");
//! assert!(!FetchError::Rejected.is_recoverable());
//! ```

/// Machine-readable error code plus recoverability.
pub trait ErrorCode {
    /// Returns a stable UPPER_SNAKE_CASE code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying (or fixing user input) may succeed.
    ///
    /// Misconfiguration and failing predicates are not recoverable:
    /// the declaration itself has to change.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, prefixed, and UPPER_SNAKE_CASE.
///
/// Intended for tests that walk every variant of an error enum.
///
/// # Panics
///
/// Panics with a descriptive message if any check fails.
///
/// ```
/// use permgate_types::{assert_error_code, ErrorCode};
///
/// struct Boom;
///
/// impl ErrorCode for Boom {
///     fn code(&self) -> &'static str { "TEST_BOOM" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Boom, "TEST_");
/// ```
pub fn assert_error_code<E: ErrorCode + ?Sized>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
