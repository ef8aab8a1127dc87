//! Permission resolution engine.
//!
//! Two collaborating pieces, both stateless:
//!
//! | Piece | Entry point | Decides |
//! |-------|-------------|---------|
//! | Requirement Matcher | [`match_one`] | Does one requirement match the granted permissions? |
//! | Mapping Resolver | [`resolve_mapping`] | Which entry of an ordered mapping list wins? |
//!
//! # Matching Rules
//!
//! Evaluated in precedence order, first applicable rule wins:
//!
//! | Requirement | Granted | Matches when |
//! |-------------|---------|--------------|
//! | predicate | any | the predicate returns `true` |
//! | set (exact) | set | every required element is granted (empty set matches) |
//! | set | set | at least one required element is granted (empty set never matches) |
//! | set | scalar | the granted value is in the required set |
//! | scalar | set | the required value is in the granted set |
//! | scalar | scalar | the values are equal |
//!
//! # Resolution
//!
//! ```text
//! mappings: [A, B, C]
//!     │
//!     ├── match_one(A) ─┐
//!     ├── match_one(B) ─┼── join (all run, even after a match)
//!     └── match_one(C) ─┘
//!                       │
//!                       └── first `true` in list order wins
//! ```
//!
//! # Example
//!
//! ```
//! use permgate_core::{resolve_mapping, Requirement, RequirementSpec};
//! use permgate_types::{PermissionValue, ResolveContext};
//!
//! let mappings: Vec<RequirementSpec<&str, &str>> = vec![
//!     RequirementSpec::new(Requirement::scalar("admin"), "AdminView"),
//!     RequirementSpec::new(Requirement::set(["x", "y"]), "ListView"),
//! ];
//!
//! let granted = PermissionValue::one("y");
//! let ctx = ResolveContext::new();
//!
//! let found = futures::executor::block_on(resolve_mapping(&mappings, &granted, &ctx))
//!     .expect("no predicate can fail here");
//! assert_eq!(found.map(|m| *m.payload), Some("ListView"));
//! ```

mod error;
mod matcher;
mod predicate;
mod requirement;
mod resolver;

pub use error::ResolveError;
pub use matcher::match_one;
pub use predicate::{FnPredicate, Predicate, PredicateError, PredicateInput};
pub use requirement::{Permission, Requirement, RequirementSpec};
pub use resolver::{evaluate_mapping, resolve_mapping, MatchResult};

// Re-export foundation types for convenience
pub use permgate_types::{ErrorCode, GrantedPermissions, PermissionValue, ResolveContext};
