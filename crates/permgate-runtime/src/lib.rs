//! Runtime layer for permgate.
//!
//! Wires the resolution engine to the outside world:
//!
//! - [`Authority`]: where granted permissions come from
//! - [`WithPermission`] / [`SwitchPermissions`]: gates that fetch
//!   permissions once and decide
//! - [`ResourceGate`]: resource-level and per-action requirements
//! - [`filter_declarations`]: keeps the items of declarations whose gate
//!   grants access
//! - [`PredicateRegistry`]: named predicates for declarative configuration
//! - [`config`]: layered TOML configuration and declaration manifests
//!
//! # Crate Architecture
//!
//! ```text
//! permgate-types     (PermissionValue, ResolveContext, ErrorCode)
//!      │
//! permgate-core      (match_one, resolve_mapping)
//!      │
//! permgate-runtime   (THIS CRATE: authority, gates, filtering, config)
//!      │
//! permgate-cli       (permgate binary)
//! ```

mod authority;
pub mod config;
mod filter;
mod gate;
mod registry;

pub use authority::{Authority, AuthorityError, FnAuthority, StaticAuthority};
pub use filter::{
    evaluate_declarations, filter_declarations, Declaration, DeclarationKind, Outcome, Verdict,
};
pub use gate::{
    ActionDecision, Decision, Explanation, GateError, ResourceDecision, ResourceGate,
    SwitchPermissions, WithPermission,
};
pub use registry::PredicateRegistry;
