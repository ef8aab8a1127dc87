//! Foundation types for permgate.
//!
//! This crate provides the values shared by every permgate layer.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  permgate-types   : PermissionValue, ResolveContext  ◄── HERE│
//! ├─────────────────────────────────────────────────────────────┤
//! │  permgate-core    : Requirement Matcher, Mapping Resolver    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  permgate-runtime : Authority, gates, manifest, config       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  permgate-cli     : `permgate` binary                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Permission Values
//!
//! A [`PermissionValue`] is either a single permission (`One`) or a finite
//! ordered set of permissions (`Many`). The same shape describes both a
//! static requirement and the actor's [`GrantedPermissions`].
//!
//! # Example
//!
//! ```
//! use permgate_types::{PermissionValue, ResolveContext};
//! use serde_json::json;
//!
//! let granted = PermissionValue::many(["editor", "reviewer"]);
//! assert!(granted.contains(&"editor"));
//! assert!(!granted.contains(&"admin"));
//!
//! let ctx = ResolveContext::new()
//!     .with_resource("posts")
//!     .with_record(json!({"id": 7}));
//! assert_eq!(ctx.resource(), Some("posts"));
//! ```

mod context;
mod error;
mod value;

pub use context::ResolveContext;
pub use error::{assert_error_code, ErrorCode};
pub use value::{GrantedPermissions, PermissionValue};
