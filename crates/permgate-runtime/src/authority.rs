//! Authorities: where granted permissions come from.
//!
//! The engine never fetches permissions itself. A gate asks its
//! [`Authority`] exactly once per resolution request, then hands the
//! resolved value to the matcher or resolver.
//!
//! # Architecture
//!
//! ```text
//! Authority trait (THIS MODULE)        <- fetches GrantedPermissions
//!      │
//!      ├── StaticAuthority             <- fixed value (CLI, tests)
//!      ├── FnAuthority                 <- synchronous closure
//!      └── (caller-provided)           <- session store, token claims, remote IAM
//! ```
//!
//! Caching, if any, belongs inside an authority implementation.

use async_trait::async_trait;
use permgate_core::Permission;
use permgate_types::{ErrorCode, GrantedPermissions, ResolveContext};
use std::sync::Arc;
use thiserror::Error;

/// Failure to obtain granted permissions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// The authority could not be reached or did not answer.
    #[error("authority unavailable: {0}")]
    Unavailable(String),

    /// The authority refused to disclose permissions for this actor.
    #[error("authority rejected request: {0}")]
    Rejected(String),
}

impl ErrorCode for AuthorityError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "AUTHORITY_UNAVAILABLE",
            Self::Rejected(_) => "AUTHORITY_REJECTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Supplies the current actor's granted permissions.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use permgate_runtime::{Authority, AuthorityError};
/// use permgate_types::{GrantedPermissions, PermissionValue, ResolveContext};
///
/// struct HeaderRoles(Vec<String>);
///
/// #[async_trait]
/// impl Authority<String> for HeaderRoles {
///     async fn get_permissions(
///         &self,
///         _ctx: &ResolveContext,
///     ) -> Result<GrantedPermissions<String>, AuthorityError> {
///         Ok(PermissionValue::Many(self.0.clone()))
///     }
/// }
/// ```
#[async_trait]
pub trait Authority<P: Permission>: Send + Sync {
    /// Fetches granted permissions for the given context.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError`] if permissions cannot be obtained.
    async fn get_permissions(
        &self,
        ctx: &ResolveContext,
    ) -> Result<GrantedPermissions<P>, AuthorityError>;
}

#[async_trait]
impl<P, A> Authority<P> for Arc<A>
where
    P: Permission,
    A: Authority<P> + ?Sized,
{
    async fn get_permissions(
        &self,
        ctx: &ResolveContext,
    ) -> Result<GrantedPermissions<P>, AuthorityError> {
        self.as_ref().get_permissions(ctx).await
    }
}

/// Authority that always answers with the same permissions.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticAuthority<P> {
    granted: GrantedPermissions<P>,
}

impl<P> StaticAuthority<P> {
    /// Creates an authority answering with `granted`.
    #[must_use]
    pub fn new(granted: GrantedPermissions<P>) -> Self {
        Self { granted }
    }

    /// The permissions this authority hands out.
    #[must_use]
    pub fn granted(&self) -> &GrantedPermissions<P> {
        &self.granted
    }
}

#[async_trait]
impl<P: Permission + Clone> Authority<P> for StaticAuthority<P> {
    async fn get_permissions(
        &self,
        _ctx: &ResolveContext,
    ) -> Result<GrantedPermissions<P>, AuthorityError> {
        Ok(self.granted.clone())
    }
}

/// Authority backed by a synchronous closure.
///
/// ```
/// use permgate_runtime::{Authority, AuthorityError, FnAuthority};
/// use permgate_types::{GrantedPermissions, PermissionValue, ResolveContext};
///
/// let authority = FnAuthority::new(|ctx: &ResolveContext| match ctx.resource() {
///     Some("billing") => Err(AuthorityError::Rejected("billing is audited".into())),
///     _ => Ok(PermissionValue::One("viewer".to_string())),
/// });
///
/// let posts = ResolveContext::new().with_resource("posts");
/// let granted: GrantedPermissions<String> =
///     futures::executor::block_on(authority.get_permissions(&posts)).unwrap();
/// assert_eq!(granted, PermissionValue::One("viewer".to_string()));
///
/// let billing = ResolveContext::new().with_resource("billing");
/// let rejected: Result<GrantedPermissions<String>, _> =
///     futures::executor::block_on(authority.get_permissions(&billing));
/// assert!(rejected.is_err());
/// ```
pub struct FnAuthority<F> {
    f: F,
}

impl<F> FnAuthority<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<P, F> Authority<P> for FnAuthority<F>
where
    P: Permission,
    F: Fn(&ResolveContext) -> Result<GrantedPermissions<P>, AuthorityError> + Send + Sync,
{
    async fn get_permissions(
        &self,
        ctx: &ResolveContext,
    ) -> Result<GrantedPermissions<P>, AuthorityError> {
        (self.f)(ctx)
    }
}
