//! Declaration filtering.
//!
//! A declaration list mixes plain entries with gated ones. Filtering keeps
//! plain entries unconditionally and keeps a gated entry's items only when
//! its gate grants access. A resource keeps its items when its own
//! requirement holds, and reports which of its actions are denied.
//!
//! ```text
//! declarations: [Plain, Resource, WithPermission, SwitchPermissions]
//!     │
//!     ├── Plain              → items kept, authority not consulted
//!     ├── Resource           → authority once → match_one per requirement
//!     ├── WithPermission     → authority once → match_one
//!     └── SwitchPermissions  → authority once → resolve_mapping
//!            │
//!            └── all gated declarations evaluated concurrently,
//!                survivors flattened in declaration order
//! ```
//!
//! Any gate failure fails the whole filtering.

use crate::authority::Authority;
use crate::gate::{
    ActionDecision, Decision, GateError, ResourceDecision, ResourceGate, SwitchPermissions,
    WithPermission,
};
use futures::future::join_all;
use permgate_core::Permission;
use permgate_types::{GrantedPermissions, ResolveContext};

/// How a declaration is guarded.
#[derive(Debug, Clone)]
pub enum DeclarationKind<P: Permission, T> {
    /// Always kept.
    Plain(Vec<T>),
    /// Kept when its resource requirement holds; actions decided one by one.
    Resource(ResourceGate<P, Vec<T>>),
    /// Kept when the single requirement matches.
    WithPermission(WithPermission<P, Vec<T>>),
    /// Kept with the items of the first matching branch.
    SwitchPermissions(SwitchPermissions<P, Vec<T>>),
}

/// A named, possibly gated, group of items.
#[derive(Debug, Clone)]
pub struct Declaration<P: Permission, T> {
    /// Name used in logs and verdicts.
    pub name: String,
    /// The guard.
    pub kind: DeclarationKind<P, T>,
}

impl<P: Permission, T> Declaration<P, T> {
    /// Ungated declaration.
    pub fn plain(name: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::Plain(items),
        }
    }

    /// Resource with resource-level and per-action requirements.
    pub fn resource(name: impl Into<String>, gate: ResourceGate<P, Vec<T>>) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::Resource(gate),
        }
    }

    /// Declaration guarded by one requirement.
    pub fn with_permission(name: impl Into<String>, gate: WithPermission<P, Vec<T>>) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::WithPermission(gate),
        }
    }

    /// Declaration guarded by ordered branches.
    pub fn switch_permissions(
        name: impl Into<String>,
        gate: SwitchPermissions<P, Vec<T>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::SwitchPermissions(gate),
        }
    }

    /// Returns `true` if evaluating this declaration consults the authority.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        match &self.kind {
            DeclarationKind::Plain(_) => false,
            DeclarationKind::Resource(gate) => gate.is_gated(),
            DeclarationKind::WithPermission(_) | DeclarationKind::SwitchPermissions(_) => true,
        }
    }
}

/// What happened to one declaration.
#[derive(Debug, PartialEq)]
pub enum Outcome<'a, P, T> {
    /// Ungated; items kept.
    Unguarded(&'a [T]),
    /// Resource kept, with one verdict per action.
    Kept {
        /// The resource's items.
        items: &'a [T],
        /// Per-action verdicts, in declaration order.
        actions: Vec<ActionDecision<'a>>,
    },
    /// Gate granted; `branch` is 0 for single-requirement gates.
    Granted {
        /// Winning branch.
        branch: usize,
        /// Items of the winning branch.
        items: &'a [T],
    },
    /// Gate denied.
    Denied {
        /// Permissions the authority returned.
        granted: GrantedPermissions<P>,
    },
}

/// Per-declaration result of [`evaluate_declarations`].
#[derive(Debug, PartialEq)]
pub struct Verdict<'a, P, T> {
    /// Declaration name.
    pub name: &'a str,
    /// What happened.
    pub outcome: Outcome<'a, P, T>,
}

impl<'a, P, T> Verdict<'a, P, T> {
    /// Items that survive, empty on denial.
    #[must_use]
    pub fn items(&self) -> &'a [T] {
        match self.outcome {
            Outcome::Unguarded(items)
            | Outcome::Kept { items, .. }
            | Outcome::Granted { items, .. } => items,
            Outcome::Denied { .. } => &[],
        }
    }

    /// Actions of a kept resource, empty for every other outcome.
    #[must_use]
    pub fn actions(&self) -> &[ActionDecision<'a>] {
        match &self.outcome {
            Outcome::Kept { actions, .. } => actions.as_slice(),
            _ => &[],
        }
    }

    /// Names of the denied actions of a kept resource.
    #[must_use]
    pub fn denied_actions(&self) -> Vec<&'a str> {
        self.actions()
            .iter()
            .filter(|a| !a.allowed)
            .map(|a| a.name)
            .collect()
    }
}

/// Evaluates every declaration and reports each outcome in order.
///
/// Gated declarations each ask the authority once and run concurrently.
///
/// # Errors
///
/// Returns the first failure in declaration order if any gate fails.
pub async fn evaluate_declarations<'a, P, T, A>(
    declarations: &'a [Declaration<P, T>],
    authority: &A,
    ctx: &ResolveContext,
) -> Result<Vec<Verdict<'a, P, T>>, GateError>
where
    P: Permission,
    A: Authority<P> + ?Sized,
{
    let pending = declarations
        .iter()
        .map(|declaration| evaluate_one(declaration, authority, ctx));

    let verdicts = join_all(pending)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        declarations = declarations.len(),
        kept = verdicts.iter().filter(|v| !v.items().is_empty()).count(),
        resource = ctx.resource(),
        "declarations evaluated"
    );

    Ok(verdicts)
}

/// Keeps the items of every declaration that survives, flattened in order.
///
/// # Errors
///
/// Fails as a whole if any gate fails.
///
/// # Example
///
/// ```
/// use permgate_core::{Requirement, RequirementSpec};
/// use permgate_runtime::{filter_declarations, Declaration, StaticAuthority, WithPermission};
/// use permgate_types::{PermissionValue, ResolveContext};
///
/// let declarations = vec![
///     Declaration::plain("dashboard", vec!["dashboard"]),
///     Declaration::with_permission(
///         "users",
///         WithPermission::new(RequirementSpec::new(
///             Requirement::scalar("admin".to_string()),
///             vec!["users"],
///         )),
///     ),
/// ];
/// let authority = StaticAuthority::new(PermissionValue::One("viewer".to_string()));
///
/// let kept = futures::executor::block_on(
///     filter_declarations(&declarations, &authority, &ResolveContext::new()),
/// ).unwrap();
/// assert_eq!(kept, vec![&"dashboard"]);
/// ```
pub async fn filter_declarations<'a, P, T, A>(
    declarations: &'a [Declaration<P, T>],
    authority: &A,
    ctx: &ResolveContext,
) -> Result<Vec<&'a T>, GateError>
where
    P: Permission,
    A: Authority<P> + ?Sized,
{
    let verdicts = evaluate_declarations(declarations, authority, ctx).await?;
    Ok(verdicts.iter().flat_map(|v| v.items()).collect())
}

async fn evaluate_one<'a, P, T, A>(
    declaration: &'a Declaration<P, T>,
    authority: &A,
    ctx: &ResolveContext,
) -> Result<Verdict<'a, P, T>, GateError>
where
    P: Permission,
    A: Authority<P> + ?Sized,
{
    let outcome = match &declaration.kind {
        DeclarationKind::Plain(items) => Ok(Outcome::Unguarded(items)),
        DeclarationKind::Resource(gate) => gate.evaluate(authority, ctx).await.map(kept_outcome),
        DeclarationKind::WithPermission(gate) => {
            gate.evaluate(authority, ctx).await.map(granted_outcome)
        }
        DeclarationKind::SwitchPermissions(gate) => {
            gate.evaluate(authority, ctx).await.map(granted_outcome)
        }
    };

    let outcome = outcome.map_err(|e| {
        tracing::warn!(declaration = %declaration.name, error = %e, "gate failed");
        e
    })?;

    Ok(Verdict {
        name: &declaration.name,
        outcome,
    })
}

fn granted_outcome<'a, P, T>(decision: Decision<'a, P, Vec<T>>) -> Outcome<'a, P, T> {
    match decision {
        Decision::Granted { index, payload } => Outcome::Granted {
            branch: index,
            items: payload.as_slice(),
        },
        Decision::Denied { granted } => Outcome::Denied { granted },
    }
}

fn kept_outcome<'a, P, T>(decision: ResourceDecision<'a, P, Vec<T>>) -> Outcome<'a, P, T> {
    match decision {
        ResourceDecision::Kept { payload, actions } => Outcome::Kept {
            items: payload.as_slice(),
            actions,
        },
        ResourceDecision::Denied { granted } => Outcome::Denied { granted },
    }
}
