//! Permission gates.
//!
//! A gate fetches granted permissions from an [`Authority`] once, then
//! decides with the core engine:
//!
//! - [`WithPermission`]: a single requirement guarding one payload
//!   ([`match_one`]).
//! - [`SwitchPermissions`]: ordered branches, first match wins
//!   ([`resolve_mapping`]).
//! - [`ResourceGate`]: an optional requirement on the whole resource plus
//!   one optional requirement per action. A denied action is reported,
//!   a denied resource is dropped.
//!
//! On denial the fetched permissions are kept in the [`Decision`], so a
//! caller can render a fallback that depends on them.

use crate::authority::{Authority, AuthorityError};
use permgate_core::{
    evaluate_mapping, match_one, resolve_mapping, MatchResult, Permission, Requirement,
    ResolveError, RequirementSpec,
};
use futures::future::join_all;
use permgate_types::{ErrorCode, GrantedPermissions, ResolveContext};
use thiserror::Error;

/// Failure while evaluating a gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Granted permissions could not be fetched.
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// A predicate failed during resolution.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ErrorCode for GateError {
    fn code(&self) -> &'static str {
        match self {
            Self::Authority(_) => "GATE_AUTHORITY_FAILED",
            Self::Resolve(_) => "GATE_RESOLVE_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Authority(e) => e.is_recoverable(),
            Self::Resolve(e) => e.is_recoverable(),
        }
    }
}

/// Outcome of a gate.
#[derive(Debug, PartialEq)]
pub enum Decision<'a, P, T> {
    /// A requirement matched.
    Granted {
        /// Position of the winning branch (always 0 for [`WithPermission`]).
        index: usize,
        /// The payload attached to the winning requirement.
        payload: &'a T,
    },
    /// Nothing matched.
    Denied {
        /// The permissions the authority returned.
        granted: GrantedPermissions<P>,
    },
}

impl<'a, P, T> Decision<'a, P, T> {
    /// Returns `true` if access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// The winning payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&'a T> {
        match self {
            Self::Granted { payload, .. } => Some(*payload),
            Self::Denied { .. } => None,
        }
    }
}

/// Every entry's outcome alongside the permissions that produced it.
#[derive(Debug, PartialEq)]
pub struct Explanation<'a, P, T> {
    /// The permissions the authority returned.
    pub granted: GrantedPermissions<P>,
    /// One result per requirement, in declaration order.
    pub entries: Vec<MatchResult<'a, T>>,
}

impl<P, T> Explanation<'_, P, T> {
    /// Index of the entry that would win, if any.
    #[must_use]
    pub fn winner(&self) -> Option<usize> {
        self.entries.iter().find(|e| e.matched).map(|e| e.index)
    }
}

/// Single-requirement gate.
///
/// # Example
///
/// ```
/// use permgate_core::{Requirement, RequirementSpec};
/// use permgate_runtime::{StaticAuthority, WithPermission};
/// use permgate_types::{PermissionValue, ResolveContext};
///
/// let gate = WithPermission::new(RequirementSpec::new(
///     Requirement::scalar("admin".to_string()),
///     "delete button",
/// ));
/// let authority = StaticAuthority::new(PermissionValue::One("admin".to_string()));
///
/// let decision = futures::executor::block_on(gate.evaluate(&authority, &ResolveContext::new()))
///     .unwrap();
/// assert_eq!(decision.payload(), Some(&"delete button"));
/// ```
#[derive(Debug, Clone)]
pub struct WithPermission<P: Permission, T> {
    spec: RequirementSpec<P, T>,
}

impl<P: Permission, T> WithPermission<P, T> {
    /// Creates a gate around one requirement.
    #[must_use]
    pub fn new(spec: RequirementSpec<P, T>) -> Self {
        Self { spec }
    }

    /// The guarded requirement.
    #[must_use]
    pub fn spec(&self) -> &RequirementSpec<P, T> {
        &self.spec
    }

    /// Fetches permissions once and decides.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the authority or a predicate fails.
    pub async fn evaluate<'a, A>(
        &'a self,
        authority: &A,
        ctx: &ResolveContext,
    ) -> Result<Decision<'a, P, T>, GateError>
    where
        A: Authority<P> + ?Sized,
    {
        let granted = authority.get_permissions(ctx).await?;
        self.decide(granted, ctx).await
    }

    /// Decides against already-fetched permissions.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Resolve`] if a predicate fails.
    pub async fn decide<'a>(
        &'a self,
        granted: GrantedPermissions<P>,
        ctx: &ResolveContext,
    ) -> Result<Decision<'a, P, T>, GateError> {
        let matched = match_one(
            self.spec.requirement(),
            self.spec.is_exact(),
            &granted,
            ctx,
        )
        .await?;

        if matched {
            tracing::debug!(
                gate = "with_permission",
                requirement = self.spec.requirement().kind(),
                resource = ctx.resource(),
                "access granted"
            );
            Ok(Decision::Granted {
                index: 0,
                payload: self.spec.payload(),
            })
        } else {
            tracing::info!(
                gate = "with_permission",
                requirement = self.spec.requirement().kind(),
                granted = ?granted,
                resource = ctx.resource(),
                "access denied"
            );
            Ok(Decision::Denied { granted })
        }
    }

    /// Fetches permissions once and reports the requirement's outcome.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the authority or a predicate fails.
    pub async fn explain<'a, A>(
        &'a self,
        authority: &A,
        ctx: &ResolveContext,
    ) -> Result<Explanation<'a, P, T>, GateError>
    where
        A: Authority<P> + ?Sized,
    {
        let granted = authority.get_permissions(ctx).await?;
        let entries = evaluate_mapping(std::slice::from_ref(&self.spec), &granted, ctx).await?;
        Ok(Explanation { granted, entries })
    }
}

/// Ordered multi-branch gate; the first matching branch wins.
///
/// Every branch is evaluated even after one matches, so all predicates
/// observe the call.
#[derive(Debug, Clone)]
pub struct SwitchPermissions<P: Permission, T> {
    branches: Vec<RequirementSpec<P, T>>,
}

impl<P: Permission, T> SwitchPermissions<P, T> {
    /// Creates a gate over `branches`, kept in the given order.
    #[must_use]
    pub fn new(branches: Vec<RequirementSpec<P, T>>) -> Self {
        Self { branches }
    }

    /// The branches, in evaluation order.
    #[must_use]
    pub fn branches(&self) -> &[RequirementSpec<P, T>] {
        &self.branches
    }

    /// Fetches permissions once and selects a branch.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the authority or any predicate fails.
    pub async fn evaluate<'a, A>(
        &'a self,
        authority: &A,
        ctx: &ResolveContext,
    ) -> Result<Decision<'a, P, T>, GateError>
    where
        A: Authority<P> + ?Sized,
    {
        let granted = authority.get_permissions(ctx).await?;
        self.decide(granted, ctx).await
    }

    /// Selects a branch against already-fetched permissions.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Resolve`] if any predicate fails.
    pub async fn decide<'a>(
        &'a self,
        granted: GrantedPermissions<P>,
        ctx: &ResolveContext,
    ) -> Result<Decision<'a, P, T>, GateError> {
        match resolve_mapping(&self.branches, &granted, ctx).await? {
            Some(hit) => {
                tracing::debug!(
                    gate = "switch_permissions",
                    branch = hit.index,
                    branches = self.branches.len(),
                    resource = ctx.resource(),
                    "access granted"
                );
                Ok(Decision::Granted {
                    index: hit.index,
                    payload: hit.payload,
                })
            }
            None => {
                tracing::info!(
                    gate = "switch_permissions",
                    branches = self.branches.len(),
                    granted = ?granted,
                    resource = ctx.resource(),
                    "access denied"
                );
                Ok(Decision::Denied { granted })
            }
        }
    }

    /// Fetches permissions once and reports every branch's outcome.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the authority or any predicate fails.
    pub async fn explain<'a, A>(
        &'a self,
        authority: &A,
        ctx: &ResolveContext,
    ) -> Result<Explanation<'a, P, T>, GateError>
    where
        A: Authority<P> + ?Sized,
    {
        let granted = authority.get_permissions(ctx).await?;
        let entries = evaluate_mapping(&self.branches, &granted, ctx).await?;
        Ok(Explanation { granted, entries })
    }
}

/// Outcome of a [`ResourceGate`].
#[derive(Debug, PartialEq)]
pub enum ResourceDecision<'a, P, T> {
    /// The resource survives; each action carries its own verdict.
    Kept {
        /// The guarded payload.
        payload: &'a T,
        /// One entry per action, in declaration order.
        actions: Vec<ActionDecision<'a>>,
    },
    /// The resource-level requirement failed.
    Denied {
        /// The permissions the authority returned.
        granted: GrantedPermissions<P>,
    },
}

impl<'a, P, T> ResourceDecision<'a, P, T> {
    /// Names of the denied actions, empty when the resource is denied.
    #[must_use]
    pub fn denied_actions(&self) -> Vec<&'a str> {
        match self {
            Self::Kept { actions, .. } => actions
                .iter()
                .filter(|a| !a.allowed)
                .map(|a| a.name)
                .collect(),
            Self::Denied { .. } => Vec::new(),
        }
    }
}

/// Verdict for one action of a kept resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDecision<'a> {
    /// Action name (`list`, `edit`, ...).
    pub name: &'a str,
    /// Whether the action stays available.
    pub allowed: bool,
}

#[derive(Debug, Clone)]
struct ActionGuard<P: Permission> {
    name: String,
    spec: Option<RequirementSpec<P, ()>>,
}

/// Resource with an optional resource-level requirement and per-action
/// requirements.
///
/// Actions without a requirement are always allowed. When nothing is gated
/// the authority is never consulted.
///
/// # Example
///
/// ```
/// use permgate_core::Requirement;
/// use permgate_runtime::{ResourceGate, StaticAuthority};
/// use permgate_types::{PermissionValue, ResolveContext};
///
/// let gate: ResourceGate<String, &str> = ResourceGate::new("posts")
///     .with_open_action("list")
///     .with_action("edit", Requirement::scalar("editor"), false);
/// let authority = StaticAuthority::new(PermissionValue::One("viewer".to_string()));
///
/// let decision = futures::executor::block_on(gate.evaluate(&authority, &ResolveContext::new()))
///     .unwrap();
/// assert_eq!(decision.denied_actions(), vec!["edit"]);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceGate<P: Permission, T> {
    payload: T,
    requirement: Option<RequirementSpec<P, ()>>,
    actions: Vec<ActionGuard<P>>,
}

impl<P: Permission, T> ResourceGate<P, T> {
    /// Creates a gate with no requirements.
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            requirement: None,
            actions: Vec::new(),
        }
    }

    /// Requires `requirement` for the resource as a whole.
    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement<P>, exact: bool) -> Self {
        self.requirement = Some(RequirementSpec::with_exact(requirement, exact, ()));
        self
    }

    /// Adds an action guarded by `requirement`.
    #[must_use]
    pub fn with_action(
        mut self,
        name: impl Into<String>,
        requirement: Requirement<P>,
        exact: bool,
    ) -> Self {
        self.actions.push(ActionGuard {
            name: name.into(),
            spec: Some(RequirementSpec::with_exact(requirement, exact, ())),
        });
        self
    }

    /// Adds an action that is always allowed.
    #[must_use]
    pub fn with_open_action(mut self, name: impl Into<String>) -> Self {
        self.actions.push(ActionGuard {
            name: name.into(),
            spec: None,
        });
        self
    }

    /// The guarded payload.
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The resource-level requirement, if any.
    #[must_use]
    pub fn requirement(&self) -> Option<&RequirementSpec<P, ()>> {
        self.requirement.as_ref()
    }

    /// Action names, in declaration order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.name.as_str())
    }

    /// Returns `true` if any requirement would consult the authority.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        self.requirement.is_some() || self.actions.iter().any(|a| a.spec.is_some())
    }

    /// Fetches permissions once, unless nothing is gated, and decides.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the authority or a predicate fails.
    pub async fn evaluate<'a, A>(
        &'a self,
        authority: &A,
        ctx: &ResolveContext,
    ) -> Result<ResourceDecision<'a, P, T>, GateError>
    where
        A: Authority<P> + ?Sized,
    {
        if !self.is_gated() {
            return Ok(ResourceDecision::Kept {
                payload: &self.payload,
                actions: self
                    .actions
                    .iter()
                    .map(|a| ActionDecision {
                        name: &a.name,
                        allowed: true,
                    })
                    .collect(),
            });
        }

        let granted = authority.get_permissions(ctx).await?;
        self.decide(granted, ctx).await
    }

    /// Decides against already-fetched permissions.
    ///
    /// The resource requirement and every action requirement run
    /// concurrently. A resource-level failure is reported before any
    /// action failure.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Resolve`] if a predicate fails.
    pub async fn decide<'a>(
        &'a self,
        granted: GrantedPermissions<P>,
        ctx: &ResolveContext,
    ) -> Result<ResourceDecision<'a, P, T>, GateError> {
        let resource = check(self.requirement.as_ref(), &granted, ctx);
        let actions = join_all(
            self.actions
                .iter()
                .map(|action| check(action.spec.as_ref(), &granted, ctx)),
        );
        let (resource, actions) = futures::join!(resource, actions);

        let resource = resource?;
        let allowed = actions.into_iter().collect::<Result<Vec<_>, _>>()?;

        if !resource {
            tracing::info!(
                gate = "resource",
                granted = ?granted,
                resource = ctx.resource(),
                "access denied"
            );
            return Ok(ResourceDecision::Denied { granted });
        }

        let actions: Vec<ActionDecision<'a>> = self
            .actions
            .iter()
            .zip(allowed)
            .map(|(action, allowed)| ActionDecision {
                name: &action.name,
                allowed,
            })
            .collect();

        tracing::debug!(
            gate = "resource",
            actions = actions.len(),
            denied = actions.iter().filter(|a| !a.allowed).count(),
            resource = ctx.resource(),
            "access granted"
        );
        Ok(ResourceDecision::Kept {
            payload: &self.payload,
            actions,
        })
    }
}

async fn check<P: Permission>(
    spec: Option<&RequirementSpec<P, ()>>,
    granted: &GrantedPermissions<P>,
    ctx: &ResolveContext,
) -> Result<bool, ResolveError> {
    match spec {
        Some(spec) => match_one(spec.requirement(), spec.is_exact(), granted, ctx).await,
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{FnAuthority, StaticAuthority};
    use permgate_core::PredicateError;
    use permgate_types::{assert_error_code, PermissionValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn one(p: &str) -> PermissionValue<String> {
        PermissionValue::One(p.to_string())
    }

    fn scalar(p: &str) -> Requirement<String> {
        Requirement::scalar(p)
    }

    #[tokio::test]
    async fn with_permission_grants_payload() {
        let gate = WithPermission::new(RequirementSpec::new(scalar("admin"), "panel"));
        let authority = StaticAuthority::new(one("admin"));

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(
            decision,
            Decision::Granted {
                index: 0,
                payload: &"panel"
            }
        );
    }

    #[tokio::test]
    async fn with_permission_denial_keeps_permissions() {
        let gate = WithPermission::new(RequirementSpec::new(scalar("admin"), "panel"));
        let authority = StaticAuthority::new(one("user"));

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert!(!decision.is_granted());
        assert_eq!(decision.payload(), None);
        assert_eq!(decision, Decision::Denied { granted: one("user") });
    }

    #[tokio::test]
    async fn switch_first_matching_branch_wins() {
        let gate = SwitchPermissions::new(vec![
            RequirementSpec::new(scalar("admin"), "full"),
            RequirementSpec::new(Requirement::set(["editor", "admin"]), "edit"),
            RequirementSpec::new(Requirement::set(["viewer"]), "read"),
        ]);
        let authority = StaticAuthority::new(PermissionValue::many([
            "editor".to_string(),
            "viewer".to_string(),
        ]));

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(
            decision,
            Decision::Granted {
                index: 1,
                payload: &"edit"
            }
        );
    }

    #[tokio::test]
    async fn switch_without_match_is_denied() {
        let gate = SwitchPermissions::new(vec![RequirementSpec::new(scalar("admin"), "full")]);
        let authority = StaticAuthority::new(one("guest"));

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(decision, Decision::Denied { granted: one("guest") });
    }

    #[tokio::test]
    async fn authority_is_called_once_per_evaluation() {
        let calls = AtomicUsize::new(0);
        let authority = FnAuthority::new(|_: &ResolveContext| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(one("viewer"))
        });
        let gate = SwitchPermissions::new(vec![
            RequirementSpec::new(scalar("admin"), 1),
            RequirementSpec::new(scalar("editor"), 2),
            RequirementSpec::new(scalar("viewer"), 3),
        ]);

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(decision.payload(), Some(&3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn authority_failure_surfaces() {
        let authority = FnAuthority::new(|_: &ResolveContext| {
            Err::<GrantedPermissions<String>, _>(AuthorityError::Unavailable("down".into()))
        });
        let gate = WithPermission::new(RequirementSpec::new(scalar("admin"), ()));

        let err = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap_err();
        assert_eq!(err, GateError::Authority(AuthorityError::Unavailable("down".into())));
        assert_error_code(&err, "GATE_");
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn predicate_failure_surfaces() {
        let broken = Requirement::try_from_fn("broken", |_| Err(PredicateError::new("boom")));
        let gate = SwitchPermissions::new(vec![
            RequirementSpec::new(scalar("admin"), "a"),
            RequirementSpec::new(broken, "b"),
        ]);
        let authority = StaticAuthority::new(one("admin"));

        let err = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap_err();
        match &err {
            GateError::Resolve(e) => assert_eq!(e.index(), 1),
            other => panic!("expected resolve error, got {other:?}"),
        }
        assert_eq!(err.code(), "GATE_RESOLVE_FAILED");
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn predicate_sees_resource_and_exact() {
        let req = Requirement::<String>::from_fn("products_exact", |input| {
            input.exact && input.resource == Some("products")
        });
        let gate = WithPermission::new(RequirementSpec::exact(req, "ok"));

        let decision = gate
            .decide(one("x"), &ResolveContext::new().with_resource("products"))
            .await
            .unwrap();
        assert!(decision.is_granted());
    }

    #[tokio::test]
    async fn explain_reports_every_branch() {
        let gate = SwitchPermissions::new(vec![
            RequirementSpec::new(scalar("admin"), "a"),
            RequirementSpec::new(scalar("viewer"), "b"),
            RequirementSpec::new(Requirement::set(["viewer", "x"]), "c"),
        ]);
        let authority = StaticAuthority::new(one("viewer"));

        let explanation = gate
            .explain(&authority, &ResolveContext::new())
            .await
            .unwrap();
        let matched: Vec<bool> = explanation.entries.iter().map(|e| e.matched).collect();
        assert_eq!(matched, vec![false, true, true]);
        assert_eq!(explanation.winner(), Some(1));
        assert_eq!(explanation.granted, one("viewer"));
    }

    #[tokio::test]
    async fn with_permission_explain_single_entry() {
        let gate = WithPermission::new(RequirementSpec::new(scalar("admin"), "a"));
        let authority = StaticAuthority::new(one("user"));

        let explanation = gate
            .explain(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(explanation.entries.len(), 1);
        assert_eq!(explanation.winner(), None);
    }

    // ── Resource gate ───────────────────────────────────────

    const ACTIONS: [&str; 5] = ["list", "create", "edit", "show", "remove"];

    fn allowed<'a>(decision: &ResourceDecision<'a, String, &str>) -> Vec<(&'a str, bool)> {
        match decision {
            ResourceDecision::Kept { actions, .. } => {
                actions.iter().map(|a| (a.name, a.allowed)).collect()
            }
            ResourceDecision::Denied { .. } => panic!("expected kept, got {decision:?}"),
        }
    }

    #[tokio::test]
    async fn resource_without_requirements_is_unchanged() {
        let authority = FnAuthority::new(|_: &ResolveContext| {
            Err::<GrantedPermissions<String>, _>(AuthorityError::Unavailable("unused".into()))
        });
        let gate: ResourceGate<String, &str> = ACTIONS
            .iter()
            .fold(ResourceGate::new("aResource"), |gate, action| {
                gate.with_open_action(*action)
            });

        assert!(!gate.is_gated());
        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(
            allowed(&decision),
            ACTIONS.iter().map(|a| (*a, true)).collect::<Vec<_>>()
        );
        assert!(decision.denied_actions().is_empty());
    }

    #[tokio::test]
    async fn denied_actions_are_reported_and_resource_kept() {
        let authority = StaticAuthority::new(PermissionValue::many([
            "list".to_string(),
            "show".to_string(),
        ]));
        let gate = ResourceGate::new("aResource")
            .with_action("list", scalar("list"), false)
            .with_action("create", scalar("foo"), false)
            .with_action("edit", scalar("foo"), false)
            .with_action("show", Requirement::from_fn("show_resolve", |_| false), false)
            .with_action("remove", Requirement::from_fn("remove_resolve", |_| true), false);

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(
            allowed(&decision),
            vec![
                ("list", true),
                ("create", false),
                ("edit", false),
                ("show", false),
                ("remove", true),
            ]
        );
        assert_eq!(decision.denied_actions(), vec!["create", "edit", "show"]);
        match decision {
            ResourceDecision::Kept { payload, .. } => assert_eq!(*payload, "aResource"),
            other => panic!("expected kept, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_resource_requirement_drops_resource() {
        let authority = StaticAuthority::new(one("foo"));
        let gate = ResourceGate::new("aResource")
            .with_requirement(scalar("bar"), false)
            .with_open_action("list");

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(decision, ResourceDecision::Denied { granted: one("foo") });
        assert!(decision.denied_actions().is_empty());
    }

    #[tokio::test]
    async fn resource_gate_asks_authority_once() {
        let calls = AtomicUsize::new(0);
        let authority = FnAuthority::new(|_: &ResolveContext| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(one("editor"))
        });
        let gate = ResourceGate::new("posts")
            .with_requirement(Requirement::set(["editor", "admin"]), false)
            .with_action("edit", scalar("editor"), false)
            .with_action("remove", scalar("admin"), false);

        let decision = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap();
        assert_eq!(decision.denied_actions(), vec!["remove"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_action_predicate_fails_resource() {
        let broken = Requirement::try_from_fn("broken", |_| Err(PredicateError::new("boom")));
        let gate = ResourceGate::new("posts")
            .with_action("list", scalar("viewer"), false)
            .with_action("edit", broken, false);
        let authority = StaticAuthority::new(one("viewer"));

        let err = gate
            .evaluate(&authority, &ResolveContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Resolve(_)));
        assert!(err.to_string().contains("broken"));
    }
}
