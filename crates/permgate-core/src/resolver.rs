//! Mapping Resolver.
//!
//! Evaluates every entry of a mapping list concurrently against one
//! granted-permissions value, then selects the first match in list order.
//!
//! Every entry is always evaluated, even when an earlier entry matches.
//! Predicates with observable side effects therefore always run.

use crate::error::ResolveError;
use crate::matcher::match_at;
use crate::requirement::{Permission, RequirementSpec};
use futures::future::join_all;
use permgate_types::{GrantedPermissions, ResolveContext};

/// Outcome of testing one mapping entry.
#[derive(Debug, PartialEq, Eq)]
pub struct MatchResult<'a, T> {
    /// Position of the entry in the mapping list.
    pub index: usize,
    /// Whether the entry matched.
    pub matched: bool,
    /// The entry's payload, untouched.
    pub payload: &'a T,
}

impl<T> Clone for MatchResult<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatchResult<'_, T> {}

/// Runs the matcher on every entry concurrently and returns the raw
/// outcomes in list order.
async fn evaluate_entries<P: Permission, T>(
    mappings: &[RequirementSpec<P, T>],
    granted: &GrantedPermissions<P>,
    ctx: &ResolveContext,
) -> Result<Vec<bool>, ResolveError> {
    let outcomes = join_all(mappings.iter().enumerate().map(|(index, spec)| {
        match_at(index, spec.requirement(), spec.is_exact(), granted, ctx)
    }))
    .await;

    // All-or-nothing: any failure fails the resolution, earliest entry first.
    outcomes.into_iter().collect()
}

/// Returns the first entry (in list order) whose requirement matches.
///
/// All entries are evaluated concurrently and the join is never cut short.
///
/// # Returns
///
/// - `Ok(Some(result))`: the earliest matching entry, `result.matched == true`
/// - `Ok(None)`: no entry matched (not an error)
///
/// # Errors
///
/// If any predicate fails, the whole resolution fails with the failure of
/// the earliest failing entry, even if another entry matched.
///
/// # Example
///
/// ```
/// use permgate_core::{resolve_mapping, Requirement, RequirementSpec};
/// use permgate_types::{PermissionValue, ResolveContext};
///
/// let mappings: Vec<RequirementSpec<&str, &str>> = vec![
///     RequirementSpec::exact(Requirement::set(["x", "y"]), "C"),
/// ];
/// let ctx = ResolveContext::new();
///
/// let hit = futures::executor::block_on(
///     resolve_mapping(&mappings, &PermissionValue::many(["x", "y", "z"]), &ctx),
/// ).unwrap();
/// assert_eq!(hit.map(|m| *m.payload), Some("C"));
///
/// let miss = futures::executor::block_on(
///     resolve_mapping(&mappings, &PermissionValue::many(["x"]), &ctx),
/// ).unwrap();
/// assert!(miss.is_none());
/// ```
pub async fn resolve_mapping<'a, P: Permission, T>(
    mappings: &'a [RequirementSpec<P, T>],
    granted: &GrantedPermissions<P>,
    ctx: &ResolveContext,
) -> Result<Option<MatchResult<'a, T>>, ResolveError> {
    let outcomes = evaluate_entries(mappings, granted, ctx).await?;

    let winner = outcomes
        .iter()
        .position(|matched| *matched)
        .map(|index| MatchResult {
            index,
            matched: true,
            payload: mappings[index].payload(),
        });

    match &winner {
        Some(result) => tracing::debug!(
            entries = mappings.len(),
            index = result.index,
            resource = ctx.resource(),
            "mapping resolved"
        ),
        None => tracing::debug!(
            entries = mappings.len(),
            resource = ctx.resource(),
            "no mapping matched"
        ),
    }

    Ok(winner)
}

/// Returns every entry's outcome, in list order.
///
/// Same evaluation and failure semantics as [`resolve_mapping`]; useful
/// for explaining why a particular entry won.
///
/// # Errors
///
/// Fails as a whole if any predicate fails.
pub async fn evaluate_mapping<'a, P: Permission, T>(
    mappings: &'a [RequirementSpec<P, T>],
    granted: &GrantedPermissions<P>,
    ctx: &ResolveContext,
) -> Result<Vec<MatchResult<'a, T>>, ResolveError> {
    let outcomes = evaluate_entries(mappings, granted, ctx).await?;

    Ok(mappings
        .iter()
        .zip(outcomes)
        .enumerate()
        .map(|(index, (spec, matched))| MatchResult {
            index,
            matched,
            payload: spec.payload(),
        })
        .collect())
}
