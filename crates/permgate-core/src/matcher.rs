//! Requirement Matcher.

use crate::error::ResolveError;
use crate::predicate::PredicateInput;
use crate::requirement::{Permission, Requirement};
use permgate_types::{GrantedPermissions, PermissionValue, ResolveContext};

/// Decides whether one requirement matches the granted permissions.
///
/// Rules, in precedence order (first applicable wins):
///
/// 1. **Predicate**: invoked with the granted permissions, the context's
///    record and resource, and `exact`. Its boolean result is the outcome.
/// 2. **Set vs set**: with `exact`, every required element must be granted
///    (so an empty requirement set matches); without `exact`, at least one
///    must be (so an empty requirement set never matches).
/// 3. **Set vs scalar**: the granted value must be in the required set.
///    `exact` has no effect.
/// 4. **Scalar vs set**: the required value must be in the granted set.
/// 5. **Scalar vs scalar**: plain equality.
///
/// # Errors
///
/// Returns [`ResolveError::Predicate`] (at index 0) when a predicate fails.
///
/// # Example
///
/// ```
/// use permgate_core::{match_one, Requirement};
/// use permgate_types::{PermissionValue, ResolveContext};
///
/// let ctx = ResolveContext::new();
/// let req: Requirement<&str> = Requirement::set(["x", "y"]);
///
/// let held = PermissionValue::many(["x"]);
///
/// let all_of = futures::executor::block_on(match_one(&req, true, &held, &ctx));
/// assert_eq!(all_of, Ok(false));
///
/// let any_of = futures::executor::block_on(match_one(&req, false, &held, &ctx));
/// assert_eq!(any_of, Ok(true));
/// ```
pub async fn match_one<P: Permission>(
    requirement: &Requirement<P>,
    exact: bool,
    granted: &GrantedPermissions<P>,
    ctx: &ResolveContext,
) -> Result<bool, ResolveError> {
    match_at(0, requirement, exact, granted, ctx).await
}

/// Matcher body shared with the resolver, which reports entry positions.
pub(crate) async fn match_at<P: Permission>(
    index: usize,
    requirement: &Requirement<P>,
    exact: bool,
    granted: &GrantedPermissions<P>,
    ctx: &ResolveContext,
) -> Result<bool, ResolveError> {
    let matched = match (requirement, granted) {
        (Requirement::Predicate(predicate), _) => predicate
            .evaluate(PredicateInput::new(granted, ctx, exact))
            .await
            .map_err(|e| ResolveError::predicate(index, predicate.name(), e))?,
        (Requirement::Set(required), PermissionValue::Many(held)) => {
            if exact {
                required.iter().all(|p| held.contains(p))
            } else {
                required.iter().any(|p| held.contains(p))
            }
        }
        (Requirement::Set(required), PermissionValue::One(held)) => required.contains(held),
        (Requirement::Scalar(required), PermissionValue::Many(held)) => held.contains(required),
        (Requirement::Scalar(required), PermissionValue::One(held)) => required == held,
    };

    tracing::trace!(
        index,
        kind = requirement.kind(),
        exact,
        matched,
        "requirement evaluated"
    );

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, PredicateError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn one(p: &'static str) -> GrantedPermissions<&'static str> {
        PermissionValue::one(p)
    }

    fn many(ps: &[&'static str]) -> GrantedPermissions<&'static str> {
        PermissionValue::many(ps.iter().copied())
    }

    async fn check(
        req: &Requirement<&'static str>,
        exact: bool,
        granted: &GrantedPermissions<&'static str>,
    ) -> bool {
        match_one(req, exact, granted, &ResolveContext::new())
            .await
            .unwrap()
    }

    // ── Scalar requirement ──────────────────────────────────

    #[tokio::test]
    async fn scalar_vs_scalar_is_equality() {
        let req = Requirement::scalar("admin");
        assert!(check(&req, false, &one("admin")).await);
        assert!(!check(&req, false, &one("user")).await);
        // exact is ignored
        assert!(check(&req, true, &one("admin")).await);
    }

    #[tokio::test]
    async fn scalar_vs_set_is_membership() {
        let req = Requirement::scalar("admin");
        assert!(check(&req, false, &many(&["user", "admin"])).await);
        assert!(!check(&req, false, &many(&["user"])).await);
        assert!(check(&req, true, &many(&["admin"])).await);
        assert!(!check(&req, false, &many(&[])).await);
    }

    // ── Set requirement ─────────────────────────────────────

    #[tokio::test]
    async fn set_vs_scalar_is_membership() {
        let req = Requirement::set(["x", "y"]);
        assert!(check(&req, false, &one("y")).await);
        assert!(!check(&req, false, &one("z")).await);
        // exact has no effect against a scalar
        assert!(check(&req, true, &one("x")).await);
    }

    #[tokio::test]
    async fn set_vs_set_exact_is_subset() {
        let req = Requirement::set(["x", "y"]);
        assert!(check(&req, true, &many(&["x", "y", "z"])).await);
        assert!(check(&req, true, &many(&["y", "x"])).await);
        assert!(!check(&req, true, &many(&["x"])).await);
        assert!(!check(&req, true, &many(&[])).await);
    }

    #[tokio::test]
    async fn set_vs_set_any_is_intersection() {
        let req = Requirement::set(["x", "y"]);
        assert!(check(&req, false, &many(&["y", "foo"])).await);
        assert!(!check(&req, false, &many(&["foo", "bar"])).await);
        assert!(!check(&req, false, &many(&[])).await);
    }

    #[tokio::test]
    async fn empty_exact_set_matches_vacuously() {
        let req = Requirement::<&str>::Set(Vec::new());
        assert!(check(&req, true, &many(&[])).await);
        assert!(check(&req, true, &many(&["anything"])).await);
    }

    #[tokio::test]
    async fn empty_any_set_never_matches() {
        let req = Requirement::<&str>::Set(Vec::new());
        assert!(!check(&req, false, &many(&[])).await);
        assert!(!check(&req, false, &many(&["anything"])).await);
    }

    #[tokio::test]
    async fn empty_set_vs_scalar_never_matches() {
        let req = Requirement::<&str>::Set(Vec::new());
        assert!(!check(&req, true, &one("admin")).await);
        assert!(!check(&req, false, &one("admin")).await);
    }

    // ── Predicate requirement ───────────────────────────────

    struct Recording {
        calls: Arc<AtomicUsize>,
        seen_exact: Arc<std::sync::Mutex<Option<bool>>>,
    }

    #[async_trait]
    impl Predicate<&'static str> for Recording {
        async fn evaluate(
            &self,
            input: PredicateInput<'_, &'static str>,
        ) -> Result<bool, PredicateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut slot) = self.seen_exact.lock() {
                *slot = Some(input.exact);
            }
            tokio::task::yield_now().await;
            Ok(input.permissions.contains(&"function")
                && input.resource == Some("products")
                && input.record == Some(&json!({"category": "announcements"})))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn predicate_receives_full_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_exact = Arc::new(std::sync::Mutex::new(None));
        let req = Requirement::predicate(Recording {
            calls: Arc::clone(&calls),
            seen_exact: Arc::clone(&seen_exact),
        });
        let ctx = ResolveContext::new()
            .with_resource("products")
            .with_record(json!({"category": "announcements"}));

        let matched = match_one(&req, true, &one("function"), &ctx).await.unwrap();

        assert!(matched);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen_exact.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn predicate_exact_defaults_to_false() {
        let req = Requirement::<&str>::from_fn("exact_flag", |input| input.exact);
        assert!(!check(&req, false, &one("x")).await);
        assert!(check(&req, true, &one("x")).await);
    }

    #[tokio::test]
    async fn predicate_takes_precedence_over_shapes() {
        // A predicate sees set-shaped permissions but decides on its own.
        let req = Requirement::<&str>::from_fn("always", |_| true);
        assert!(check(&req, true, &many(&[])).await);
    }

    #[tokio::test]
    async fn predicate_failure_propagates() {
        let req = Requirement::<&str>::try_from_fn("broken", |_| {
            Err(PredicateError::new("authority offline"))
        });

        let err = match_one(&req, false, &one("x"), &ResolveContext::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::predicate(0, "broken", PredicateError::new("authority offline"))
        );
    }
}
