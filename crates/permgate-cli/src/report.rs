//! Output rendering for resolved declarations.

use futures::future::join_all;
use permgate_runtime::{
    ActionDecision, Authority, Declaration, DeclarationKind, GateError, ResourceDecision, Verdict,
};
use permgate_types::ResolveContext;
use serde_json::json;

/// Per-declaration explanation.
#[derive(Debug)]
pub struct DeclarationReport {
    name: String,
    kind: &'static str,
    /// Winning branch; `Some(0)` for a kept resource.
    selected: Option<usize>,
    branches: Vec<BranchReport>,
    /// Action verdicts of a kept resource.
    actions: Vec<ActionReport>,
}

#[derive(Debug)]
struct BranchReport {
    index: usize,
    matched: bool,
    resources: Vec<String>,
}

#[derive(Debug)]
struct ActionReport {
    name: String,
    allowed: bool,
}

/// Explains every declaration, in order.
///
/// Gated declarations ask `authority` once each and run concurrently, as
/// they do when filtering.
pub async fn explain<A>(
    declarations: &[Declaration<String, String>],
    authority: &A,
    ctx: &ResolveContext,
) -> Result<Vec<DeclarationReport>, GateError>
where
    A: Authority<String> + ?Sized,
{
    join_all(
        declarations
            .iter()
            .map(|declaration| explain_one(declaration, authority, ctx)),
    )
    .await
    .into_iter()
    .collect()
}

async fn explain_one<A>(
    declaration: &Declaration<String, String>,
    authority: &A,
    ctx: &ResolveContext,
) -> Result<DeclarationReport, GateError>
where
    A: Authority<String> + ?Sized,
{
    let name = declaration.name.as_str();
    let (kind, explanation) = match &declaration.kind {
        DeclarationKind::Plain(items) => {
            return Ok(resource_report(name, Some(0), items, Vec::new()));
        }
        DeclarationKind::Resource(gate) => {
            let report = match gate.evaluate(authority, ctx).await? {
                ResourceDecision::Kept { payload, actions } => {
                    let actions = actions
                        .iter()
                        .map(|a| ActionReport {
                            name: a.name.to_string(),
                            allowed: a.allowed,
                        })
                        .collect();
                    resource_report(name, Some(0), payload, actions)
                }
                ResourceDecision::Denied { .. } => {
                    resource_report(name, None, gate.payload(), Vec::new())
                }
            };
            return Ok(report);
        }
        DeclarationKind::WithPermission(gate) => {
            ("with_permission", gate.explain(authority, ctx).await?)
        }
        DeclarationKind::SwitchPermissions(gate) => {
            ("switch_permissions", gate.explain(authority, ctx).await?)
        }
    };

    Ok(DeclarationReport {
        name: name.to_string(),
        kind,
        selected: explanation.winner(),
        branches: explanation
            .entries
            .iter()
            .map(|entry| BranchReport {
                index: entry.index,
                matched: entry.matched,
                resources: entry.payload.clone(),
            })
            .collect(),
        actions: Vec::new(),
    })
}

fn resource_report(
    name: &str,
    selected: Option<usize>,
    items: &[String],
    actions: Vec<ActionReport>,
) -> DeclarationReport {
    DeclarationReport {
        name: name.to_string(),
        kind: "resource",
        selected,
        branches: vec![BranchReport {
            index: 0,
            matched: selected.is_some(),
            resources: items.to_vec(),
        }],
        actions,
    }
}

/// Prints surviving resources, one per line or as a JSON array.
///
/// A resource with actions lists them after its name; in JSON it becomes
/// an object with `allowed` and `denied` arrays.
pub fn print_verdicts(
    verdicts: &[Verdict<'_, String, String>],
    as_json: bool,
) -> serde_json::Result<()> {
    if as_json {
        let mut value = Vec::new();
        for verdict in verdicts {
            let (allowed, denied) = split_actions(verdict);
            for item in verdict.items() {
                if verdict.actions().is_empty() {
                    value.push(json!(item));
                } else {
                    value.push(json!({
                        "resource": item,
                        "allowed": allowed,
                        "denied": denied,
                    }));
                }
            }
        }
        println!("{}", serde_json::to_string(&value)?);
        return Ok(());
    }

    for verdict in verdicts {
        let (allowed, denied) = split_actions(verdict);
        let mut suffix = String::new();
        if !allowed.is_empty() {
            suffix.push_str(&format!("  allowed: {}", allowed.join(", ")));
        }
        if !denied.is_empty() {
            suffix.push_str(&format!("  denied: {}", denied.join(", ")));
        }
        for item in verdict.items() {
            println!("{item}{suffix}");
        }
    }
    Ok(())
}

fn split_actions<'a>(verdict: &Verdict<'a, String, String>) -> (Vec<&'a str>, Vec<&'a str>) {
    let (allowed, denied): (Vec<&ActionDecision<'a>>, Vec<&ActionDecision<'a>>) = verdict.actions().iter().partition(|a| a.allowed);
    (
        allowed.into_iter().map(|a| a.name).collect(),
        denied.into_iter().map(|a| a.name).collect(),
    )
}

/// Prints explanations as text or as a JSON array.
pub fn print_explanations(reports: &[DeclarationReport], as_json: bool) -> serde_json::Result<()> {
    if as_json {
        let value: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| {
                let branches: Vec<serde_json::Value> = r
                    .branches
                    .iter()
                    .map(|b| {
                        json!({
                            "index": b.index,
                            "matched": b.matched,
                            "resources": b.resources,
                        })
                    })
                    .collect();
                let actions: Vec<serde_json::Value> = r
                    .actions
                    .iter()
                    .map(|a| json!({ "name": a.name, "allowed": a.allowed }))
                    .collect();
                json!({
                    "name": r.name,
                    "kind": r.kind,
                    "selected": r.selected,
                    "branches": branches,
                    "actions": actions,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for report in reports {
        let status = match (report.kind, report.selected) {
            ("resource", Some(_)) => "kept".to_string(),
            (_, Some(index)) => format!("granted (branch {index})"),
            (_, None) => "denied".to_string(),
        };
        println!("{} ({}): {status}", report.name, report.kind);

        if report.kind == "resource" {
            for action in &report.actions {
                let mark = if action.allowed { "allowed" } else { "denied" };
                println!("  {:<8} {mark}", action.name);
            }
            continue;
        }
        for branch in &report.branches {
            let mark = if branch.matched { "match" } else { "no match" };
            let selected = if report.selected == Some(branch.index) {
                "  <- selected"
            } else {
                ""
            };
            println!(
                "  [{}] {mark:<8} {}{selected}",
                branch.index,
                branch.resources.join(", ")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use permgate_runtime::config::GateConfig;
    use permgate_runtime::{AuthorityError, PredicateRegistry};
    use permgate_types::{GrantedPermissions, PermissionValue};
    use std::time::Duration;
    use tokio::sync::Barrier;

    const CONFIG: &str = r#"
[[declarations]]
kind = "resource"
name = "dashboard"

[[declarations]]
kind = "with_permission"
name = "admin-area"
value = "admin"
resources = ["users"]

[[declarations]]
kind = "switch_permissions"
name = "products"

[[declarations.branches]]
value = "admin"
resources = ["products_full"]

[[declarations.branches]]
value = "viewer"
resources = ["products_readonly"]

[[declarations]]
kind = "resource"
name = "articles"
value = "viewer"

[declarations.actions.list]

[declarations.actions.edit]
value = "editor"
"#;

    /// Hands out `viewer` only once every caller is waiting.
    struct Rendezvous {
        barrier: Barrier,
    }

    #[async_trait]
    impl Authority<String> for Rendezvous {
        async fn get_permissions(
            &self,
            _ctx: &ResolveContext,
        ) -> Result<GrantedPermissions<String>, AuthorityError> {
            self.barrier.wait().await;
            Ok(PermissionValue::One("viewer".to_string()))
        }
    }

    fn declarations() -> Vec<Declaration<String, String>> {
        GateConfig::from_toml(CONFIG)
            .unwrap()
            .build_declarations(&PredicateRegistry::with_builtins())
            .unwrap()
    }

    #[tokio::test]
    async fn explain_runs_gates_concurrently() {
        let declarations = declarations();
        let gated = declarations.iter().filter(|d| d.is_gated()).count();
        assert_eq!(gated, 3);
        let authority = Rendezvous {
            barrier: Barrier::new(gated),
        };

        let reports = tokio::time::timeout(
            Duration::from_secs(5),
            explain(&declarations, &authority, &ResolveContext::new()),
        )
        .await
        .expect("gates were explained one at a time")
        .unwrap();

        let summary: Vec<(&str, Option<usize>)> = reports
            .iter()
            .map(|r| (r.name.as_str(), r.selected))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("dashboard", Some(0)),
                ("admin-area", None),
                ("products", Some(1)),
                ("articles", Some(0)),
            ]
        );
    }

    #[tokio::test]
    async fn explain_reports_resource_actions() {
        let declarations = declarations();
        let authority = Rendezvous {
            barrier: Barrier::new(1),
        };

        let reports = explain(&declarations[3..], &authority, &ResolveContext::new())
            .await
            .unwrap();
        let actions: Vec<(&str, bool)> = reports[0]
            .actions
            .iter()
            .map(|a| (a.name.as_str(), a.allowed))
            .collect();
        assert_eq!(actions, vec![("edit", false), ("list", true)]);
    }
}
