//! Declarative declarations.
//!
//! # Example TOML
//!
//! ```toml
//! [[declarations]]
//! kind = "resource"
//! name = "posts"
//!
//! [[declarations]]
//! kind = "resource"
//! name = "articles"
//! value = ["editor", "viewer"]
//!
//! [declarations.actions.list]
//!
//! [declarations.actions.edit]
//! value = "editor"
//!
//! [declarations.actions.remove]
//! predicate = "resource_owner"
//!
//! [[declarations]]
//! kind = "with_permission"
//! name = "admin-area"
//! value = "admin"
//! resources = ["users", "settings"]
//!
//! [[declarations]]
//! kind = "switch_permissions"
//! name = "products"
//!
//! [[declarations.branches]]
//! value = ["manager", "admin"]
//! exact = true
//! resources = ["products_full"]
//!
//! [[declarations.branches]]
//! predicate = "always"
//! resources = ["products_readonly"]
//! ```
//!
//! A requirement is either a `value` (string or array of strings) or the
//! name of a registered `predicate`, never both. On a `resource` both are
//! optional: without them the resource, or the action, is always allowed.

use crate::filter::Declaration;
use crate::gate::{ResourceGate, SwitchPermissions, WithPermission};
use crate::registry::PredicateRegistry;
use permgate_core::{Requirement, RequirementSpec};
use permgate_types::ErrorCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One declaration as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclarationDef {
    /// A resource. Lists its own name when `resources` is empty.
    ///
    /// An optional `value` / `predicate` guards the whole resource; each
    /// entry of `actions` may guard one action.
    Resource {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        resources: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<toml::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        predicate: Option<String>,
        #[serde(default)]
        exact: bool,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        actions: BTreeMap<String, ActionDef>,
    },

    /// Resources guarded by a single requirement.
    WithPermission {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<toml::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        predicate: Option<String>,
        #[serde(default)]
        exact: bool,
        #[serde(default)]
        resources: Vec<String>,
    },

    /// Ordered branches; the first match contributes its resources.
    SwitchPermissions {
        name: String,
        #[serde(default)]
        branches: Vec<BranchDef>,
    },
}

/// One branch of a `switch_permissions` declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BranchDef {
    /// Required permission(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<toml::Value>,

    /// Name of a registered predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,

    /// All-of instead of any-of for set values.
    #[serde(default)]
    pub exact: bool,

    /// Resources kept when this branch wins.
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Requirement for one action of a `resource` declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionDef {
    /// Required permission(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<toml::Value>,

    /// Name of a registered predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,

    /// All-of instead of any-of for set values.
    #[serde(default)]
    pub exact: bool,
}

/// Errors from validating a [`DeclarationDef`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// The declaration has no name.
    #[error("{kind} declaration has an empty name")]
    EmptyName { kind: String },

    /// Neither `value` nor `predicate` is specified.
    #[error("declaration '{label}': neither 'value' nor 'predicate' specified")]
    MissingRequirement { label: String },

    /// Both `value` and `predicate` are specified.
    #[error("declaration '{label}': both 'value' and 'predicate' specified (use one)")]
    BothRequirements { label: String },

    /// `value` is neither a string nor an array of strings.
    #[error("declaration '{label}': value must be a string or an array of strings, found {found}")]
    MalformedRequirement { label: String, found: String },

    /// `predicate` names nothing in the registry.
    #[error("declaration '{label}': unknown predicate '{predicate}'")]
    UnknownPredicate { label: String, predicate: String },

    /// A switch without branches.
    #[error("declaration '{label}': switch_permissions needs at least one branch")]
    EmptySwitch { label: String },

    /// An action with an empty name.
    #[error("declaration '{label}': action has an empty name")]
    EmptyAction { label: String },
}

impl ErrorCode for DeclarationError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyName { .. } => "DECL_EMPTY_NAME",
            Self::MissingRequirement { .. } => "DECL_MISSING_REQUIREMENT",
            Self::BothRequirements { .. } => "DECL_BOTH_REQUIREMENTS",
            Self::MalformedRequirement { .. } => "DECL_MALFORMED_REQUIREMENT",
            Self::UnknownPredicate { .. } => "DECL_UNKNOWN_PREDICATE",
            Self::EmptySwitch { .. } => "DECL_EMPTY_SWITCH",
            Self::EmptyAction { .. } => "DECL_EMPTY_ACTION",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

impl DeclarationDef {
    /// The declaration's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Resource { name, .. }
            | Self::WithPermission { name, .. }
            | Self::SwitchPermissions { name, .. } => name,
        }
    }

    /// The `kind` tag as written in configuration.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resource { .. } => "resource",
            Self::WithPermission { .. } => "with_permission",
            Self::SwitchPermissions { .. } => "switch_permissions",
        }
    }

    /// Validates this declaration against `registry`.
    ///
    /// Checks:
    /// - the name is not empty
    /// - each requirement has exactly one of `value` or `predicate`
    ///   (a resource and its actions may have neither)
    /// - action names are not empty
    /// - each `value` is a string or an array of strings
    /// - each `predicate` is registered
    /// - a switch has at least one branch
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self, registry: &PredicateRegistry<String>) -> Result<(), DeclarationError> {
        self.build(registry).map(|_| ())
    }

    /// Builds the runtime declaration.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError`] if the declaration is invalid.
    pub fn build(
        &self,
        registry: &PredicateRegistry<String>,
    ) -> Result<Declaration<String, String>, DeclarationError> {
        let name = self.name();
        if name.trim().is_empty() {
            return Err(DeclarationError::EmptyName {
                kind: self.kind().to_string(),
            });
        }

        match self {
            Self::Resource {
                resources,
                value,
                predicate,
                exact,
                actions,
                ..
            } => {
                let items = if resources.is_empty() {
                    vec![name.to_string()]
                } else {
                    resources.clone()
                };
                let requirement =
                    optional_requirement(name, value.as_ref(), predicate.as_deref(), registry)?;
                if requirement.is_none() && actions.is_empty() {
                    return Ok(Declaration::plain(name, items));
                }

                let mut gate = ResourceGate::new(items);
                if let Some(requirement) = requirement {
                    gate = gate.with_requirement(requirement, *exact);
                }
                for (action, def) in actions {
                    if action.trim().is_empty() {
                        return Err(DeclarationError::EmptyAction {
                            label: name.to_string(),
                        });
                    }
                    let label = format!("{name}.{action}");
                    gate = match optional_requirement(
                        &label,
                        def.value.as_ref(),
                        def.predicate.as_deref(),
                        registry,
                    )? {
                        Some(requirement) => gate.with_action(action, requirement, def.exact),
                        None => gate.with_open_action(action),
                    };
                }
                Ok(Declaration::resource(name, gate))
            }
            Self::WithPermission {
                value,
                predicate,
                exact,
                resources,
                ..
            } => {
                let requirement =
                    build_requirement(name, value.as_ref(), predicate.as_deref(), registry)?;
                let spec = RequirementSpec::with_exact(requirement, *exact, resources.clone());
                Ok(Declaration::with_permission(name, WithPermission::new(spec)))
            }
            Self::SwitchPermissions { branches, .. } => {
                if branches.is_empty() {
                    return Err(DeclarationError::EmptySwitch {
                        label: name.to_string(),
                    });
                }

                let specs = branches
                    .iter()
                    .enumerate()
                    .map(|(i, branch)| {
                        let label = format!("{name}[branch {i}]");
                        let requirement = build_requirement(
                            &label,
                            branch.value.as_ref(),
                            branch.predicate.as_deref(),
                            registry,
                        )?;
                        Ok(RequirementSpec::with_exact(
                            requirement,
                            branch.exact,
                            branch.resources.clone(),
                        ))
                    })
                    .collect::<Result<Vec<_>, DeclarationError>>()?;

                Ok(Declaration::switch_permissions(
                    name,
                    SwitchPermissions::new(specs),
                ))
            }
        }
    }
}

fn build_requirement(
    label: &str,
    value: Option<&toml::Value>,
    predicate: Option<&str>,
    registry: &PredicateRegistry<String>,
) -> Result<Requirement<String>, DeclarationError> {
    match (value, predicate) {
        (None, None) => Err(DeclarationError::MissingRequirement {
            label: label.to_string(),
        }),
        (Some(_), Some(_)) => Err(DeclarationError::BothRequirements {
            label: label.to_string(),
        }),
        (Some(value), None) => requirement_from_value(label, value),
        (None, Some(predicate)) => registry
            .get(predicate)
            .map(Requirement::Predicate)
            .ok_or_else(|| DeclarationError::UnknownPredicate {
                label: label.to_string(),
                predicate: predicate.to_string(),
            }),
    }
}

fn optional_requirement(
    label: &str,
    value: Option<&toml::Value>,
    predicate: Option<&str>,
    registry: &PredicateRegistry<String>,
) -> Result<Option<Requirement<String>>, DeclarationError> {
    if value.is_none() && predicate.is_none() {
        return Ok(None);
    }
    build_requirement(label, value, predicate, registry).map(Some)
}

fn requirement_from_value(
    label: &str,
    value: &toml::Value,
) -> Result<Requirement<String>, DeclarationError> {
    let malformed = |found: String| DeclarationError::MalformedRequirement {
        label: label.to_string(),
        found,
    };

    match value {
        toml::Value::String(s) => Ok(Requirement::Scalar(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                toml::Value::String(s) => Ok(s.clone()),
                other => Err(malformed(format!("array containing {}", other.type_str()))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Requirement::Set),
        other => Err(malformed(other.type_str().to_string())),
    }
}
