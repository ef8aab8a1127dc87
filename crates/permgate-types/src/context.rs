//! Resolution context.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable context shared by every matcher invocation of one resolution.
///
/// Carries the optional `record` being acted on and the optional `resource`
/// identifier. The engine never inspects either; they are forwarded to
/// predicate requirements and to the authority.
///
/// # Example
///
/// ```
/// use permgate_types::ResolveContext;
/// use serde_json::json;
///
/// let ctx = ResolveContext::new()
///     .with_resource("products")
///     .with_record(json!({"category": "announcements"}));
///
/// assert_eq!(ctx.resource(), Some("products"));
/// assert_eq!(ctx.record().and_then(|r| r.get("category")), Some(&json!("announcements")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    record: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
}

impl ResolveContext {
    /// Creates an empty context (no record, no resource).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the record.
    #[must_use]
    pub fn with_record(mut self, record: Value) -> Self {
        self.record = Some(record);
        self
    }

    /// Sets the resource identifier.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// The record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&Value> {
        self.record.as_ref()
    }

    /// The resource identifier, if any.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }
}
