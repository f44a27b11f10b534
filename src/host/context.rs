//! host::context
//!
//! The configuration a host pushes on every render.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::SelectionValue;
use crate::selector::kind::ScopeParams;
use crate::selector::{ActivityFilter, Scope, SelectorKind};

/// Bound outputs by parameter name.
pub type Outputs = BTreeMap<String, String>;

/// Raw host configuration: named string parameters plus the disabled flag.
///
/// Absent parameters read as the empty string, the same as a host that
/// leaves a field blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostContext {
    /// Raw parameter values by name
    pub parameters: BTreeMap<String, String>,
    /// Whether the host has disabled the control
    pub disabled: bool,
}

impl HostContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, builder style.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_parameter(name, value);
        self
    }

    /// Set the disabled flag, builder style.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set a parameter.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// Read a parameter; absent reads as empty.
    pub fn raw(&self, name: &str) -> &str {
        self.parameters.get(name).map(String::as_str).unwrap_or("")
    }

    /// Derive the scope for a variant from the parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use metaselect::host::HostContext;
    /// use metaselect::selector::{Scope, SelectorKind};
    ///
    /// let ctx = HostContext::new().with_parameter("Entity", " account ");
    /// assert_eq!(ctx.scope_for(SelectorKind::Form), Scope::entity("account"));
    /// ```
    pub fn scope_for(&self, kind: SelectorKind) -> Scope {
        match kind.binding().scope {
            ScopeParams::Entity(entity) => Scope::entity(self.raw(entity).trim()),
            ScopeParams::Related {
                form_entity,
                query_entity,
            } => Scope::related(self.raw(form_entity).trim(), self.raw(query_entity).trim()),
            ScopeParams::Catalog {
                activities_only,
                supports_activities,
            } => Scope::catalog(
                ActivityFilter::parse(self.raw(activities_only)),
                ActivityFilter::parse(self.raw(supports_activities)),
            ),
            ScopeParams::None => Scope::Global,
        }
    }

    /// Parse the bound value for a variant.
    pub fn selection_for(&self, kind: SelectorKind) -> SelectionValue {
        SelectionValue::parse(kind.cardinality(), self.raw(kind.binding().value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_parameter_is_empty() {
        assert_eq!(HostContext::new().raw("Entity"), "");
    }

    #[test]
    fn entity_scope_from_named_parameter() {
        let ctx = HostContext::new()
            .with_parameter("entityName", "account")
            .with_parameter("Entity", "contact");
        assert_eq!(ctx.scope_for(SelectorKind::Attribute), Scope::entity("account"));
        assert_eq!(ctx.scope_for(SelectorKind::View), Scope::entity("contact"));
    }

    #[test]
    fn related_scope() {
        let ctx = HostContext::new()
            .with_parameter("FormEntity", "contact")
            .with_parameter("QueryEntity", "account");
        assert_eq!(
            ctx.scope_for(SelectorKind::RelatedAttribute),
            Scope::related("contact", "account")
        );
    }

    #[test]
    fn catalog_scope_flags() {
        let ctx = HostContext::new().with_parameter("activitiesOnly", "Yes");
        assert_eq!(
            ctx.scope_for(SelectorKind::Entity),
            Scope::catalog(ActivityFilter::Only, ActivityFilter::All)
        );
    }

    #[test]
    fn app_scope_global() {
        assert_eq!(HostContext::new().scope_for(SelectorKind::ModelDrivenApp), Scope::Global);
    }

    #[test]
    fn collection_selection_parsed() {
        let ctx = HostContext::new().with_parameter("EntityNames", "account;;contact");
        assert_eq!(
            ctx.selection_for(SelectorKind::EntityCollection),
            SelectionValue::Collection(vec!["account".into(), "contact".into()])
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let ctx: HostContext = serde_json::from_str(r#"{ "parameters": { "Entity": "account" } }"#).unwrap();
        assert_eq!(ctx.raw("Entity"), "account");
        assert!(!ctx.disabled);
    }
}
