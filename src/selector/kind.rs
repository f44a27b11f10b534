//! selector::kind
//!
//! The selector variants and the table that drives them.
//!
//! # Design
//!
//! Every variant is the same control parameterized by a row of [`PROFILES`]:
//! which resource it queries, how records map to items, whether it binds a
//! single value or a collection, which host parameters it reads and writes,
//! and the placeholder text it shows. Adding a variant means adding a row.

use std::str::FromStr;

use thiserror::Error;

use super::scope::Scope;
use crate::core::types::Cardinality;
use crate::service::{odata_string, MetadataQuery};

/// A metadata selector variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectorKind {
    /// One attribute of an entity
    Attribute,
    /// Several attributes of an entity
    AttributeCollection,
    /// One choice (picklist, status, or state) attribute
    ChoiceAttribute,
    /// One lookup attribute
    LookupAttribute,
    /// One lookup attribute targeting a given entity
    RelatedAttribute,
    /// One entity
    Entity,
    /// Several entities
    EntityCollection,
    /// One system form of an entity
    Form,
    /// One saved view of an entity
    View,
    /// One model-driven application
    ModelDrivenApp,
}

/// Error for an unrecognized selector name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown selector kind '{0}' (run `metaselect kinds` for the list)")]
pub struct UnknownKind(pub String);

/// Which resource a variant reads, and how it narrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `EntityDefinitions(LogicalName='e')/Attributes`
    Attributes(AttributeFilter),
    /// Lookup attributes of one entity, filtered by target client-side
    RelatedLookups,
    /// `EntityDefinitions`
    Entities,
    /// `systemforms`
    Forms,
    /// `savedqueries`
    Views,
    /// `appmodules`
    Apps,
}

/// Server-side attribute type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFilter {
    /// Every attribute
    All,
    /// Picklist, Status and State attributes
    Choice,
    /// Lookup attributes
    Lookup,
}

/// Where a record's display label lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    /// `DisplayName.UserLocalizedLabel.Label`
    Localized,
    /// A plain top-level string field
    Plain(&'static str),
}

impl LabelField {
    /// Read the label from a raw record.
    pub fn read<'a>(&self, record: &'a serde_json::Value) -> Option<&'a str> {
        match self {
            LabelField::Localized => record
                .pointer("/DisplayName/UserLocalizedLabel/Label")
                .and_then(serde_json::Value::as_str),
            LabelField::Plain(field) => record.get(*field).and_then(serde_json::Value::as_str),
        }
    }
}

/// How raw records map to items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    /// Field holding the identifier
    pub identifier: &'static str,
    /// Field holding the label
    pub label: LabelField,
}

/// Host parameters that make up a variant's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeParams {
    /// One entity name parameter
    Entity(&'static str),
    /// Form entity and query entity parameters
    Related {
        /// Parameter naming the entity whose lookups are listed
        form_entity: &'static str,
        /// Parameter naming the entity the lookups must target
        query_entity: &'static str,
    },
    /// Activity flag parameters
    Catalog {
        /// Parameter holding the activities-only flag
        activities_only: &'static str,
        /// Parameter holding the supports-activities flag
        supports_activities: &'static str,
    },
    /// No scope parameters
    None,
}

impl ScopeParams {
    /// Names of every input parameter, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        match *self {
            ScopeParams::Entity(entity) => vec![entity],
            ScopeParams::Related {
                form_entity,
                query_entity,
            } => vec![form_entity, query_entity],
            ScopeParams::Catalog {
                activities_only,
                supports_activities,
            } => vec![activities_only, supports_activities],
            ScopeParams::None => Vec::new(),
        }
    }
}

/// How a variant binds to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostBinding {
    /// Bound value parameter (read and written)
    pub value: &'static str,
    /// Output receiving the selected label, for variants that report one
    pub label_output: Option<&'static str>,
    /// Scope input parameters
    pub scope: ScopeParams,
}

/// One row of the variant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    /// The variant
    pub kind: SelectorKind,
    /// Command-line name
    pub name: &'static str,
    /// Single or collection binding
    pub cardinality: Cardinality,
    /// Placeholder shown while a resolve is in flight
    pub loading_label: &'static str,
    /// Placeholder shown otherwise
    pub placeholder: &'static str,
    /// Resource read
    pub source: Source,
    /// Record mapping
    pub shape: RecordShape,
    /// Host parameters
    pub binding: HostBinding,
}

const LOGICAL_NAME: RecordShape = RecordShape {
    identifier: "LogicalName",
    label: LabelField::Localized,
};

const fn entity_scoped(value: &'static str, entity: &'static str) -> HostBinding {
    HostBinding {
        value,
        label_output: None,
        scope: ScopeParams::Entity(entity),
    }
}

const CATALOG: ScopeParams = ScopeParams::Catalog {
    activities_only: "activitiesOnly",
    supports_activities: "supportsActivities",
};

/// The variant table.
pub static PROFILES: [KindProfile; 10] = [
    KindProfile {
        kind: SelectorKind::Attribute,
        name: "attribute",
        cardinality: Cardinality::Single,
        loading_label: "Loading attributes...",
        placeholder: "Select attribute",
        source: Source::Attributes(AttributeFilter::All),
        shape: LOGICAL_NAME,
        binding: entity_scoped("attributeName", "entityName"),
    },
    KindProfile {
        kind: SelectorKind::AttributeCollection,
        name: "attribute-collection",
        cardinality: Cardinality::Collection,
        loading_label: "Loading attributes...",
        placeholder: "Select attributes",
        source: Source::Attributes(AttributeFilter::All),
        shape: LOGICAL_NAME,
        binding: entity_scoped("Attribute", "EntityName"),
    },
    KindProfile {
        kind: SelectorKind::ChoiceAttribute,
        name: "choice-attribute",
        cardinality: Cardinality::Single,
        loading_label: "Loading choices...",
        placeholder: "Select choice",
        source: Source::Attributes(AttributeFilter::Choice),
        shape: LOGICAL_NAME,
        binding: entity_scoped("Attribute", "Entity"),
    },
    KindProfile {
        kind: SelectorKind::LookupAttribute,
        name: "lookup-attribute",
        cardinality: Cardinality::Single,
        loading_label: "Loading lookups...",
        placeholder: "Select lookup",
        source: Source::Attributes(AttributeFilter::Lookup),
        shape: LOGICAL_NAME,
        binding: entity_scoped("Attribute", "Entity"),
    },
    KindProfile {
        kind: SelectorKind::RelatedAttribute,
        name: "related-attribute",
        cardinality: Cardinality::Single,
        loading_label: "Loading related lookups...",
        placeholder: "Select related lookup",
        source: Source::RelatedLookups,
        shape: LOGICAL_NAME,
        binding: HostBinding {
            value: "Attribute",
            label_output: None,
            scope: ScopeParams::Related {
                form_entity: "FormEntity",
                query_entity: "QueryEntity",
            },
        },
    },
    KindProfile {
        kind: SelectorKind::Entity,
        name: "entity",
        cardinality: Cardinality::Single,
        loading_label: "Loading entities...",
        placeholder: "Select entity",
        source: Source::Entities,
        shape: LOGICAL_NAME,
        binding: HostBinding {
            value: "logicalName",
            label_output: Some("displayName"),
            scope: CATALOG,
        },
    },
    KindProfile {
        kind: SelectorKind::EntityCollection,
        name: "entity-collection",
        cardinality: Cardinality::Collection,
        loading_label: "Loading entities...",
        placeholder: "Select entities",
        source: Source::Entities,
        shape: LOGICAL_NAME,
        binding: HostBinding {
            value: "EntityNames",
            label_output: None,
            scope: CATALOG,
        },
    },
    KindProfile {
        kind: SelectorKind::Form,
        name: "form",
        cardinality: Cardinality::Single,
        loading_label: "Loading forms...",
        placeholder: "Select form",
        source: Source::Forms,
        shape: RecordShape {
            identifier: "formid",
            label: LabelField::Plain("name"),
        },
        binding: entity_scoped("Form", "Entity"),
    },
    KindProfile {
        kind: SelectorKind::View,
        name: "view",
        cardinality: Cardinality::Single,
        loading_label: "Loading views...",
        placeholder: "Select view",
        source: Source::Views,
        shape: RecordShape {
            identifier: "savedqueryid",
            label: LabelField::Plain("name"),
        },
        binding: entity_scoped("View", "Entity"),
    },
    KindProfile {
        kind: SelectorKind::ModelDrivenApp,
        name: "model-driven-app",
        cardinality: Cardinality::Single,
        loading_label: "Loading model driven apps...",
        placeholder: "Select model driven app",
        source: Source::Apps,
        shape: RecordShape {
            identifier: "appmoduleid",
            label: LabelField::Plain("name"),
        },
        binding: HostBinding {
            value: "appId",
            label_output: Some("appName"),
            scope: ScopeParams::None,
        },
    },
];

impl SelectorKind {
    /// Every variant, in table order.
    pub fn all() -> impl Iterator<Item = SelectorKind> {
        PROFILES.iter().map(|profile| profile.kind)
    }

    /// The table row for this variant.
    pub fn profile(self) -> &'static KindProfile {
        // Rows are declared in variant order.
        &PROFILES[self as usize]
    }

    /// Command-line name.
    pub fn name(self) -> &'static str {
        self.profile().name
    }

    /// Single or collection binding.
    pub fn cardinality(self) -> Cardinality {
        self.profile().cardinality
    }

    /// Placeholder while loading.
    pub fn loading_label(self) -> &'static str {
        self.profile().loading_label
    }

    /// Placeholder when idle.
    pub fn placeholder(self) -> &'static str {
        self.profile().placeholder
    }

    /// Record mapping.
    pub fn shape(self) -> RecordShape {
        self.profile().shape
    }

    /// Host parameters.
    pub fn binding(self) -> HostBinding {
        self.profile().binding
    }

    /// Build the service query for a scope.
    ///
    /// Returns `None` when the scope is unconfigured or does not belong to
    /// this variant; such a resolve yields an empty list without a request.
    pub fn query(self, scope: &Scope) -> Option<MetadataQuery> {
        if !scope.is_configured() {
            return None;
        }

        match (self.profile().source, scope) {
            (Source::Attributes(filter), Scope::Entity { entity }) => {
                let path = format!("EntityDefinitions(LogicalName={})/Attributes", odata_string(entity));
                let query = MetadataQuery::new(path);
                Some(match filter {
                    AttributeFilter::All => query.select(&["LogicalName", "DisplayName"]),
                    AttributeFilter::Choice => query
                        .select(&["LogicalName", "DisplayName", "AttributeType"])
                        .filter(
                            "AttributeType eq 'Picklist' or AttributeType eq 'Status' or AttributeType eq 'State'",
                        ),
                    AttributeFilter::Lookup => query
                        .select(&["LogicalName", "DisplayName", "AttributeType"])
                        .filter("AttributeType eq 'Lookup'"),
                })
            }
            (Source::RelatedLookups, Scope::Related { form_entity, .. }) => {
                let path = format!(
                    "EntityDefinitions(LogicalName={})/Attributes/Microsoft.Dynamics.CRM.LookupAttributeMetadata",
                    odata_string(form_entity)
                );
                Some(MetadataQuery::new(path).select(&["LogicalName", "DisplayName", "Targets"]))
            }
            (
                Source::Entities,
                Scope::EntityCatalog {
                    activities_only,
                    supports_activities,
                },
            ) => {
                let mut filter = String::from("IsValidForAdvancedFind eq true and IsCustomizable/Value eq true");
                if activities_only.restricts() {
                    filter.push_str(" and IsActivity eq true");
                }
                if supports_activities.restricts() {
                    filter.push_str(" and HasActivities eq true");
                }
                Some(
                    MetadataQuery::new("EntityDefinitions")
                        .select(&["LogicalName", "DisplayName"])
                        .filter(filter),
                )
            }
            (Source::Forms, Scope::Entity { entity }) => Some(
                MetadataQuery::new("systemforms")
                    .select(&["formid", "name"])
                    .filter(format!("objecttypecode eq {}", odata_string(entity))),
            ),
            (Source::Views, Scope::Entity { entity }) => Some(
                MetadataQuery::new("savedqueries")
                    .select(&["savedqueryid", "name", "returnedtypecode"])
                    .filter(format!("returnedtypecode eq {}", odata_string(entity))),
            ),
            (Source::Apps, Scope::Global) => {
                Some(MetadataQuery::new("appmodules").select(&["appmoduleid", "name"]))
            }
            _ => None,
        }
    }

    /// Client-side record filter applied after the query.
    ///
    /// Only related lookups narrow further: a record is kept when its
    /// `Targets` array names the query entity.
    pub fn accepts(self, scope: &Scope, record: &serde_json::Value) -> bool {
        match (self.profile().source, scope) {
            (Source::RelatedLookups, Scope::Related { query_entity, .. }) => record
                .get("Targets")
                .and_then(serde_json::Value::as_array)
                .map(|targets| {
                    targets
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .any(|target| target == query_entity)
                })
                .unwrap_or(false),
            _ => true,
        }
    }
}

impl std::fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SelectorKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PROFILES
            .iter()
            .find(|profile| profile.name == s)
            .map(|profile| profile.kind)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
