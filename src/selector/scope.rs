//! selector::scope
//!
//! Query parameters that narrow a resolve.
//!
//! A scope is supplied by the host on every render and may change at any
//! time. Any change invalidates the previously resolved list.

/// Host flag restricting the entity catalog.
///
/// Hosts send `"All"` (or nothing) for no restriction; any other value turns
/// the restriction on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivityFilter {
    /// No restriction
    #[default]
    All,
    /// Restrict to entities matching the flag
    Only,
}

impl ActivityFilter {
    /// Parse the host's raw flag value.
    ///
    /// # Example
    ///
    /// ```
    /// use metaselect::selector::ActivityFilter;
    ///
    /// assert_eq!(ActivityFilter::parse(""), ActivityFilter::All);
    /// assert_eq!(ActivityFilter::parse("All"), ActivityFilter::All);
    /// assert_eq!(ActivityFilter::parse("Yes"), ActivityFilter::Only);
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "All" => ActivityFilter::All,
            _ => ActivityFilter::Only,
        }
    }

    /// Check whether the flag adds a predicate to the query.
    pub fn restricts(self) -> bool {
        self == ActivityFilter::Only
    }
}

impl std::fmt::Display for ActivityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityFilter::All => write!(f, "All"),
            ActivityFilter::Only => write!(f, "Only"),
        }
    }
}

/// The parameters of one resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Objects belonging to one entity (attributes, forms, views).
    Entity {
        /// Entity logical name
        entity: String,
    },
    /// Lookup attributes on one entity that target another.
    Related {
        /// Entity whose lookups are listed
        form_entity: String,
        /// Entity the lookups must target
        query_entity: String,
    },
    /// The entity catalog itself.
    EntityCatalog {
        /// Only activity entities
        activities_only: ActivityFilter,
        /// Only entities that support activities
        supports_activities: ActivityFilter,
    },
    /// No parameters (application modules).
    Global,
}

impl Scope {
    /// Create an entity scope.
    pub fn entity(entity: impl Into<String>) -> Self {
        Scope::Entity {
            entity: entity.into(),
        }
    }

    /// Create a related-lookup scope.
    pub fn related(form_entity: impl Into<String>, query_entity: impl Into<String>) -> Self {
        Scope::Related {
            form_entity: form_entity.into(),
            query_entity: query_entity.into(),
        }
    }

    /// Create an entity catalog scope.
    pub fn catalog(activities_only: ActivityFilter, supports_activities: ActivityFilter) -> Self {
        Scope::EntityCatalog {
            activities_only,
            supports_activities,
        }
    }

    /// Check whether every required field is present.
    ///
    /// An unconfigured scope resolves to an empty list without touching the
    /// service; it is a normal state, not an error.
    pub fn is_configured(&self) -> bool {
        match self {
            Scope::Entity { entity } => !entity.trim().is_empty(),
            Scope::Related {
                form_entity,
                query_entity,
            } => !form_entity.trim().is_empty() && !query_entity.trim().is_empty(),
            Scope::EntityCatalog { .. } | Scope::Global => true,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Entity { entity } => write!(f, "entity={}", entity),
            Scope::Related {
                form_entity,
                query_entity,
            } => write!(f, "form_entity={} query_entity={}", form_entity, query_entity),
            Scope::EntityCatalog {
                activities_only,
                supports_activities,
            } => write!(
                f,
                "activities_only={} supports_activities={}",
                activities_only, supports_activities
            ),
            Scope::Global => write!(f, "global"),
        }
    }
}
