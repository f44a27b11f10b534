//! selector::resolver
//!
//! Turns a (variant, scope) pair into a sorted list of items.
//!
//! # Failure Handling
//!
//! Resolving never fails from the caller's point of view. An unconfigured
//! scope short-circuits to an empty list without a request, and a service
//! error is logged and downgraded to an empty list. The distinction is kept
//! in [`ResolveStatus`] so callers can tell "nothing there" from "could not
//! ask".

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error};

use super::kind::SelectorKind;
use super::scope::Scope;
use crate::core::collation::sort_by_label;
use crate::core::types::MetadataItem;
use crate::service::MetadataService;

/// How a resolve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveStatus {
    /// The service answered; the list may still be empty
    Loaded,
    /// Required scope fields were missing; no request was made
    Unconfigured,
    /// The service failed; the list is empty
    Failed,
}

impl std::fmt::Display for ResolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveStatus::Loaded => write!(f, "loaded"),
            ResolveStatus::Unconfigured => write!(f, "unconfigured"),
            ResolveStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The outcome of one resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Items sorted by label
    pub items: Vec<MetadataItem>,
    /// How the resolve ended
    pub status: ResolveStatus,
}

impl Resolution {
    /// A successful resolve.
    pub fn loaded(items: Vec<MetadataItem>) -> Self {
        Self {
            items,
            status: ResolveStatus::Loaded,
        }
    }

    /// A resolve skipped for lack of scope.
    pub fn unconfigured() -> Self {
        Self {
            items: Vec::new(),
            status: ResolveStatus::Unconfigured,
        }
    }

    /// A resolve whose request failed.
    pub fn failed() -> Self {
        Self {
            items: Vec::new(),
            status: ResolveStatus::Failed,
        }
    }
}

/// Fetches and normalizes metadata for any selector variant.
///
/// Cheap to clone; clones share the service.
#[derive(Clone)]
pub struct MetadataResolver {
    service: Arc<dyn MetadataService>,
}

impl std::fmt::Debug for MetadataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataResolver")
            .field("service", &self.service.name())
            .finish()
    }
}

impl MetadataResolver {
    /// Create a resolver over a service.
    pub fn new(service: Arc<dyn MetadataService>) -> Self {
        Self { service }
    }

    /// Resolve the items for a variant within a scope.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use metaselect::selector::{MetadataResolver, ResolveStatus, Scope, SelectorKind};
    /// use metaselect::service::mock::MockMetadataService;
    /// use serde_json::json;
    ///
    /// # tokio_test::block_on(async {
    /// let service = MockMetadataService::new().with_records(
    ///     "appmodules",
    ///     vec![
    ///         json!({ "appmoduleid": "2", "name": "Sales Hub" }),
    ///         json!({ "appmoduleid": "1", "name": "Field Service" }),
    ///     ],
    /// );
    /// let resolver = MetadataResolver::new(Arc::new(service));
    ///
    /// let resolution = resolver.resolve(SelectorKind::ModelDrivenApp, &Scope::Global).await;
    /// assert_eq!(resolution.status, ResolveStatus::Loaded);
    /// assert_eq!(resolution.items[0].label, "Field Service");
    /// # });
    /// ```
    pub async fn resolve(&self, kind: SelectorKind, scope: &Scope) -> Resolution {
        let Some(query) = kind.query(scope) else {
            debug!(%kind, %scope, "scope unconfigured, skipping resolve");
            return Resolution::unconfigured();
        };

        match self.service.fetch(&query).await {
            Ok(records) => Resolution::loaded(normalize(kind, scope, &records)),
            Err(e) => {
                error!(%kind, %scope, service = self.service.name(), error = %e, "metadata resolve failed");
                Resolution::failed()
            }
        }
    }
}

/// Map raw records to sorted, de-duplicated items.
///
/// Records missing an identifier or a non-empty label are skipped, as are
/// records the variant's client-side filter rejects. When two records share
/// an identifier the first one wins.
pub fn normalize(kind: SelectorKind, scope: &Scope, records: &[serde_json::Value]) -> Vec<MetadataItem> {
    let shape = kind.shape();
    let mut seen = HashSet::new();

    let mut items: Vec<MetadataItem> = records
        .iter()
        .filter(|record| kind.accepts(scope, record))
        .filter_map(|record| {
            let identifier = record.get(shape.identifier)?.as_str()?;
            let label = shape.label.read(record)?;
            if identifier.is_empty() || label.is_empty() {
                return None;
            }
            Some(MetadataItem::new(identifier, label))
        })
        .filter(|item| seen.insert(item.identifier.clone()))
        .collect();

    sort_by_label(&mut items, |item| item.label.as_str());
    items
}
