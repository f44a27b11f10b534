//! service::mock
//!
//! Mock metadata service for deterministic testing.
//!
//! # Design
//!
//! The mock stores canned records per resource path and records every query
//! it receives. It can be configured to fail, and individual queries can be
//! held behind a gate until the test releases them, which is how tests drive
//! slow and out-of-order responses.
//!
//! # Example
//!
//! ```
//! use metaselect::service::mock::MockMetadataService;
//! use metaselect::service::{MetadataQuery, MetadataService};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let service = MockMetadataService::new()
//!     .with_records("appmodules", vec![json!({ "appmoduleid": "1", "name": "Sales Hub" })]);
//!
//! let records = service.fetch(&MetadataQuery::new("appmodules")).await.unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(service.queries().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

use super::traits::{MetadataError, MetadataQuery, MetadataService};

/// Mock metadata service for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockMetadataService {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockInner {
    /// Canned records by resource path.
    records: HashMap<String, Vec<serde_json::Value>>,
    /// Failure configuration.
    fail_on: Option<FailOn>,
    /// Recorded queries for verification.
    queries: Vec<MetadataQuery>,
    /// Pending gates by resource path, consumed one per query.
    gates: HashMap<String, VecDeque<oneshot::Receiver<()>>>,
}

/// Configuration for which queries should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every query with the given error.
    Any(MetadataError),
    /// Fail queries for one resource path with the given error.
    Path(String, MetadataError),
}

/// Holds one gated query until released.
///
/// Dropping the handle releases the query as well.
#[derive(Debug)]
pub struct Gate {
    sender: oneshot::Sender<()>,
}

impl Gate {
    /// Let the gated query complete.
    pub fn release(self) {
        // The query may already have been dropped; nothing to release then.
        let _ = self.sender.send(());
    }
}

impl MockMetadataService {
    /// Create a new mock with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add canned records for a resource path.
    pub fn with_records(self, path: impl Into<String>, records: Vec<serde_json::Value>) -> Self {
        self.set_records(path, records);
        self
    }

    /// Replace the canned records for a resource path.
    pub fn set_records(&self, path: impl Into<String>, records: Vec<serde_json::Value>) {
        self.lock().records.insert(path.into(), records);
    }

    /// Configure the mock to fail.
    ///
    /// # Example
    ///
    /// ```
    /// use metaselect::service::mock::{FailOn, MockMetadataService};
    /// use metaselect::service::MetadataError;
    ///
    /// let service = MockMetadataService::new()
    ///     .fail_on(FailOn::Any(MetadataError::NetworkError("offline".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Hold the next query for a resource path until the returned gate is released.
    ///
    /// Gates queue: calling this twice holds the next two queries, in order.
    pub fn gate(&self, path: impl Into<String>) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.lock()
            .gates
            .entry(path.into())
            .or_default()
            .push_back(receiver);
        Gate { sender }
    }

    /// Get all recorded queries.
    pub fn queries(&self) -> Vec<MetadataQuery> {
        self.lock().queries.clone()
    }

    /// Clear recorded queries.
    pub fn clear_queries(&self) {
        self.lock().queries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        // A panic in another test thread must not cascade into this one.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, path: &str) -> Option<MetadataError> {
        match &self.lock().fail_on {
            Some(FailOn::Any(e)) => Some(e.clone()),
            Some(FailOn::Path(p, e)) if p == path => Some(e.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl MetadataService for MockMetadataService {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, query: &MetadataQuery) -> Result<Vec<serde_json::Value>, MetadataError> {
        let gate = {
            let mut inner = self.lock();
            inner.queries.push(query.clone());
            inner
                .gates
                .get_mut(&query.path)
                .and_then(VecDeque::pop_front)
        };

        if let Some(gate) = gate {
            // Released or dropped, either way the query proceeds.
            let _ = gate.await;
        }

        if let Some(err) = self.check_fail(&query.path) {
            return Err(err);
        }

        self.lock()
            .records
            .get(&query.path)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(query.path.clone()))
    }
}
