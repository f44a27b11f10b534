//! service::traits
//!
//! The read-only metadata service interface.
//!
//! # Design
//!
//! The `MetadataService` trait is async because every query is network I/O.
//! It knows nothing about selectors: it executes one [`MetadataQuery`] and
//! hands back the raw records of the OData `value` array. Turning records
//! into selectable items is the resolver's job.
//!
//! Implementations never write to the service, never retry, and never acquire
//! credentials on their own. Whatever session the host already has is passed
//! in at construction.
//!
//! # Example
//!
//! ```ignore
//! use metaselect::service::{MetadataQuery, MetadataService};
//!
//! async fn entity_names(service: &dyn MetadataService) -> Result<usize, MetadataError> {
//!     let query = MetadataQuery::new("EntityDefinitions").select(&["LogicalName", "DisplayName"]);
//!     Ok(service.fetch(&query).await?.len())
//! }
//! ```

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;

/// Characters escaped inside `$filter` values and key literals.
///
/// Spaces become `%20` rather than `+`; the OData parser does not treat `+`
/// as a space.
const ODATA_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Errors from metadata service operations.
///
/// These never reach a selector control: the resolver logs them and presents
/// an empty list instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// No endpoint is configured for the service.
    #[error("metadata service not configured: {0}")]
    NotConfigured(String),

    /// The session was rejected (expired, missing, or insufficient privileges).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested metadata object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// One read query against the versioned metadata endpoint.
///
/// `path` is relative to the `/api/data/<version>/` root. Only the requested
/// fields are selected; `filter` is an OData `$filter` expression evaluated by
/// the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataQuery {
    /// Resource path, e.g. `EntityDefinitions(LogicalName='account')/Attributes`
    pub path: String,
    /// Fields for `$select`
    pub select: Vec<String>,
    /// Expression for `$filter`
    pub filter: Option<String>,
}

impl MetadataQuery {
    /// Create a query for a resource path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            select: Vec::new(),
            filter: None,
        }
    }

    /// Set the selected fields.
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Set the filter expression.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Render the path and query string relative to the API root.
    ///
    /// # Example
    ///
    /// ```
    /// use metaselect::service::MetadataQuery;
    ///
    /// let query = MetadataQuery::new("savedqueries")
    ///     .select(&["savedqueryid", "name"])
    ///     .filter("returnedtypecode eq 'account'");
    /// assert_eq!(
    ///     query.to_relative_url(),
    ///     "savedqueries?$select=savedqueryid,name&$filter=returnedtypecode%20eq%20'account'"
    /// );
    /// ```
    pub fn to_relative_url(&self) -> String {
        let mut params = Vec::new();
        if !self.select.is_empty() {
            params.push(format!("$select={}", self.select.join(",")));
        }
        if let Some(filter) = &self.filter {
            params.push(format!(
                "$filter={}",
                utf8_percent_encode(filter, ODATA_ENCODE_SET)
            ));
        }

        if params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, params.join("&"))
        }
    }
}

/// Quote a value as an OData string literal, doubling embedded quotes.
///
/// # Example
///
/// ```
/// use metaselect::service::odata_string;
///
/// assert_eq!(odata_string("account"), "'account'");
/// assert_eq!(odata_string("o'brien"), "'o''brien'");
/// ```
pub fn odata_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The metadata service a resolver reads from.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single client can back every
/// control on a form.
///
/// # Error Handling
///
/// All failures come back as `MetadataError`. Callers in this crate never
/// propagate them to the host; see [`crate::selector::MetadataResolver`].
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Get the service name (e.g., "dataverse", "mock").
    fn name(&self) -> &'static str;

    /// Execute a read query and return the records of the `value` array.
    ///
    /// A successful response without a `value` array yields no records.
    ///
    /// # Errors
    ///
    /// - `AuthFailed` if the session is rejected
    /// - `NotFound` if the resource path does not exist
    /// - `ApiError` for other non-success statuses
    /// - `NetworkError` if the request could not be sent
    /// - `MalformedResponse` if the body is not JSON
    async fn fetch(&self, query: &MetadataQuery) -> Result<Vec<serde_json::Value>, MetadataError>;
}
