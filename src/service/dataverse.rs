//! service::dataverse
//!
//! HTTP implementation of the metadata service against the Dataverse Web API.
//!
//! # Design
//!
//! Every query becomes one `GET {base_url}/api/data/{version}/{path}?...`
//! with the standard OData content-negotiation headers. The client never
//! writes, never retries, and enforces no timeout of its own.
//!
//! # Authentication
//!
//! None is performed here. When the host session exposes a bearer token it is
//! passed in through [`DataverseService::with_bearer_token`] and forwarded
//! as-is; otherwise requests go out bare and rely on ambient cookies or a
//! proxy.
//!
//! # Example
//!
//! ```ignore
//! use metaselect::service::{DataverseService, MetadataQuery, MetadataService};
//!
//! let service = DataverseService::new("https://contoso.crm.dynamics.com", "v9.1");
//! let records = service
//!     .fetch(&MetadataQuery::new("appmodules").select(&["appmoduleid", "name"]))
//!     .await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::traits::{MetadataError, MetadataQuery, MetadataService};

/// OData protocol version sent in both version headers.
const ODATA_VERSION: &str = "4.0";

/// Dataverse Web API metadata client.
pub struct DataverseService {
    /// HTTP client for making requests
    client: Client,
    /// Organization root URL, without trailing slash
    base_url: String,
    /// Web API version segment, e.g. "v9.1"
    api_version: String,
    /// Session bearer token passed through from the host (optional)
    bearer_token: Option<String>,
}

// Custom Debug to avoid exposing bearer_token
impl std::fmt::Debug for DataverseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataverseService")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("has_bearer_token", &self.bearer_token.is_some())
            .finish()
    }
}

impl DataverseService {
    /// Create a client for an organization root URL and API version.
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            bearer_token: None,
        }
    }

    /// Forward a session bearer token on every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Get the organization root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the Web API version segment.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Build the absolute URL for a query.
    pub fn endpoint(&self, query: &MetadataQuery) -> String {
        format!(
            "{}/api/data/{}/{}",
            self.base_url,
            self.api_version,
            query.to_relative_url()
        )
    }

    /// Build the OData request headers.
    fn headers(&self) -> Result<HeaderMap, MetadataError> {
        let mut headers = HeaderMap::new();
        headers.insert("OData-MaxVersion", HeaderValue::from_static(ODATA_VERSION));
        headers.insert("OData-Version", HeaderValue::from_static(ODATA_VERSION));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| MetadataError::AuthFailed("bearer token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Decode a response into the records of its `value` array.
    async fn handle_response(response: Response) -> Result<Vec<serde_json::Value>, MetadataError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response, status).await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MetadataError::MalformedResponse(format!("failed to parse response: {}", e)))?;

        Ok(records_of(body))
    }

    /// Map a non-success response to an error.
    async fn error_from_response(response: Response, status: StatusCode) -> MetadataError {
        // Try to get error message from body
        let message = match response.json::<ODataErrorResponse>().await {
            Ok(err) => err.error.message,
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MetadataError::AuthFailed(message),
            StatusCode::NOT_FOUND => MetadataError::NotFound(message),
            _ if status.is_server_error() => MetadataError::ApiError {
                status: status.as_u16(),
                message: format!("metadata service error: {}", message),
            },
            _ => MetadataError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl MetadataService for DataverseService {
    fn name(&self) -> &'static str {
        "dataverse"
    }

    async fn fetch(&self, query: &MetadataQuery) -> Result<Vec<serde_json::Value>, MetadataError> {
        let url = self.endpoint(query);
        debug!(%url, "querying metadata service");

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| MetadataError::NetworkError(e.to_string()))?;

        Self::handle_response(response).await
    }
}

/// Extract the `value` array from an OData collection body.
///
/// Bodies without an array-valued `value` are treated as empty collections.
fn records_of(body: serde_json::Value) -> Vec<serde_json::Value> {
    match body {
        serde_json::Value::Object(mut map) => match map.remove("value") {
            Some(serde_json::Value::Array(records)) => records,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// --------------------------------------------------------------------------
// API Response Types
// --------------------------------------------------------------------------

/// OData error envelope.
#[derive(Deserialize)]
struct ODataErrorResponse {
    error: ODataErrorBody,
}

/// OData error body.
#[derive(Deserialize)]
struct ODataErrorBody {
    message: String,
}
