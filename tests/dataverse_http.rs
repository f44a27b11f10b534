//! HTTP tests for the Dataverse metadata client.
//!
//! A local `wiremock` server stands in for the organization. Live tests
//! against a real endpoint are behind the `live_service_tests` feature flag.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use metaselect::selector::{MetadataResolver, ResolveStatus, Scope, SelectorKind};
use metaselect::service::{DataverseService, MetadataError, MetadataQuery, MetadataService};

fn service_for(server: &MockServer) -> DataverseService {
    DataverseService::new(server.uri(), "v9.1")
}

fn odata_error(message: &str) -> serde_json::Value {
    json!({ "error": { "code": "0x80040217", "message": message } })
}

// =============================================================================
// Requests
// =============================================================================

mod requests {
    use super::*;

    #[tokio::test]
    async fn sends_odata_headers_and_select() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/v9.1/appmodules"))
            .and(query_param("$select", "appmoduleid,name"))
            .and(header("OData-MaxVersion", "4.0"))
            .and(header("OData-Version", "4.0"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "@odata.context": "https://org/api/data/v9.1/$metadata#appmodules(appmoduleid,name)",
                "value": [{ "appmoduleid": "a1", "name": "Sales Hub" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let records = service_for(&server)
            .fetch(&MetadataQuery::new("appmodules").select(&["appmoduleid", "name"]))
            .await
            .unwrap();

        assert_eq!(records, vec![json!({ "appmoduleid": "a1", "name": "Sales Hub" })]);
    }

    #[tokio::test]
    async fn filter_arrives_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/v9.1/savedqueries"))
            .and(query_param("$filter", "returnedtypecode eq 'account'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let query = SelectorKind::View.query(&Scope::entity("account")).unwrap();
        let records = service_for(&server).fetch(&query).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn bearer_token_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Authorization", "Bearer session-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
            .expect(1)
            .mount(&server)
            .await;

        service_for(&server)
            .with_bearer_token("session-token")
            .fetch(&MetadataQuery::new("appmodules"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn attribute_path_reaches_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/v9.1/EntityDefinitions(LogicalName='account')/Attributes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let query = SelectorKind::Attribute.query(&Scope::entity("account")).unwrap();
        service_for(&server).fetch(&query).await.unwrap();
    }

    #[tokio::test]
    async fn body_without_value_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "@odata.context": "x" })))
            .mount(&server)
            .await;

        let records = service_for(&server)
            .fetch(&MetadataQuery::new("appmodules"))
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

mod errors {
    use super::*;

    async fn fetch_with_status(status: u16, body: ResponseTemplate) -> MetadataError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(body)
            .mount(&server)
            .await;

        let err = service_for(&server)
            .fetch(&MetadataQuery::new("appmodules"))
            .await
            .unwrap_err();
        assert_eq!(server.received_requests().await.unwrap().len(), 1, "status {}", status);
        err
    }

    #[tokio::test]
    async fn unauthorized_is_auth_failed() {
        let err = fetch_with_status(
            401,
            ResponseTemplate::new(401).set_body_json(odata_error("Principal user is missing privileges")),
        )
        .await;
        assert_eq!(
            err,
            MetadataError::AuthFailed("Principal user is missing privileges".into())
        );
    }

    #[tokio::test]
    async fn forbidden_is_auth_failed() {
        let err = fetch_with_status(403, ResponseTemplate::new(403)).await;
        assert!(matches!(err, MetadataError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn missing_resource_is_not_found() {
        let err = fetch_with_status(
            404,
            ResponseTemplate::new(404).set_body_json(odata_error("Resource not found for the segment 'appmodulez'.")),
        )
        .await;
        assert!(matches!(err, MetadataError::NotFound(msg) if msg.contains("appmodulez")));
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let err = fetch_with_status(500, ResponseTemplate::new(500).set_body_json(odata_error("boom"))).await;
        assert_eq!(
            err,
            MetadataError::ApiError {
                status: 500,
                message: "metadata service error: boom".into()
            }
        );
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let err = fetch_with_status(
            400,
            ResponseTemplate::new(400).set_body_json(odata_error("Could not find a property named 'Nope'")),
        )
        .await;
        assert!(matches!(err, MetadataError::ApiError { status: 400, ref message } if message.contains("Nope")));
    }

    #[tokio::test]
    async fn error_without_body() {
        let err = fetch_with_status(502, ResponseTemplate::new(502)).await;
        assert!(matches!(err, MetadataError::ApiError { status: 502, ref message } if message.contains("Unknown error")));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let err = fetch_with_status(
            200,
            ResponseTemplate::new(200).set_body_string("<html>sign in</html>"),
        )
        .await;
        assert!(matches!(err, MetadataError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Nothing listens on port 1.
        let service = DataverseService::new("http://127.0.0.1:1", "v9.1");
        let err = service.fetch(&MetadataQuery::new("appmodules")).await.unwrap_err();
        assert!(matches!(err, MetadataError::NetworkError(_)));
    }
}

// =============================================================================
// Resolver over HTTP
// =============================================================================

mod resolver {
    use super::*;

    #[tokio::test]
    async fn resolves_sorted_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data/v9.1/systemforms"))
            .and(query_param("$filter", "objecttypecode eq 'account'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    { "formid": "f2", "name": "Sales Insights" },
                    { "formid": "f1", "name": "Account" },
                    { "formid": "f3", "name": null }
                ]
            })))
            .mount(&server)
            .await;

        let resolver = MetadataResolver::new(Arc::new(service_for(&server)));
        let resolution = resolver.resolve(SelectorKind::Form, &Scope::entity("account")).await;

        assert_eq!(resolution.status, ResolveStatus::Loaded);
        let ids: Vec<_> = resolution.items.iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2"]);
    }

    #[tokio::test]
    async fn server_failure_downgraded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resolver = MetadataResolver::new(Arc::new(service_for(&server)));
        let resolution = resolver.resolve(SelectorKind::ModelDrivenApp, &Scope::Global).await;

        assert_eq!(resolution.status, ResolveStatus::Failed);
        assert!(resolution.items.is_empty());
    }
}

// =============================================================================
// Live Service Tests (behind feature flag)
// =============================================================================

#[cfg(feature = "live_service_tests")]
mod live_tests {
    use super::*;

    fn live_service() -> Option<DataverseService> {
        let base_url = std::env::var("METASELECT_TEST_BASE_URL").ok()?;
        let token = std::env::var("METASELECT_TEST_TOKEN").ok()?;
        Some(DataverseService::new(base_url, "v9.1").with_bearer_token(token))
    }

    #[tokio::test]
    async fn live_lists_app_modules() {
        let Some(service) = live_service() else {
            eprintln!("Skipping: METASELECT_TEST_BASE_URL/METASELECT_TEST_TOKEN not set");
            return;
        };

        let query = SelectorKind::ModelDrivenApp.query(&Scope::Global).unwrap();
        assert!(service.fetch(&query).await.is_ok());
    }

    #[tokio::test]
    async fn live_account_attributes_resolve() {
        let Some(service) = live_service() else {
            eprintln!("Skipping: METASELECT_TEST_BASE_URL/METASELECT_TEST_TOKEN not set");
            return;
        };

        let resolver = MetadataResolver::new(Arc::new(service));
        let resolution = resolver
            .resolve(SelectorKind::Attribute, &Scope::entity("account"))
            .await;
        assert_eq!(resolution.status, ResolveStatus::Loaded);
        assert!(resolution.items.iter().any(|i| i.identifier == "name"));
    }
}
