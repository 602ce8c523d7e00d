//! Shared test helpers for survey server integration tests
//!
//! Provides wiremock-based mock server setup for the data point feed.
//! Helpers mount the endpoint with a canned response and return an adapter
//! pointing at the mock server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fieldsync_api::client::RestClient;
use fieldsync_api::datasource::RestRemoteDataSource;

/// Starts a mock server and returns it with an adapter pointing at it.
pub async fn setup_datasource() -> (MockServer, RestRemoteDataSource) {
    let server = MockServer::start().await;
    let client = RestClient::with_base_url(Some("test-api-key".to_string()), server.uri());
    (server, RestRemoteDataSource::new(client))
}

/// Mounts the data point feed endpoint with a fixed JSON body.
pub async fn mount_page(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/datapoints"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Canned single-record page body.
pub fn single_record_page() -> serde_json::Value {
    serde_json::json!({
        "dataPoints": [{
            "id": "rec-001",
            "surveyGroupId": 25,
            "displayName": "Borehole 12",
            "lat": 41.98,
            "lon": 2.82,
            "lastUpdateDateTime": 1579600780000_i64,
            "surveyInstances": [{
                "uuid": "inst-001",
                "surveyId": 42,
                "collectionDate": 1579600000000_i64,
                "submitter": "enumerator-3",
                "status": 2
            }]
        }],
        "resultCount": 1
    })
}
