//! Shared fixtures: mock survey server, real in-memory store, recording
//! listener, and an orchestrator wired across all three.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fieldsync_api::client::RestClient;
use fieldsync_api::datasource::RestRemoteDataSource;
use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::{IDataPointStore, IRemoteDataSource, ISyncListener, SyncEvent};
use fieldsync_engine::engine::SyncEngine;
use fieldsync_engine::orchestrator::SyncOrchestrator;
use fieldsync_store::pool::DatabasePool;
use fieldsync_store::store::SqliteDataPointStore;

pub const GROUP: SurveyGroupId = SurveyGroupId::new(25);

/// Listener double that records the full event stream
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<(i64, SyncEvent)>>,
    data_changed: Mutex<u32>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(i64, SyncEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn data_changed_count(&self) -> u32 {
        *self.data_changed.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl ISyncListener for RecordingListener {
    async fn on_event(
        &self,
        survey_group_id: SurveyGroupId,
        event: SyncEvent,
    ) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push((survey_group_id.as_i64(), event));
        Ok(())
    }

    async fn on_data_changed(&self) -> anyhow::Result<()> {
        *self.data_changed.lock().unwrap() += 1;
        Ok(())
    }
}

/// Everything a test needs to drive and inspect a sync run
pub struct Harness {
    pub server: MockServer,
    pub store: Arc<SqliteDataPointStore>,
    pub listener: Arc<RecordingListener>,
    pub orchestrator: SyncOrchestrator,
}

pub async fn setup() -> Harness {
    let server = MockServer::start().await;
    let db = DatabasePool::in_memory().await.unwrap();
    let store = Arc::new(SqliteDataPointStore::new(db.pool().clone()));
    let listener = RecordingListener::new();

    let client = RestClient::with_base_url(Some("test-api-key".to_string()), server.uri());
    let remote: Arc<dyn IRemoteDataSource> = Arc::new(RestRemoteDataSource::new(client));
    let store_port: Arc<dyn IDataPointStore> = Arc::clone(&store) as _;
    let listener_port: Arc<dyn ISyncListener> = Arc::clone(&listener) as _;
    let engine = Arc::new(SyncEngine::with_page_delay(
        remote,
        Arc::clone(&store_port),
        Duration::ZERO,
    ));
    let orchestrator = SyncOrchestrator::new(engine, store_port, listener_port);

    Harness {
        server,
        store,
        listener,
        orchestrator,
    }
}

/// Mounts the fallback page for any feed fetch. Wiremock serves the
/// first mounted match, so mount watermark-specific pages before this.
pub async fn mount_first_page(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/datapoints"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts the page served for a specific watermark value. Must be
/// mounted before the fallback page.
pub async fn mount_page_since(server: &MockServer, since: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/datapoints"))
        .and(query_param("since", since))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn empty_page() -> serde_json::Value {
    serde_json::json!({"dataPoints": [], "resultCount": 0})
}

pub fn wire_record(id: &str, name: &str, last_modified: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "surveyGroupId": GROUP.as_i64(),
        "displayName": name,
        "lat": 41.98,
        "lon": 2.82,
        "lastUpdateDateTime": last_modified,
        "surveyInstances": [{
            "uuid": format!("inst-{id}"),
            "surveyId": 42,
            "collectionDate": last_modified,
            "submitter": "enumerator-3",
            "status": 2
        }]
    })
}

pub fn page_of(records: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "resultCount": records.len(),
        "dataPoints": records
    })
}
