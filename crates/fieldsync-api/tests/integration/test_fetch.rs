//! Page fetch behavior of the port adapter

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fieldsync_core::domain::newtypes::{SurveyGroupId, SyncTime};
use fieldsync_core::ports::IRemoteDataSource;

use crate::common::{mount_page, setup_datasource, single_record_page};

#[tokio::test]
async fn fetch_page_maps_records() {
    let (server, datasource) = setup_datasource().await;
    mount_page(&server, single_record_page()).await;

    let page = datasource
        .fetch_page(SurveyGroupId::new(25), None)
        .await
        .unwrap();

    assert_eq!(page.result_count, 1);
    assert_eq!(page.data_points.len(), 1);

    let dp = &page.data_points[0];
    assert_eq!(dp.id, "rec-001");
    assert_eq!(dp.survey_group_id, 25);
    assert_eq!(dp.display_name, "Borehole 12");
    assert_eq!(dp.latitude, Some(41.98));
    assert_eq!(dp.longitude, Some(2.82));
    assert_eq!(dp.last_modified, 1_579_600_780_000);
    assert_eq!(dp.submissions.len(), 1);
    assert_eq!(dp.submissions[0].uuid, "inst-001");
    assert_eq!(dp.submissions[0].form_id, "42");
    assert_eq!(dp.submissions[0].status, 2);
}

#[tokio::test]
async fn fetch_page_sends_group_and_watermark_params() {
    let (server, datasource) = setup_datasource().await;

    Mock::given(method("GET"))
        .and(path("/datapoints"))
        .and(query_param("surveyGroupId", "25"))
        .and(query_param("since", "1579600780000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dataPoints": [],
            "resultCount": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let since = SyncTime::from_millis(1_579_600_780_000);
    let page = datasource
        .fetch_page(SurveyGroupId::new(25), Some(&since))
        .await
        .unwrap();

    assert!(page.data_points.is_empty());
}

#[tokio::test]
async fn first_sync_omits_the_since_param() {
    let (server, datasource) = setup_datasource().await;

    // Matching on the group param only; the mock would not match if a
    // stray `since` were required, and the assertion below checks the
    // request that actually arrived.
    Mock::given(method("GET"))
        .and(path("/datapoints"))
        .and(query_param("surveyGroupId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dataPoints": [],
            "resultCount": 0
        })))
        .mount(&server)
        .await;

    datasource
        .fetch_page(SurveyGroupId::new(7), None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("since"), "unexpected since param: {query}");
}

#[tokio::test]
async fn empty_page_is_returned_as_is() {
    let (server, datasource) = setup_datasource().await;
    mount_page(
        &server,
        serde_json::json!({"dataPoints": [], "resultCount": 0}),
    )
    .await;

    let page = datasource
        .fetch_page(SurveyGroupId::new(25), None)
        .await
        .unwrap();
    assert!(page.data_points.is_empty());
    assert_eq!(page.result_count, 0);
}
