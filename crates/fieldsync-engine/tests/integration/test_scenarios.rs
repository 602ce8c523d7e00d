//! End-to-end sync runs against a mock survey server and a real store

use fieldsync_core::ports::{DataPointFilter, IDataPointStore, SyncEvent};
use fieldsync_engine::SyncError;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    empty_page, mount_first_page, mount_page_since, page_of, setup, wire_record, GROUP,
};

#[tokio::test]
async fn empty_feed_completes_with_zero_records() {
    let h = setup().await;
    mount_first_page(&h.server, empty_page()).await;

    let summary = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.synced, 0);
    assert!(!summary.corruption_observed);
    assert_eq!(
        h.listener.events(),
        vec![
            (25, SyncEvent::Started),
            (25, SyncEvent::CompletedOk { synced: 0 }),
        ]
    );
    assert_eq!(h.listener.data_changed_count(), 1);
}

#[tokio::test]
async fn one_page_feed_lands_in_the_store() {
    let h = setup().await;
    // Second fetch carries the committed watermark; serve the boundary
    // record back, which the engine recognizes as already merged.
    mount_page_since(
        &h.server,
        "300",
        page_of(vec![wire_record("rec-c", "Spring", 300)]),
    )
    .await;
    mount_first_page(
        &h.server,
        page_of(vec![
            wire_record("rec-a", "Borehole 12", 100),
            wire_record("rec-b", "Hand pump", 200),
            wire_record("rec-c", "Spring", 300),
        ]),
    )
    .await;

    let summary = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.synced, 3);
    let stored = h
        .store
        .query_data_points(GROUP, &DataPointFilter::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].name, "Borehole 12");

    let events = h.listener.events();
    assert_eq!(events.first(), Some(&(25, SyncEvent::Started)));
    assert!(events.contains(&(25, SyncEvent::Progress { synced: 3 })));
    assert_eq!(
        events.last(),
        Some(&(25, SyncEvent::CompletedOk { synced: 3 }))
    );
}

#[tokio::test]
async fn multi_page_feed_drops_boundary_duplicates() {
    let h = setup().await;
    mount_page_since(
        &h.server,
        "300",
        page_of(vec![
            wire_record("rec-c", "Spring", 300),
            wire_record("rec-d", "Reservoir", 400),
        ]),
    )
    .await;
    mount_page_since(
        &h.server,
        "400",
        page_of(vec![wire_record("rec-d", "Reservoir", 400)]),
    )
    .await;
    mount_first_page(
        &h.server,
        page_of(vec![
            wire_record("rec-a", "Borehole 12", 100),
            wire_record("rec-b", "Hand pump", 200),
            wire_record("rec-c", "Spring", 300),
        ]),
    )
    .await;

    let summary = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.synced, 4);
    let stored = h
        .store
        .query_data_points(GROUP, &DataPointFilter::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 4);
}

#[tokio::test]
async fn submissionless_record_completes_corrupt_and_is_swept() {
    let h = setup().await;
    let orphan = serde_json::json!({
        "id": "rec-bad",
        "surveyGroupId": GROUP.as_i64(),
        "displayName": "Ghost site",
        "lastUpdateDateTime": 500_i64,
        "surveyInstances": []
    });
    mount_page_since(
        &h.server,
        "500",
        page_of(vec![wire_record("rec-a", "Borehole 12", 100)]),
    )
    .await;
    mount_first_page(
        &h.server,
        page_of(vec![wire_record("rec-a", "Borehole 12", 100), orphan]),
    )
    .await;

    let summary = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();

    assert!(summary.corruption_observed);
    assert_eq!(
        h.listener.events().last(),
        Some(&(25, SyncEvent::CompletedCorrupt { synced: 2 }))
    );

    // The post-run sweep removes the submission-less row
    let stored = h
        .store
        .query_data_points(GROUP, &DataPointFilter::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.as_str(), "rec-a");
}

#[tokio::test]
async fn forbidden_surfaces_assignment_required() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path("/datapoints"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&h.server)
        .await;

    let err = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::AssignmentRequired(g) if g == GROUP));
    let events = h.listener.events();
    assert!(matches!(
        events.last(),
        Some((25, SyncEvent::AssignmentRequired { .. }))
    ));
    // Refresh still fires: an aborted run may have committed pages
    assert_eq!(h.listener.data_changed_count(), 1);
}

#[tokio::test]
async fn server_error_surfaces_failed_event() {
    let h = setup().await;
    Mock::given(method("GET"))
        .and(path("/datapoints"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&h.server)
        .await;

    let err = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Api(_)));
    assert!(matches!(
        h.listener.events().last(),
        Some((25, SyncEvent::Failed { .. }))
    ));
    assert_eq!(h.listener.data_changed_count(), 1);
}

#[tokio::test]
async fn watermark_survives_across_runs() {
    let h = setup().await;
    mount_page_since(
        &h.server,
        "200",
        page_of(vec![wire_record("rec-b", "Hand pump", 200)]),
    )
    .await;
    mount_first_page(
        &h.server,
        page_of(vec![
            wire_record("rec-a", "Borehole 12", 100),
            wire_record("rec-b", "Hand pump", 200),
        ]),
    )
    .await;

    h.orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();

    // A second run starts from the committed watermark: its first fetch
    // carries since=200 and re-merges only the boundary record, which the
    // upsert absorbs without duplicating rows.
    let summary = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.synced, 1);

    let stored = h
        .store
        .query_data_points(GROUP, &DataPointFilter::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);

    let watermark = h.store.get_sync_time(GROUP).await.unwrap();
    assert_eq!(watermark.unwrap().as_str(), "200");
}
