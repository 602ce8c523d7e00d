//! Orchestrator lifecycle behavior: event ordering, run serialization,
//! and the unconditional post-run sweep

use std::sync::Arc;

use fieldsync_core::domain::newtypes::SurveyGroupId;
use fieldsync_core::ports::{DataPointFilter, IDataPointStore, RemoteDataPoint, SyncEvent};
use tokio_util::sync::CancellationToken;

use crate::common::{empty_page, mount_first_page, page_of, setup, wire_record, GROUP};

#[tokio::test]
async fn event_sequence_is_started_progress_terminal() {
    let h = setup().await;
    mount_first_page(
        &h.server,
        page_of(vec![wire_record("rec-a", "Borehole 12", 100)]),
    )
    .await;

    h.orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();

    let events: Vec<SyncEvent> = h.listener.events().into_iter().map(|(_, e)| e).collect();
    assert_eq!(events.first(), Some(&SyncEvent::Started));
    assert!(events.last().unwrap().is_terminal());
    // Everything between start and terminal is progress
    for event in &events[1..events.len() - 1] {
        assert!(matches!(event, SyncEvent::Progress { .. }));
    }
}

#[tokio::test]
async fn runs_for_the_same_group_are_serialized() {
    let h = setup().await;
    mount_first_page(&h.server, empty_page()).await;

    let orchestrator = Arc::new(h.orchestrator);
    let first = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            orchestrator
                .start_sync(GROUP, CancellationToken::new())
                .await
        })
    };
    let second = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            orchestrator
                .start_sync(GROUP, CancellationToken::new())
                .await
        })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // With runs serialized, each run's Started follows the previous run's
    // terminal event; interleaving would put two Starteds back to back.
    let events = h.listener.events();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].1, SyncEvent::Started);
    assert!(events[1].1.is_terminal());
    assert_eq!(events[2].1, SyncEvent::Started);
    assert!(events[3].1.is_terminal());
}

#[tokio::test]
async fn runs_for_different_groups_are_independent() {
    let h = setup().await;
    mount_first_page(&h.server, empty_page()).await;

    let other = SurveyGroupId::new(7);
    h.orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await
        .unwrap();
    h.orchestrator
        .start_sync(other, CancellationToken::new())
        .await
        .unwrap();

    let groups: Vec<i64> = h.listener.events().into_iter().map(|(g, _)| g).collect();
    assert_eq!(groups, vec![25, 25, 7, 7]);
    assert_eq!(h.listener.data_changed_count(), 2);
}

#[tokio::test]
async fn orphans_are_swept_even_when_the_run_fails() {
    let h = setup().await;
    // No mock mounted: wiremock answers 404, which aborts the run.

    // Seed a record that arrives without submissions: it lands as a row
    // the sweep is responsible for removing.
    let seeded = RemoteDataPoint {
        id: "rec-a".to_string(),
        survey_group_id: GROUP.as_i64(),
        display_name: "Borehole 12".to_string(),
        latitude: None,
        longitude: None,
        last_modified: 100,
        submissions: Vec::new(),
    };
    h.store.merge_data_points(&[seeded]).await.unwrap();

    let result = h
        .orchestrator
        .start_sync(GROUP, CancellationToken::new())
        .await;
    assert!(result.is_err());

    // The sweep ran despite the failure
    let stored = h
        .store
        .query_data_points(GROUP, &DataPointFilter::new())
        .await
        .unwrap();
    assert!(stored.is_empty());
    assert_eq!(h.listener.data_changed_count(), 1);
}

#[tokio::test]
async fn cancelled_run_completes_with_a_normal_event() {
    let h = setup().await;
    mount_first_page(&h.server, empty_page()).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let summary = h.orchestrator.start_sync(GROUP, cancel).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(
        h.listener.events().last(),
        Some(&(25, SyncEvent::CompletedOk { synced: 0 }))
    );
    assert_eq!(h.listener.data_changed_count(), 1);
}
