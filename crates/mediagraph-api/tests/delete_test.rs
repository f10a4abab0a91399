//! Cascading delete integration tests.
//!
//! Run with: `cargo test -p mediagraph-api --test delete_test`

mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::minimal_png;
use helpers::{only_location, setup_test_app};
use mediagraph_storage::StorageError;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_delete_removes_record_and_blob() {
    let app = setup_test_app();
    let id = app.upload("beach.png", minimal_png(), "image/png").await;
    let location = only_location(&app.record(&id).await);

    let response = app.client().delete(&format!("/{}", id)).await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(matches!(
        app.storage.peek(&location).await,
        Err(StorageError::NotFound(_))
    ));
    assert_eq!(app.metadata.node_count(), 0);
    app.client()
        .get(&format!("/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_delete_makes_no_blob_calls() {
    let app = setup_test_app();
    let id = app.upload("beach.png", minimal_png(), "image/png").await;

    app.client()
        .delete(&format!("/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let removes_after_first = app.storage.removes();
    assert_eq!(removes_after_first, 1);

    app.client()
        .delete(&format!("/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(app.storage.removes(), removes_after_first);
}

#[tokio::test]
async fn test_delete_unknown_id_touches_no_blobs() {
    let app = setup_test_app();

    let response = app.client().delete("/0xDEAD").await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(app.storage.calls(), 0);
    assert_eq!(app.metadata.deletions(), 0);
}

#[tokio::test]
async fn test_delete_malformed_id_is_a_no_op() {
    let app = setup_test_app();

    let response = app.client().delete("/not-a-uid").await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(app.storage.calls(), 0);
    assert_eq!(app.metadata.deletions(), 0);
}

#[tokio::test]
async fn test_delete_leaves_other_records_alone() {
    let app = setup_test_app();
    let keep = app.upload("keep.png", minimal_png(), "image/png").await;
    let drop = app.upload("drop.png", minimal_png(), "image/png").await;
    let kept_location = only_location(&app.record(&keep).await);

    app.client()
        .delete(&format!("/{}", drop))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let record = app.record(&keep).await;
    assert_eq!(record.title, "keep");
    assert!(app.storage.peek(&kept_location).await.is_ok());
    assert_eq!(app.metadata.node_count(), 2);
}

#[tokio::test]
async fn test_metadata_failure_during_delete_is_reported() {
    let app = setup_test_app();
    let id = app.upload("beach.png", minimal_png(), "image/png").await;
    app.metadata.fail_delete.store(true, Ordering::SeqCst);

    let response = app.client().delete(&format!("/{}", id)).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "METADATA_WRITE_ERROR");
}
