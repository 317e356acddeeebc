mod common;

use common::{Harness, SOURCE_BUCKET, THUMBNAIL_BUCKET};
use pixelpost::datamodel::{FailureKind, TransformOutcome, TransformStage, UploadEvent};
use pixelpost::dispatch::DispatchOptions;
use pixelpost::test_utils::{ScriptedPushClient, jpeg_bytes, png_bytes};
use std::time::{Duration, Instant};

fn events(keys: &[&str]) -> Vec<UploadEvent> {
    keys.iter()
        .map(|key| UploadEvent::new(SOURCE_BUCKET, *key))
        .collect()
}

#[tokio::test]
async fn test_missing_object_fails_at_fetch_without_aborting_the_batch() {
    // Given: one stored image and one key that does not exist
    let harness = Harness::new(ScriptedPushClient::new());
    harness
        .store
        .insert(SOURCE_BUCKET, "img1", png_bytes(600, 400))
        .await;

    // When: the batch is processed
    let report = harness
        .thumbnails
        .run(events(&["img1", "missing"]))
        .await
        .unwrap();

    // Then: one result per record, in input order
    assert_eq!(report.total, 2);
    assert_eq!(report.results[0].key, "img1");
    assert!(report.results[0].is_success());
    assert_eq!(report.results[1].key, "missing");
    assert_eq!(report.results[1].failed_stage(), Some(TransformStage::Fetch));

    let thumbnail = harness
        .store
        .object(THUMBNAIL_BUCKET, "img1.jpeg")
        .await
        .expect("thumbnail should be written");
    let decoded = image::load_from_memory(&thumbnail).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (150, 100));
}

#[tokio::test]
async fn test_corrupt_image_is_isolated() {
    let harness = Harness::new(ScriptedPushClient::new());
    for key in ["a.png", "c.jpg", "d.png"] {
        harness
            .store
            .insert(SOURCE_BUCKET, key, png_bytes(300, 300))
            .await;
    }
    harness
        .store
        .insert(SOURCE_BUCKET, "bad.jpg", b"\xFF\xD8\xFF garbage".to_vec())
        .await;

    let report = harness
        .thumbnails
        .run(events(&["a.png", "bad.jpg", "c.jpg", "d.png"]))
        .await
        .unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 1);
    match &report.results[1].outcome {
        TransformOutcome::Failure { stage, kind, .. } => {
            assert_eq!(*stage, Some(TransformStage::Decode));
            assert_eq!(*kind, FailureKind::Data);
        }
        other => panic!("expected a decode failure, got {:?}", other),
    }
    assert_eq!(
        harness.store.keys(THUMBNAIL_BUCKET).await,
        vec!["a.png.jpeg", "c.jpg.jpeg", "d.png.jpeg"]
    );
}

#[tokio::test]
async fn test_rejected_write_fails_at_write() {
    let harness = Harness::new(ScriptedPushClient::new());
    harness
        .store
        .insert(SOURCE_BUCKET, "img1", jpeg_bytes(64, 64))
        .await;
    harness.store.reject_writes_to(THUMBNAIL_BUCKET).await;

    let report = harness.thumbnails.run(events(&["img1"])).await.unwrap();

    assert_eq!(report.results[0].failed_stage(), Some(TransformStage::Write));
    assert!(harness.store.keys(THUMBNAIL_BUCKET).await.is_empty());
}

#[tokio::test]
async fn test_store_outage_is_transient() {
    let harness = Harness::new(ScriptedPushClient::new());
    harness
        .store
        .insert(SOURCE_BUCKET, "img1", png_bytes(10, 10))
        .await;
    harness.store.fail_reads_of("img1").await;

    let report = harness.thumbnails.run(events(&["img1"])).await.unwrap();

    assert!(matches!(
        report.results[0].outcome,
        TransformOutcome::Failure {
            stage: Some(TransformStage::Fetch),
            kind: FailureKind::TransientIo,
            ..
        }
    ));
}

#[tokio::test]
async fn test_reprocessing_the_same_key_is_idempotent() {
    let harness = Harness::new(ScriptedPushClient::new());
    harness
        .store
        .insert(SOURCE_BUCKET, "img1", png_bytes(1200, 900))
        .await;

    let first = harness.thumbnails.run(events(&["img1"])).await.unwrap();
    let second = harness.thumbnails.run(events(&["img1"])).await.unwrap();

    assert_eq!(first.results, second.results);
    assert_eq!(harness.store.keys(THUMBNAIL_BUCKET).await, vec!["img1.jpeg"]);
    let thumbnail = harness
        .store
        .object(THUMBNAIL_BUCKET, "img1.jpeg")
        .await
        .unwrap();
    let decoded = image::load_from_memory(&thumbnail).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (150, 113));
}

#[tokio::test]
async fn test_empty_batch() {
    let harness = Harness::new(ScriptedPushClient::new());
    let report = harness.thumbnails.run(Vec::new()).await.unwrap();
    assert_eq!(report.total, 0);
    assert!(report.results.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_batch_latency_is_bounded_by_the_slowest_unit() {
    let harness = Harness::new(ScriptedPushClient::new());
    let latency = Duration::from_millis(300);
    let keys: Vec<String> = (0..8).map(|i| format!("img{}", i)).collect();
    for key in &keys {
        harness
            .store
            .insert(SOURCE_BUCKET, key, png_bytes(40, 20))
            .await;
        harness.store.delay_reads_of(key, latency).await;
    }
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();

    let started = Instant::now();
    let report = harness.thumbnails.run(events(&key_refs)).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.succeeded, 8);
    // Sequential processing would take at least 8 x 300ms.
    assert!(elapsed < latency * 4, "batch took {:?}", elapsed);
}

#[tokio::test]
async fn test_deadline_marks_stalled_units_transient() {
    let options = DispatchOptions::default().with_deadline(Duration::from_millis(200));
    let harness = Harness::with_options(ScriptedPushClient::new(), options);
    harness
        .store
        .insert(SOURCE_BUCKET, "fast", png_bytes(20, 20))
        .await;
    harness
        .store
        .insert(SOURCE_BUCKET, "hung", png_bytes(20, 20))
        .await;
    harness
        .store
        .delay_reads_of("hung", Duration::from_secs(30))
        .await;

    let report = harness
        .thumbnails
        .run(events(&["fast", "hung"]))
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert!(report.results[0].is_success());
    assert_eq!(
        report.results[1].outcome,
        TransformOutcome::Failure {
            stage: None,
            kind: FailureKind::TransientIo,
            reason: "timeout".to_string(),
        }
    );
}
