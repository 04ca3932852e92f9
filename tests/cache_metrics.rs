mod support;

use std::collections::HashSet;

use axum::http::{Method, StatusCode};
use metrics_util::debugging::DebuggingRecorder;
use serde_json::json;
use support::{Harness, send};

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    knoxs::infra::telemetry::describe_metrics();

    let harness = Harness::new();

    // miss, then hit
    for _ in 0..2 {
        let (status, _) = send(&harness.public, Method::GET, "/api/sections/portfolio", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    // a create invalidates the cached portfolio views
    let token = harness.admin_token().await;
    let (status, _) = send(
        &harness.admin,
        Method::POST,
        "/admin/portfolio",
        Some(&token),
        Some(json!({ "title": "Kestrel", "image_url": "https://x/k.jpg" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "knoxs_query_cache_hit_total",
        "knoxs_query_cache_miss_total",
        "knoxs_query_cache_invalidate_total",
        "knoxs_query_cache_fetch_ms",
    ];
    for name in expected {
        assert!(names.contains(name), "missing metric `{name}` in {names:?}");
    }
}
