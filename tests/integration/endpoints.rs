//! Endpoint precedence: 404/405 and blank or non-matching bodies fall through, other failures stop the walk

use crate::integration::mock_server::MockServerFixture;
use serde_json::json;

#[tokio::test]
async fn test_metrics_fall_through_on_404() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_error_response("GET", "/projects/p1/traces/t1", 404, r#"{"detail": "no"}"#)
        .await;
    let runs = fixture
        .mock_json(
            "GET",
            "/projects/p1/runs/t1/metrics",
            200,
            json!([{"name": "correctness", "score": 0.9}]),
        )
        .await;
    let last = fixture
        .mock_untouched("GET", "/projects/p1/traces/t1/metrics")
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let metrics = client.trace_metrics("p1", "t1").await.unwrap().unwrap();
    assert_eq!(metrics.score("correctness"), Some(0.9));

    runs.assert_async().await;
    last.assert_async().await;
}

#[tokio::test]
async fn test_missing_field_falls_through() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_json("GET", "/projects/p1/traces/t1", 200, json!({"id": "t1", "metrics": null}))
        .await;
    let _runs = fixture
        .mock_error_response("GET", "/projects/p1/runs/t1/metrics", 405, "")
        .await;
    let _last = fixture
        .mock_json(
            "GET",
            "/projects/p1/traces/t1/metrics",
            200,
            json!({"uncertainty": {"score": 0.2, "explanation": "low"}}),
        )
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let metrics = client.trace_metrics("p1", "t1").await.unwrap().unwrap();
    assert_eq!(metrics.score("uncertainty"), Some(0.2));
}

#[tokio::test]
async fn test_server_error_stops_the_walk() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_error_response("GET", "/projects/p1/traces/t1", 500, "boom")
        .await;
    let runs = fixture.mock_untouched("GET", "/projects/p1/runs/t1/metrics").await;

    let client = fixture.create_test_client().await.unwrap();
    let err = client.trace_metrics("p1", "t1").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    runs.assert_async().await;
}

#[tokio::test]
async fn test_all_candidates_unavailable_is_none() {
    let fixture = MockServerFixture::new().await;
    let mut mocks = Vec::new();
    for path in [
        "/projects/p1/traces/t1",
        "/projects/p1/runs/t1/metrics",
        "/projects/p1/traces/t1/metrics",
    ] {
        mocks.push(fixture.mock_error_response("GET", path, 404, "").await);
    }

    let client = fixture.create_test_client().await.unwrap();
    assert!(client.trace_metrics("p1", "t1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_experiments_fall_back_to_global_listing() {
    let fixture = MockServerFixture::new().await;
    let _scoped = fixture
        .mock_error_response("GET", "/projects/p1/experiments", 404, "")
        .await;
    let global = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/experiments")
            .match_query(mockito::Matcher::UrlEncoded("project_id".into(), "p1".into()))
            .with_status(200)
            .with_body(r#"{"experiments": [{"id": "e1", "name": "Prompt Tuning v2"}]}"#)
            .create_async()
            .await
    };

    let client = fixture.create_test_client().await.unwrap();
    let found = client.find_experiment_by_name("p1", "tuning").await.unwrap();
    assert_eq!(found.id, "e1");
    global.assert_async().await;
}

#[tokio::test]
async fn test_metric_wait_passes_over_endpoints_without_the_target() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_json(
            "GET",
            "/projects/p1/traces/t1",
            200,
            json!({"id": "t1", "metrics": {"correctness": {"score": 1.0, "explanation": "right"}}}),
        )
        .await;
    let runs = fixture
        .mock_json(
            "GET",
            "/projects/p1/runs/t1/metrics",
            200,
            json!([{"name": "instruction_adherence", "score": 0.8}]),
        )
        .await;
    let last = fixture
        .mock_untouched("GET", "/projects/p1/traces/t1/metrics")
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let outcome = client
        .wait_for_metric("p1", "t1", "instruction_adherence", client.poll_strategy())
        .await;
    assert!(outcome.is_ready());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(
        outcome.into_option().and_then(|m| m.score("instruction_adherence")),
        Some(0.8)
    );
    runs.assert_async().await;
    last.assert_async().await;

    // without a target the first endpoint with any metrics still wins
    let any = client.trace_metrics("p1", "t1").await.unwrap().unwrap();
    assert_eq!(any.score("correctness"), Some(1.0));
}

#[tokio::test]
async fn test_empty_metrics_field_falls_through() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_json("GET", "/projects/p1/traces/t1", 200, json!({"id": "t1", "metrics": {}}))
        .await;
    let _runs = fixture
        .mock_json("GET", "/projects/p1/runs/t1/metrics", 200, json!([]))
        .await;
    let _last = fixture
        .mock_json(
            "GET",
            "/projects/p1/traces/t1/metrics",
            200,
            json!({"instruction_adherence": {"score": 0.4, "explanation": "partly"}}),
        )
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let outcome = client
        .wait_for_metric("p1", "t1", "instruction_adherence", client.poll_strategy())
        .await;
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(
        outcome.into_option().and_then(|m| m.score("instruction_adherence")),
        Some(0.4)
    );
}
