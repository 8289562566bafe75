//! Metric and trace polling against a mock platform

use crate::integration::mock_server::MockServerFixture;
use galileo_harness::{GalileoClient, PollOutcome, PollStrategy};
use mockito::Matcher;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_metric_found_on_first_attempt() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_json(
            "GET",
            "/projects/p1/traces/t1",
            200,
            json!({
                "id": "t1",
                "metrics": {"instruction_adherence": {"score": 0.75, "explanation": "followed"}}
            }),
        )
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let outcome = client
        .wait_for_metric("p1", "t1", "instruction_adherence", client.poll_strategy())
        .await;
    assert!(outcome.is_ready());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(
        outcome.into_option().and_then(|m| m.score("instruction_adherence")),
        Some(0.75)
    );
}

#[tokio::test]
async fn test_absent_metric_times_out_within_budget() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_json(
            "GET",
            "/projects/p1/traces/t1",
            200,
            json!({"id": "t1", "metrics": [{"name": "correctness", "score": 1.0}]}),
        )
        .await;
    let mut unavailable = Vec::new();
    for path in ["/projects/p1/runs/t1/metrics", "/projects/p1/traces/t1/metrics"] {
        unavailable.push(fixture.mock_error_response("GET", path, 404, "").await);
    }

    let client = fixture.create_test_client().await.unwrap();
    let strategy = PollStrategy::fixed(Duration::from_millis(50), Duration::from_millis(300));
    let outcome = client
        .wait_for_metric("p1", "t1", "instruction_adherence", &strategy)
        .await;

    match outcome {
        PollOutcome::TimedOut { attempts, elapsed } => {
            assert!(attempts >= 2);
            assert!(elapsed < strategy.max_wait + strategy.interval + Duration::from_millis(500));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_permission_error_stops_polling() {
    let fixture = MockServerFixture::new().await;
    let trace = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/projects/p1/traces/t1")
            .with_status(403)
            .with_body(r#"{"detail": "forbidden"}"#)
            .expect(1)
            .create_async()
            .await
    };

    let client = fixture.create_test_client().await.unwrap();
    let outcome = client
        .wait_for_metric("p1", "t1", "correctness", client.poll_strategy())
        .await;
    match outcome {
        PollOutcome::Failed { error, attempts, .. } => {
            assert_eq!(error.status(), Some(403));
            assert_eq!(attempts, 1);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    trace.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_keep_polling() {
    let fixture = MockServerFixture::new().await;
    let _trace = fixture
        .mock_error_response("GET", "/projects/p1/traces/t1", 503, "busy")
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let outcome = client
        .wait_for_metric("p1", "t1", "correctness", client.poll_strategy())
        .await;
    assert!(matches!(outcome, PollOutcome::TimedOut { .. }));
    assert!(outcome.attempts() > 1);
}

#[tokio::test]
async fn test_wait_for_trace_with_content() {
    let fixture = MockServerFixture::new().await;
    let search = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/projects/p1/traces/search")
            .match_body(Matcher::PartialJson(json!({
                "log_stream_id": "ls-1",
                "limit": 10,
                "order_by": "created_at",
                "order_direction": "desc"
            })))
            .with_status(200)
            .with_body(
                json!({"records": [
                    {"id": "t-old", "output": "unrelated"},
                    {"id": "t-new", "spans": [{"response": {"content": "An object at rest stays at rest."}}]}
                ]})
                .to_string(),
            )
            .create_async()
            .await
    };

    let client = fixture.create_test_client().await.unwrap();
    let outcome = client
        .wait_for_trace_with_content("p1", "ls-1", "at rest stays", client.poll_strategy())
        .await;
    assert_eq!(outcome.into_option().map(|t| t.id).as_deref(), Some("t-new"));
    search.assert_async().await;
}

#[tokio::test]
async fn test_latest_trace_on_empty_stream_is_none() {
    let fixture = MockServerFixture::new().await;
    let _search = fixture
        .mock_json("POST", "/projects/p1/traces/search", 200, json!({"traces": []}))
        .await;

    let client = fixture.create_test_client().await.unwrap();
    assert!(client.latest_trace("p1", "ls-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unresponsive_server_does_not_overrun_budget() {
    // accepts connections and never answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let fixture = MockServerFixture::new().await;
    let client = GalileoClient::builder(fixture.config())
        .base_url_override(format!("http://{}", addr))
        .authenticate(false)
        .build()
        .await
        .unwrap();

    let strategy = PollStrategy::fixed(Duration::from_millis(100), Duration::from_millis(500));
    let started = Instant::now();
    let outcome = client
        .wait_for_metric("p1", "t1", "instruction_adherence", &strategy)
        .await;
    let took = started.elapsed();

    assert!(matches!(outcome, PollOutcome::TimedOut { attempts: 1, .. }), "{:?}", outcome);
    assert!(
        took < strategy.max_wait + strategy.interval + Duration::from_millis(200),
        "took {:?}",
        took
    );
}

#[tokio::test]
async fn test_wait_for_latest_trace_until_one_is_ingested() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let fixture = MockServerFixture::new().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let search = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/projects/p1/traces/search")
            .match_body(Matcher::PartialJson(json!({"log_stream_id": "ls-1", "limit": 1})))
            .with_status(200)
            .with_body_from_request(move |_| {
                let body = if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                    json!({"records": []})
                } else {
                    json!({"records": [{"id": "t-fresh"}]})
                };
                body.to_string().into_bytes()
            })
            .expect(3)
            .create_async()
            .await
    };

    let client = fixture.create_test_client().await.unwrap();
    let outcome = client
        .wait_for_latest_trace("p1", "ls-1", client.poll_strategy())
        .await;
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(outcome.into_option().map(|t| t.id).as_deref(), Some("t-fresh"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    search.assert_async().await;
}
