//! Dataset and experiment lookups

use crate::integration::mock_server::MockServerFixture;
use galileo_harness::Error;
use serde_json::json;

#[tokio::test]
async fn test_dataset_entries_are_fetched_when_absent() {
    let fixture = MockServerFixture::new().await;
    let _list = fixture
        .mock_json(
            "GET",
            "/projects/p1/datasets",
            200,
            json!({"datasets": [{"id": "d1", "name": "newton-qa"}, {"id": "d2", "name": "other"}]}),
        )
        .await;
    let _detail = fixture
        .mock_json("GET", "/projects/p1/datasets/d1", 200, json!({"id": "d1", "name": "newton-qa"}))
        .await;
    let entries = fixture
        .mock_json(
            "GET",
            "/projects/p1/datasets/d1/entries",
            200,
            json!({"entries": [{"input": "first law?"}, {"input": "second law?"}]}),
        )
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let dataset = client.find_dataset_by_name(Some("p1"), "newton-qa").await.unwrap();
    assert_eq!(dataset.id, "d1");
    assert_eq!(dataset.entries.len(), 2);
    entries.assert_async().await;
}

#[tokio::test]
async fn test_inline_entries_skip_the_extra_call() {
    let fixture = MockServerFixture::new().await;
    let _detail = fixture
        .mock_json(
            "GET",
            "/datasets/d1",
            200,
            json!({"id": "d1", "name": "qa", "entries": [{"input": "x"}]}),
        )
        .await;
    let entries = fixture.mock_untouched("GET", "/datasets/d1/entries").await;

    let client = fixture.create_test_client().await.unwrap();
    let dataset = client.get_dataset(None, "d1").await.unwrap();
    assert_eq!(dataset.entries.len(), 1);
    entries.assert_async().await;
}

#[tokio::test]
async fn test_unknown_dataset_name() {
    let fixture = MockServerFixture::new().await;
    let _list = fixture.mock_json("GET", "/datasets", 200, json!([])).await;

    let client = fixture.create_test_client().await.unwrap();
    let err = client.find_dataset_by_name(None, "nope").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "Dataset", .. }));
}

#[tokio::test]
async fn test_experiment_details_use_project_scope_first() {
    let fixture = MockServerFixture::new().await;
    let _detail = fixture
        .mock_json_any_query(
            "GET",
            "/projects/p1/experiments/e1",
            200,
            json!({"id": "e1", "name": "baseline", "task_type": 16}),
        )
        .await;
    let global = fixture.mock_untouched("GET", "/experiments/e1").await;

    let client = fixture.create_test_client().await.unwrap();
    let experiment = client.get_experiment("p1", "e1").await.unwrap();
    assert_eq!(experiment.name, "baseline");
    assert_eq!(experiment.extra.get("task_type"), Some(&json!(16)));
    global.assert_async().await;
}
