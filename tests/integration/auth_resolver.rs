//! Login exchange and name-to-ID resolution

use crate::integration::mock_server::{MockServerFixture, API_KEY};
use galileo_harness::Error;
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_login_token_is_used_as_bearer() {
    let fixture = MockServerFixture::new().await;
    let login = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/login/api_key")
            .match_body(Matcher::Json(json!({"api_key": API_KEY})))
            .with_status(200)
            .with_body(r#"{"access_token": "tok-1", "jwt": "ignored"}"#)
            .create_async()
            .await
    };
    let projects = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/projects")
            .match_header("authorization", "Bearer tok-1")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"[{"id": "p1", "name": "demo"}]"#)
            .create_async()
            .await
    };

    let client = fixture.create_authenticated_client().await.unwrap();
    assert!(client.credentials().uses_token());
    assert_eq!(client.find_project("demo").await.unwrap().id, "p1");

    login.assert_async().await;
    projects.assert_async().await;
}

#[tokio::test]
async fn test_failed_login_falls_back_to_api_key() {
    let fixture = MockServerFixture::new().await;
    let _login = fixture
        .mock_error_response("POST", "/login/api_key", 401, r#"{"detail": "bad key"}"#)
        .await;
    let projects = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/projects")
            .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await
    };

    let client = fixture.create_authenticated_client().await.unwrap();
    assert!(!client.credentials().uses_token());
    assert!(client.list_projects().await.unwrap().is_empty());
    projects.assert_async().await;
}

#[tokio::test]
async fn test_login_other_than_200_is_ignored() {
    let fixture = MockServerFixture::new().await;
    let login = fixture
        .mock_json("POST", "/login/api_key", 201, json!({"token": "tok-created"}))
        .await;

    let client = fixture.create_authenticated_client().await.unwrap();
    assert!(!client.credentials().uses_token());
    assert_eq!(client.credentials().bearer(), API_KEY);
    login.assert_async().await;
}

#[tokio::test]
async fn test_resolve_log_stream_by_name() {
    let fixture = MockServerFixture::new().await;
    let _projects = fixture
        .mock_json(
            "GET",
            "/projects",
            200,
            json!([{"id": "p0", "name": "other"}, {"id": "p1", "name": "demo"}]),
        )
        .await;
    let _streams = fixture
        .mock_json(
            "GET",
            "/projects/p1/log_streams",
            200,
            json!([{"id": "ls-1", "name": "prod"}, {"id": "ls-2", "name": "dev"}]),
        )
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let (project, stream) = client.resolve_configured().await.unwrap();
    assert_eq!(project.id, "p1");
    assert_eq!(stream.id, "ls-2");
    assert_eq!(stream.project_id.as_deref(), Some("p1"));
}

#[tokio::test]
async fn test_unknown_names_are_not_found() {
    let fixture = MockServerFixture::new().await;
    let _projects = fixture
        .mock_json("GET", "/projects", 200, json!([{"id": "p1", "name": "demo"}]))
        .await;
    let _streams = fixture
        .mock_json("GET", "/projects/p1/log_streams", 200, json!([]))
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let err = client.find_project("missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "Project", .. }));

    let err = client.resolve_log_stream("demo", "dev").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_server_error_is_typed_and_retryable() {
    let fixture = MockServerFixture::new().await;
    let _projects = fixture
        .mock_error_response("GET", "/projects", 503, "maintenance")
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let err = client.list_projects().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_create_project_reuses_existing_on_conflict() {
    let fixture = MockServerFixture::new().await;
    let create = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/projects")
            .match_body(Matcher::PartialJson(json!({"name": "demo", "type": "gen_ai"})))
            .with_status(422)
            .with_body(r#"{"detail": "A project with this name already exists"}"#)
            .create_async()
            .await
    };
    let _projects = fixture
        .mock_json("GET", "/projects", 200, json!({"projects": [{"id": "p1", "name": "demo"}]}))
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let project = client.create_project("demo", None).await.unwrap();
    assert_eq!(project.id, "p1");
    create.assert_async().await;
}

#[tokio::test]
async fn test_create_project_other_422_is_an_error() {
    let fixture = MockServerFixture::new().await;
    let _create = fixture
        .mock_error_response("POST", "/projects", 422, r#"{"detail": "name too long"}"#)
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let err = client.create_project("demo", None).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(!err.is_retryable());
}
