//! Project provisioning and `.env` persistence

use crate::integration::mock_server::{MockServerFixture, API_KEY};
use galileo_harness::config::envfile;
use galileo_harness::setup::{setup_project, SetupOptions};
use galileo_harness::Error;
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_setup_creates_stream_and_updates_env_file() {
    let fixture = MockServerFixture::new().await;
    let _project = fixture
        .mock_json("POST", "/projects", 201, json!({"id": "p1", "name": "demo"}))
        .await;
    let _settings = fixture
        .mock_json(
            "GET",
            "/projects/p1/settings",
            200,
            json!({"scorers_configuration": {"instruction_adherence": true}}),
        )
        .await;
    let put = fixture.mock_untouched("PUT", "/projects/p1/settings").await;
    let _streams = fixture
        .mock_json("GET", "/projects/p1/log_streams", 200, json!([]))
        .await;
    let create_stream = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/projects/p1/log_streams")
            .match_body(Matcher::PartialJson(json!({"name": "dev"})))
            .with_status(201)
            .with_body(r#"{"id": "ls-9", "name": "dev"}"#)
            .create_async()
            .await
    };

    let dir = tempfile::tempdir().unwrap();
    let env_path = dir.path().join(".env");
    std::fs::write(&env_path, "OPENAI_API_KEY=sk-local\nGALILEO_PROJECT=old\n").unwrap();

    let client = fixture.create_test_client().await.unwrap();
    let options = SetupOptions {
        project: "demo".into(),
        log_stream: "dev".into(),
        env_file: Some(env_path.clone()),
        ..SetupOptions::default()
    };
    let report = setup_project(&client, &options).await.unwrap();
    assert_eq!(report.project.id, "p1");
    assert_eq!(report.log_stream.id, "ls-9");
    put.assert_async().await;
    create_stream.assert_async().await;

    let written = envfile::parse(&std::fs::read_to_string(&env_path).unwrap());
    let keys: Vec<&str> = written.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        ["OPENAI_API_KEY", "GALILEO_PROJECT", "GALILEO_LOG_STREAM", "GALILEO_API_KEY", "GALILEO_CONSOLE_URL"]
    );
    assert!(written.contains(&("GALILEO_PROJECT".to_string(), "demo".to_string())));
    assert!(written.contains(&("GALILEO_API_KEY".to_string(), API_KEY.to_string())));
    assert!(written.contains(&("GALILEO_CONSOLE_URL".to_string(), fixture.base_url.clone())));
}

#[tokio::test]
async fn test_unverified_scorer_fails_setup() {
    let fixture = MockServerFixture::new().await;
    let _project = fixture
        .mock_json("POST", "/projects", 200, json!({"id": "p1", "name": "demo"}))
        .await;
    let _settings = fixture
        .mock_json("GET", "/projects/p1/settings", 200, json!({"alerts_configuration": []}))
        .await;
    let put = {
        let mut server = fixture.server.lock().await;
        server
            .mock("PUT", "/projects/p1/settings")
            .match_body(Matcher::Json(json!({
                "scorers_configuration": {"instruction_adherence": true},
                "alerts_configuration": []
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await
    };

    let client = fixture.create_test_client().await.unwrap();
    let options = SetupOptions {
        project: "demo".into(),
        env_file: None,
        ..SetupOptions::default()
    };
    let err = setup_project(&client, &options).await.unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.to_string().contains("instruction_adherence"));
    put.assert_async().await;
}

#[tokio::test]
async fn test_register_scorer_enables_evaluate_metric() {
    let fixture = MockServerFixture::new().await;
    let put = {
        let mut server = fixture.server.lock().await;
        server
            .mock("PUT", "/projects/p1/settings")
            .match_header("authorization", Matcher::Exact(format!("Bearer {}", API_KEY)))
            .match_body(Matcher::Json(json!({
                "evaluate": {"metrics": {"correctness": {"enabled": true}}}
            })))
            .with_status(200)
            .with_body(r#"{"evaluate": {"metrics": {"correctness": {"enabled": true}}}}"#)
            .create_async()
            .await
    };

    let client = fixture.create_test_client().await.unwrap();
    let settings = client.register_scorer("p1", "correctness").await.unwrap();
    assert_eq!(settings["evaluate"]["metrics"]["correctness"]["enabled"], true);
    put.assert_async().await;
}

#[tokio::test]
async fn test_register_scorer_surfaces_rejection() {
    let fixture = MockServerFixture::new().await;
    let _put = fixture
        .mock_error_response("PUT", "/projects/p1/settings", 422, r#"{"detail": "unknown scorer"}"#)
        .await;

    let client = fixture.create_test_client().await.unwrap();
    let err = client.register_scorer("p1", "nonsense").await.unwrap_err();
    assert_eq!(err.status(), Some(422));
}
