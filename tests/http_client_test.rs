//! HTTP client tests against a mock Testinium server

mod helpers;

use helpers::run_config;
use serde_json::json;
use std::time::Duration;
use testinium_pipeline::api::{ApiClientConfig, ProjectUpdate, TestiniumApi, TestiniumHttpClient};
use testinium_pipeline::core::{
    AccessToken, Credentials, Platform, Project, StageOutcome, UploadedFile,
};
use testinium_pipeline::execution::{exit_code, Verdict, WorkflowOrchestrator};
use wiremock::matchers::{
    basic_auth, bearer_token, body_partial_json, body_string_contains, method, path,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> TestiniumHttpClient {
    let config = ApiClientConfig::new()
        .with_api_url(format!("{}/api/", server.uri()))
        .with_auth_url(format!("{}/uaa/oauth/token", server.uri()))
        .with_timeout(5);
    TestiniumHttpClient::new(config).unwrap()
}

fn token() -> AccessToken {
    AccessToken::new("abc123")
}

fn project_json() -> serde_json::Value {
    json!({
        "id": 7,
        "project_name": "Checkout",
        "test_framework": "APPIUM",
        "test_runner_tool": "MAVEN",
        "repository_path": "git@example.com:qa/checkout.git",
        "test_file_type": "JAVA",
        "android_mobile_app_hash": "0ff1ce"
    })
}

#[tokio::test]
async fn test_authenticate_uses_password_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uaa/oauth/token"))
        .and(basic_auth("testiniumSuiteTrustedClient", "testiniumSuiteSecretKey"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=qa%40example.com"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc123",
            "token_type": "bearer",
            "expires_in": 43199
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials {
        username: "qa@example.com".to_string(),
        password: "secret".to_string(),
    };
    let outcome = client_for(&server).authenticate(&credentials).await;

    match outcome {
        StageOutcome::Success(response) => {
            assert_eq!(response.access_token.as_deref(), Some("abc123"))
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_find_project_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/7"))
        .and(bearer_token("abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).find_project("7", &token()).await;

    match outcome {
        StageOutcome::Success(project) => {
            assert_eq!(project.id, 7);
            assert_eq!(project.display_name(), "Checkout");
            assert_eq!(project.android_mobile_app_hash.as_deref(), Some("0ff1ce"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_responses_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such project"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/503"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let missing = client.find_project("404", &token()).await;
    assert!(matches!(missing, StageOutcome::ClientError(ref m) if m.contains("404")));

    let unavailable = client.find_project("503", &token()).await;
    assert!(matches!(unavailable, StageOutcome::ServerError(ref m) if m.contains("503")));

    let garbled = client.find_project("html", &token()).await;
    assert!(matches!(
        garbled,
        StageOutcome::MalformedResponse { ref raw, .. } if raw.contains("maintenance")
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_a_server_error() {
    let config = ApiClientConfig::new()
        .with_api_url("http://127.0.0.1:1/api")
        .with_timeout(2);
    let client = TestiniumHttpClient::new(config).unwrap();

    let outcome = client.trigger_run("42", &token()).await;

    assert!(matches!(outcome, StageOutcome::ServerError(_)));
}

#[tokio::test]
async fn test_upload_sends_multipart_form() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("app-release.apk");
    std::fs::write(&artifact, b"PK\x03\x04fake-apk").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/file/upload"))
        .and(bearer_token("abc123"))
        .and(body_string_contains("filename=\"app-release.apk\""))
        .and(body_string_contains("name=\"isSignRequired\""))
        .and(body_string_contains("fake-apk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_token": "T1",
            "meta_data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).upload(&artifact, &token()).await;

    match outcome {
        StageOutcome::Success(response) => assert_eq!(response.file_token.as_deref(), Some("T1")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_of_missing_artifact_never_hits_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .upload(std::path::Path::new("/nonexistent/app.apk"), &token())
        .await;

    assert!(matches!(outcome, StageOutcome::ClientError(_)));
}

#[tokio::test]
async fn test_update_project_puts_platform_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/projects/7"))
        .and(bearer_token("abc123"))
        .and(body_partial_json(json!({
            "enabled": true,
            "project_name": "Checkout",
            "android_mobile_app": "app-release.apk",
            "android_file_token": "T1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .expect(1)
        .mount(&server)
        .await;

    let project: Project = serde_json::from_value(project_json()).unwrap();
    let uploaded = UploadedFile {
        file_token: "T1".to_string(),
        meta_data: None,
    };
    let update =
        ProjectUpdate::for_upload(&project, Platform::Android, "app-release.apk", &uploaded);

    let outcome = client_for(&server).update_project(&update, &token()).await;

    assert!(matches!(outcome, StageOutcome::Success(ref p) if p.id == 7));
}

#[tokio::test]
async fn test_plan_status_and_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/plans/42/checkIsRunning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"running": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/plans/43/checkIsRunning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "idle"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/plans/42/run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"execution_id": 1234})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/executions/1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result_summary": {"SUCCESS": 90, "FAILURE": 8}
        })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    assert_eq!(client.is_running("42", &token()).await, StageOutcome::Success(true));
    assert!(matches!(
        client.is_running("43", &token()).await,
        StageOutcome::MalformedResponse { .. }
    ));

    let execution_id = match client.trigger_run("42", &token()).await {
        StageOutcome::Success(response) => response.execution_id(),
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(execution_id.as_deref(), Some("1234"));

    match client.fetch_report("1234", &token()).await {
        StageOutcome::Success(report) => {
            assert_eq!(report.result_summary.success, 90);
            assert_eq!(report.result_summary.failure, 8);
            assert_eq!(report.result_summary.error, 0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_report_with_null_counts_is_evaluated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/executions/E7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"result_summary": {"SUCCESS": 90, "FAILURE": 8, "ERROR": null}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    match client_for(&server).fetch_report("E7", &token()).await {
        StageOutcome::Success(report) => {
            assert_eq!(report.result_summary.failure, 8);
            assert_eq!(report.result_summary.error, 0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_full_run_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("app-release.apk");
    std::fs::write(&artifact, b"fake-apk").unwrap();
    let env_file = dir.path().join("env");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uaa/oauth/token"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/uaa/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc123"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/file/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"file_token": "T1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/projects/7"))
        .and(body_partial_json(json!({"android_file_token": "T1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .expect(1)
        .mount(&server)
        .await;
    // Idle before the run, running once after it, then idle again
    Mock::given(method("GET"))
        .and(path("/api/plans/42/checkIsRunning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"running": false})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/plans/42/checkIsRunning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"running": true})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/plans/42/checkIsRunning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"running": false})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/plans/42/run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"execution_id": "E1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/executions/E1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result_summary": {"SUCCESS": 90, "FAILURE": 8, "ERROR": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = run_config(&artifact, Duration::from_secs(60))
        .with_max_failure_percentage(10)
        .with_poll_interval(Duration::from_millis(10))
        .with_output_file(&env_file);
    let orchestrator = WorkflowOrchestrator::new(client_for(&server), config);

    let result = orchestrator.execute().await;

    assert!(matches!(result, Ok(Verdict::Passed { .. })));
    assert_eq!(exit_code(&result), 0);
    let written = std::fs::read_to_string(&env_file).unwrap();
    assert_eq!(
        written,
        "AC_TESTINIUM_RESULT_FAILURE_SUMMARY=8\n\
         AC_TESTINIUM_RESULT_ERROR_SUMMARY=0\n\
         AC_TESTINIUM_RESULT_SUCCESS_SUMMARY=90\n"
    );
}
