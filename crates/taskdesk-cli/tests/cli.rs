//! CLI tests against a mock taskdesk server.
//!
//! Each test gets its own session file in a temporary directory and points
//! the binary at a wiremock server.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: TempDir,
    session_file: PathBuf,
    api_url: String,
}

impl Harness {
    fn new(server: &MockServer) -> Self {
        let dir = TempDir::new().unwrap();
        let session_file = dir.path().join("session.json");
        Self {
            _dir: dir,
            session_file,
            api_url: format!("http://127.0.0.1:{}", server.address().port()),
        }
    }

    fn with_tokens(self, access: &str, refresh: &str) -> Self {
        let tokens = json!({ "token": access, "refreshToken": refresh });
        std::fs::write(&self.session_file, tokens.to_string()).unwrap();
        self
    }

    fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskdesk"));
        cmd.args(args);
        cmd.arg("--api-url").arg(&self.api_url);
        cmd.arg("--session-file").arg(&self.session_file);
        cmd.env_remove("TASKDESK_API_URL");
        cmd.env_remove("TASKDESK_SESSION_FILE");
        cmd.env_remove("TASKDESK_PASSWORD");
        cmd.env("NO_COLOR", "1");
        cmd.output().expect("Failed to execute CLI")
    }

    fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn stored(&self) -> Value {
        stored_tokens(&self.session_file)
    }
}

fn stored_tokens(path: &Path) -> Value {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap(),
        Err(_) => json!({}),
    }
}

fn user_json() -> Value {
    json!({ "id": 1, "name": "Ada", "email": "ada@example.com" })
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_whoami() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ok(json!({
            "user": user_json(),
            "access_token": "T1",
            "refresh_token": "R1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ok(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);

    let stdout = harness.run_success(&[
        "auth",
        "login",
        "--email",
        "ada@example.com",
        "--password",
        "Password123",
    ]);
    assert!(stdout.contains("Logged in successfully"));

    let stored = harness.stored();
    assert_eq!(stored["token"], "T1");
    assert_eq!(stored["refreshToken"], "R1");

    let stdout = harness.run_success(&["auth", "whoami", "--json"]);
    let user: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(user["email"], "ada@example.com");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_is_refreshed_transparently() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "Token has expired" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("authorization", "Bearer R1"))
        .respond_with(ok(json!({ "access_token": "T2" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ok(user_json()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ok(json!([{ "id": 4, "name": "Home", "task_count": 2 }])))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server).with_tokens("T1", "R1");

    let stdout = harness.run_success(&["projects", "list", "--json"]);
    let projects: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(projects[0]["name"], "Home");
    assert_eq!(projects[0]["task_count"], 2);

    assert_eq!(harness.stored()["token"], "T2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_revoked_session_asks_for_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "Token has expired" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "msg": "Token has been revoked" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server).with_tokens("T1", "R1");

    let output = harness.run(&["tasks", "list"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("taskdesk auth login"), "stderr: {stderr}");
    assert!(stderr.contains("session has expired"), "stderr: {stderr}");

    let stored = harness.stored();
    assert!(stored.get("token").is_none());
    assert!(stored.get("refreshToken").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_command_without_session_makes_no_requests() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    let output = harness.run(&["dashboard"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No active session"), "stderr: {stderr}");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_forgets_tokens() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server).with_tokens("T1", "R1");

    let stdout = harness.run_success(&["auth", "logout"]);

    assert!(stdout.contains("Logged out"));
    assert_eq!(harness.stored(), json!({}));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_task_is_rejected_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ok(user_json()))
        .mount(&server)
        .await;

    let harness = Harness::new(&server).with_tokens("T1", "R1");
    let long_title = "x".repeat(101);

    let output = harness.run(&["tasks", "create", &long_title]);

    assert!(!output.status.success());
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/api/auth/profile"));
}
