//! Integration tests for the palma-chat binary.
//! Uses assert_cmd to run the binary with temp session files, either in mock
//! mode or against an in-process HTTP server playing the chat API.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const FALLBACK_SESSION_ID: &str = "cc2f430a-8e08-460a-b21f-e3eab4344b6b";

/// Command with a scrubbed environment: no user config, no inherited overrides.
fn palma_chat(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::from(cargo_bin_cmd!("palma-chat"));
    cmd.env("HOME", home.path())
        .env("USERPROFILE", home.path())
        .env_remove("PALMA_CONFIG")
        .env_remove("PALMA_API_BASE_URL")
        .env_remove("PALMA_USE_CHAT_MOCK")
        .env_remove("RUST_LOG");
    cmd
}

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn chat_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let mut requests = state.requests.lock().unwrap();
    requests.push(body);
    if !state.status.is_success() {
        return (state.status, "backend unavailable".into());
    }
    let reply = json!({
        "session_id": "srv-session-1",
        "answer": format!("Answer number {}.", requests.len()),
        "sources": [
            {"source": "https://docs.example/one", "chunk_id": "https://docs.example/one::chunk-1"}
        ]
    });
    (StatusCode::OK, reply.to_string())
}

/// Serve `POST /chat` from a background thread for the rest of the test.
fn spawn_chat_server(status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        status,
        requests: requests.clone(),
    };

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new()
                .route("/chat", post(chat_handler))
                .with_state(state);
            axum::serve(listener, app).await.unwrap();
        });
    });
    (base_url, requests)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn mock_mode_prints_canned_answer_and_stores_fallback_session() {
    let home = tempfile::tempdir().unwrap();
    let session_file = home.path().join("session.yaml");

    palma_chat(&home)
        .env("PALMA_API_BASE_URL", "http://127.0.0.1:9")
        .env("PALMA_USE_CHAT_MOCK", "true")
        .arg("--session-file")
        .arg(&session_file)
        .arg("What services does X provide?")
        .assert()
        .success()
        .stdout(predicate::str::contains("Modular Management provides"))
        .stdout(predicate::str::contains("Sources:"))
        .stdout(predicate::str::contains(
            "https://www.modularmanagement.com/solutions/consulting",
        ));

    let stored = std::fs::read_to_string(&session_file).unwrap();
    assert!(stored.contains(FALLBACK_SESSION_ID), "got {:?}", stored);
}

#[test]
fn mock_mode_echoes_existing_session() {
    let home = tempfile::tempdir().unwrap();
    let session_file = home.path().join("session.yaml");
    std::fs::write(&session_file, "session_id: earlier-session\n").unwrap();

    palma_chat(&home)
        .env("PALMA_API_BASE_URL", "http://127.0.0.1:9")
        .env("PALMA_USE_CHAT_MOCK", "true")
        .arg("--session-file")
        .arg(&session_file)
        .write_stdin("hello\n")
        .assert()
        .success();

    let stored = std::fs::read_to_string(&session_file).unwrap();
    assert!(stored.contains("earlier-session"));
    assert!(!stored.contains(FALLBACK_SESSION_ID));
}

#[test]
fn new_session_flag_discards_stored_session() {
    let home = tempfile::tempdir().unwrap();
    let session_file = home.path().join("session.yaml");
    std::fs::write(&session_file, "session_id: stale\n").unwrap();

    palma_chat(&home)
        .env("PALMA_API_BASE_URL", "http://127.0.0.1:9")
        .env("PALMA_USE_CHAT_MOCK", "true")
        .arg("--session-file")
        .arg(&session_file)
        .arg("--new-session")
        .arg("hi")
        .assert()
        .success();

    let stored = std::fs::read_to_string(&session_file).unwrap();
    assert!(stored.contains(FALLBACK_SESSION_ID));
}

#[test]
fn missing_base_url_fails_before_any_request() {
    let home = tempfile::tempdir().unwrap();
    let session_file = home.path().join("session.yaml");

    palma_chat(&home)
        .env("PALMA_USE_CHAT_MOCK", "true")
        .arg("--session-file")
        .arg(&session_file)
        .arg("hello")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("base URL is not defined"));

    assert!(!session_file.exists());
}

#[test]
fn base_url_from_config_file_is_used() {
    let (base_url, requests) = spawn_chat_server(StatusCode::OK);
    let home = tempfile::tempdir().unwrap();
    let config_path = home.path().join("config.yaml");
    let session_file = home.path().join("session.yaml");
    std::fs::write(
        &config_path,
        format!(
            "api:\n  base_url: {}\nsession:\n  file: {}\n",
            base_url,
            session_file.display()
        ),
    )
    .unwrap();

    palma_chat(&home)
        .arg("--config")
        .arg(&config_path)
        .arg("Where are you?")
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer number 1."))
        .stdout(predicate::str::contains("  https://docs.example/one"));

    assert_eq!(requests.lock().unwrap().len(), 1);
    assert!(std::fs::read_to_string(&session_file)
        .unwrap()
        .contains("srv-session-1"));
}

#[test]
fn live_mode_replays_server_session_across_lines() {
    let (base_url, requests) = spawn_chat_server(StatusCode::OK);
    let home = tempfile::tempdir().unwrap();
    let session_file = home.path().join("session.yaml");

    palma_chat(&home)
        .env("PALMA_API_BASE_URL", &base_url)
        .arg("--session-file")
        .arg(&session_file)
        .write_stdin("first question\n\nsecond question\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer number 1."))
        .stdout(predicate::str::contains("Answer number 2."));

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["session_id"], Value::Null);
    assert_eq!(requests[1]["session_id"], "srv-session-1");
    for body in requests.iter() {
        assert_eq!(body["namespace"], "https://www.modularmanagement.com/");
    }
    assert_eq!(requests[1]["query"], "second question");
}

#[test]
fn server_error_shows_generic_message_and_keeps_session() {
    let (base_url, requests) = spawn_chat_server(StatusCode::SERVICE_UNAVAILABLE);
    let home = tempfile::tempdir().unwrap();
    let session_file = home.path().join("session.yaml");
    std::fs::write(&session_file, "session_id: kept\n").unwrap();

    palma_chat(&home)
        .env("PALMA_API_BASE_URL", &base_url)
        .arg("--session-file")
        .arg(&session_file)
        .arg("anyone there?")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Something went wrong. Please try again.",
        ))
        .stdout(predicate::str::contains("backend unavailable").not());

    assert_eq!(requests.lock().unwrap()[0]["session_id"], "kept");
    assert!(std::fs::read_to_string(&session_file)
        .unwrap()
        .contains("kept"));
}

#[test]
fn save_config_writes_settings_that_a_later_run_uses() {
    let (base_url, requests) = spawn_chat_server(StatusCode::OK);
    let home = tempfile::tempdir().unwrap();
    let config_path = home.path().join("palma").join("config.yaml");
    let session_file = home.path().join("session.yaml");

    palma_chat(&home)
        .env("PALMA_API_BASE_URL", &base_url)
        .arg("--config")
        .arg(&config_path)
        .arg("--session-file")
        .arg(&session_file)
        .arg("--save-config")
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved config to"));

    let saved = std::fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains(&base_url), "got {:?}", saved);
    assert!(requests.lock().unwrap().is_empty());

    palma_chat(&home)
        .arg("--config")
        .arg(&config_path)
        .arg("from the saved config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer number 1."));

    assert_eq!(requests.lock().unwrap().len(), 1);
    assert!(std::fs::read_to_string(&session_file)
        .unwrap()
        .contains("srv-session-1"));
}
