use std::env;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use ozunlu_cli::client::HttpIntakeClient;
use ozunlu_cli::commands::{config, health, migrate, quotes, request};
use ozunlu_core::domain::quote::{QuoteId, QuoteRecord, QuoteRequest};

#[test]
fn migrate_returns_success_with_in_memory_database() {
    with_env(&[("OZUNLU_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_is_a_no_op_for_the_memory_backend() {
    with_env(&[("OZUNLU_STORAGE_BACKEND", "memory")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert!(payload["message"].as_str().unwrap_or_default().contains("memory"));
    });
}

#[test]
fn migrate_returns_config_failure_for_invalid_settings() {
    with_env(&[("OZUNLU_LOGGING_FORMAT", "xml")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_reports_values_with_their_sources() {
    with_env(
        &[("OZUNLU_SERVER_ALLOWED_ORIGIN", "https://teklif.example.com"), ("PORT", "8080")],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);
            assert!(!result.output.contains('\n'), "output should be a single line");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "config");
            assert_eq!(payload["status"], "ok");

            let source_of = |key: &str| {
                payload["data"]
                    .as_array()
                    .and_then(|values| values.iter().find(|value| value["key"] == key))
                    .map(|value| (value["value"].clone(), value["source"].clone()))
            };
            assert_eq!(
                source_of("server.allowed_origin"),
                Some((
                    json!("https://teklif.example.com"),
                    json!("env (OZUNLU_SERVER_ALLOWED_ORIGIN)")
                ))
            );
            assert_eq!(source_of("server.port"), Some((json!("8080"), json!("env (PORT)"))));
            assert_eq!(source_of("storage.backend"), Some((json!("Sqlite"), json!("default"))));
            assert_eq!(
                source_of("client.base_url"),
                Some((json!("http://localhost:3001"), json!("default")))
            );
        },
    );
}

#[test]
fn config_returns_config_failure_for_invalid_settings() {
    with_env(&[("OZUNLU_LOGGING_FORMAT", "xml")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn quotes_lists_and_fetches_from_the_service() {
    let base_url = spawn_fake_service();
    seed_quote(&base_url);

    with_env(&[], || {
        let listed = quotes::run(None, Some(base_url.clone()));
        assert_eq!(listed.exit_code, 0, "unexpected output: {}", listed.output);
        let payload = parse_payload(&listed.output);
        assert_eq!(payload["message"], "1 quote(s) stored");
        let id = payload["data"][0]["id"].as_i64().expect("numeric id");

        let fetched = quotes::run(Some(id.to_string()), Some(base_url.clone()));
        assert_eq!(fetched.exit_code, 0);
        assert_eq!(parse_payload(&fetched.output)["data"]["companyName"], "Acme");

        let missing = quotes::run(Some("42".to_string()), Some(base_url.clone()));
        assert_eq!(missing.exit_code, 8);
        assert_eq!(parse_payload(&missing.output)["error_class"], "not_found");

        let slashed = quotes::run(Some("a/b".to_string()), Some(base_url.clone()));
        assert_eq!(slashed.exit_code, 8, "unexpected output: {}", slashed.output);
        assert_eq!(parse_payload(&slashed.output)["error_class"], "not_found");
    });
}

#[test]
fn health_reports_a_live_service() {
    let base_url = spawn_fake_service();

    with_env(&[], || {
        let result = health::run(Some(base_url.clone()));
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "health");
        assert_eq!(payload["data"]["status"], "ok");
    });
}

#[test]
fn unreachable_service_is_reported_with_its_own_exit_code() {
    with_env(&[("OZUNLU_CLIENT_TIMEOUT_SECS", "2")], || {
        let result = health::run(Some("http://127.0.0.1:9".to_string()));
        assert_eq!(result.exit_code, 6);
        assert_eq!(parse_payload(&result.output)["error_class"], "service_unreachable");
    });
}

#[tokio::test]
async fn request_session_submits_over_http() {
    let (address, _server) = start_fake_service().await;
    let client = HttpIntakeClient::new(&format!("http://{address}"), Duration::from_secs(5))
        .expect("client");
    let answers = [
        "dorse", "30", "5mm / 4mm", "pesin", "", "Acme", "Jane", "0555", "a@b.com", "",
    ];
    let mut input =
        Cursor::new(answers.iter().map(|line| format!("{line}\n")).collect::<String>());
    let mut output = Vec::new();

    let record = request::run_session(&mut input, &mut output, &client).await.expect("created");
    assert_eq!(record.company_name, "Acme");
    assert_eq!(record.brand, None);

    let stored = client.list_quotes().await.expect("list");
    assert_eq!(stored, vec![record.clone()]);
    assert_eq!(client.get_quote(&record.id.to_string()).await.expect("get"), record);
}

#[derive(Clone, Default)]
struct FakeService {
    quotes: Arc<Mutex<Vec<QuoteRecord>>>,
}

fn fake_router() -> Router {
    Router::new()
        .route("/api/quote", post(fake_create))
        .route("/api/quotes", get(fake_list))
        .route("/api/quote/{id}", get(fake_get))
        .route("/api/health", get(fake_health))
        .with_state(FakeService::default())
}

async fn fake_create(
    State(service): State<FakeService>,
    Json(request): Json<QuoteRequest>,
) -> (StatusCode, Json<Value>) {
    match request.validate() {
        Ok(valid) => {
            let mut quotes = service.quotes.lock().expect("lock");
            let record = valid.into_record(QuoteId(quotes.len() as i64 + 1), Utc::now());
            quotes.push(record.clone());
            (StatusCode::CREATED, Json(json!({ "success": true, "message": "ok", "data": record })))
        }
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Please fill in all required fields." })),
        ),
    }
}

async fn fake_health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

async fn fake_list(State(service): State<FakeService>) -> Json<Value> {
    let quotes = service.quotes.lock().expect("lock").clone();
    Json(json!({ "success": true, "data": quotes }))
}

async fn fake_get(
    State(service): State<FakeService>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let quotes = service.quotes.lock().expect("lock");
    match quotes.iter().find(|quote| quote.id.to_string() == id) {
        Some(quote) => (StatusCode::OK, Json(json!({ "success": true, "data": quote }))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Quote not found." })),
        ),
    }
}

async fn start_fake_service() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, fake_router()).await.expect("serve");
    });
    (address, handle)
}

/// Runs the fake service on its own runtime so blocking commands can call it.
fn spawn_fake_service() -> String {
    let (sender, receiver) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime");
        runtime.block_on(async move {
            let (address, server) = start_fake_service().await;
            sender.send(address).expect("send address");
            let _ = server.await;
        });
    });
    format!("http://{}", receiver.recv().expect("fake service address"))
}

fn seed_quote(base_url: &str) {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("rt");
    runtime.block_on(async {
        let response = reqwest::Client::new()
            .post(format!("{base_url}/api/quote"))
            .json(&json!({
                "type": "damper",
                "brand": "Mercedes",
                "model": "4140",
                "cargoType": "Hafriyat",
                "volumeM3": "18",
                "thickness": "8mm / 6mm",
                "companyName": "Acme",
                "contactPhone": "0555",
                "email": "a@b.com",
                "contactPerson": "Jane"
            }))
            .send()
            .await
            .expect("seed request");
        assert_eq!(response.status().as_u16(), 201);
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "OZUNLU_DATABASE_URL",
        "OZUNLU_DATABASE_MAX_CONNECTIONS",
        "OZUNLU_DATABASE_TIMEOUT_SECS",
        "OZUNLU_STORAGE_BACKEND",
        "OZUNLU_SERVER_BIND_ADDRESS",
        "OZUNLU_SERVER_PORT",
        "PORT",
        "OZUNLU_SERVER_ALLOWED_ORIGIN",
        "OZUNLU_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "OZUNLU_CLIENT_BASE_URL",
        "OZUNLU_CLIENT_TIMEOUT_SECS",
        "OZUNLU_LOGGING_LEVEL",
        "OZUNLU_LOGGING_FORMAT",
        "OZUNLU_LOG_LEVEL",
        "OZUNLU_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
