//! Mock code API and helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use al_sync::config::Mapping;
use al_sync::sync::RetryPolicy;
use al_sync::Config;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Form, Router};
use serde_json::Value;

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub form: HashMap<String, String>,
    pub headers: HeaderMap,
}

impl Recorded {
    pub fn arguments(&self) -> Value {
        serde_json::from_str(&self.form["arguments"]).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Behaviour knobs and recorded traffic.
#[derive(Default)]
pub struct MockState {
    pub saves: Mutex<Vec<Recorded>>,
    pub loads: Mutex<Vec<Recorded>>,
    /// Slot -> stored code.
    pub slots: Mutex<HashMap<String, String>>,
    /// Number of upcoming saves answered with HTTP 500.
    pub fail_saves: AtomicU32,
    /// Body returned by successful saves.
    pub save_body: Mutex<Option<String>>,
    /// Replaces the load reply: (status, body).
    pub load_reply: Mutex<Option<(u16, String)>>,
}

impl MockState {
    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn slot(&self, slot: &str) -> Option<String> {
        self.slots.lock().unwrap().get(slot).cloned()
    }
}

/// Mock Adventure Land code API on an ephemeral port.
pub struct MockApi {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .route("/api/save_code", post(save))
            .route("/api/load_code", post(load))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self, mappings: Vec<Mapping>) -> Config {
        Config {
            auth: "secret-cookie".to_string(),
            base_url: self.base_url(),
            timeout: Duration::from_secs(5),
            mappings,
            ..Config::default()
        }
    }
}

async fn save(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, String) {
    let recorded = Recorded { form, headers };
    let args = recorded.arguments();
    state.saves.lock().unwrap().push(recorded);

    let failing = state
        .fail_saves
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
    }

    let slot = args["slot"].as_str().unwrap_or_default().to_string();
    let code = args["code"].as_str().unwrap_or_default().to_string();
    state.slots.lock().unwrap().insert(slot, code);

    let body = state
        .save_body
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| r#"{"message":"Code saved"}"#.to_string());
    (StatusCode::OK, body)
}

async fn load(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, String) {
    let recorded = Recorded { form, headers };
    let args = recorded.arguments();
    state.loads.lock().unwrap().push(recorded);

    if let Some((status, body)) = state.load_reply.lock().unwrap().clone() {
        return (StatusCode::from_u16(status).unwrap(), body);
    }

    let slot = args["name"].as_str().unwrap_or_default();
    match state.slot(slot) {
        Some(code) => (StatusCode::OK, serde_json::to_string(&code).unwrap()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Retry policy with millisecond waits.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
        ..RetryPolicy::default()
    }
}

pub fn mapping(file: &Path, name: &str, slot: u32) -> Mapping {
    Mapping {
        file: file.to_path_buf(),
        name: name.to_string(),
        slot,
    }
}

/// In-memory log sink for asserting on emitted lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
