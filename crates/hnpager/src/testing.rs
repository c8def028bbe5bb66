//! In-process stand-in for the Hacker News API used by the tests
//!
//! Serves `/{collection}.json` and `/item/{id}.json` from in-memory maps and
//! can delay or fail individual items. Unknown items are answered with
//! `null`, as the real API does.

use crate::resolver::Resolver;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use hnpager_core::ResolverConfig;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Default)]
struct FakeHn {
    collections: Mutex<HashMap<String, Value>>,
    failing_collections: Mutex<HashSet<String>>,
    items: Mutex<HashMap<u64, Value>>,
    delays: Mutex<HashMap<u64, Duration>>,
    failing: Mutex<HashSet<u64>>,
    completed: Mutex<Vec<u64>>,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a FakeHn);

impl<'a> InFlight<'a> {
    fn enter(state: &'a FakeHn) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FakeServer {
    state: Arc<FakeHn>,
    base: String,
    handle: JoinHandle<()>,
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(FakeHn::default());

        let app = Router::new()
            .route("/item/{file}", get(item_handler))
            .route("/{file}", get(collection_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().expect("fake server address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake server");
        });

        Self {
            state,
            base: format!("http://{addr}"),
            handle,
        }
    }

    pub fn config(&self) -> ResolverConfig {
        ResolverConfig {
            api_base: self.base.clone(),
            timeout_secs: 20,
            ..ResolverConfig::default()
        }
    }

    pub fn resolver(&self) -> Resolver {
        self.resolver_with(|_| {})
    }

    pub fn resolver_with(&self, tweak: impl FnOnce(&mut ResolverConfig)) -> Resolver {
        let mut config = self.config();
        tweak(&mut config);
        Resolver::new(config).expect("resolver for fake server")
    }

    pub fn set_collection(&self, endpoint: &str, ids: &[u64]) {
        self.set_raw_collection(endpoint, json!(ids));
    }

    pub fn set_raw_collection(&self, endpoint: &str, body: Value) {
        self.state
            .collections
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), body);
    }

    pub fn fail_collection(&self, endpoint: &str) {
        self.state
            .failing_collections
            .lock()
            .unwrap()
            .insert(endpoint.to_string());
    }

    pub fn add_story(&self, id: u64) {
        self.add_story_with_kids(id, &[]);
    }

    pub fn add_story_with_kids(&self, id: u64, kids: &[u64]) {
        self.add_raw_item(
            id,
            json!({
                "id": id,
                "type": "story",
                "by": format!("author{id}"),
                "time": 1609459200u64 + id,
                "title": format!("Story {id}"),
                "score": id * 10,
                "descendants": kids.len(),
                "kids": kids,
                "url": format!("https://example.com/{id}"),
            }),
        );
    }

    pub fn add_comment(&self, id: u64, parent: u64, kids: &[u64]) {
        self.add_raw_item(
            id,
            json!({
                "id": id,
                "type": "comment",
                "by": format!("commenter{id}"),
                "time": 1609459200u64 + id,
                "parent": parent,
                "text": format!("<p>Comment {id}</p>"),
                "kids": kids,
            }),
        );
    }

    pub fn add_raw_item(&self, id: u64, body: Value) {
        self.state.items.lock().unwrap().insert(id, body);
    }

    pub fn delay(&self, id: u64, delay: Duration) {
        self.state.delays.lock().unwrap().insert(id, delay);
    }

    pub fn fail(&self, id: u64) {
        self.state.failing.lock().unwrap().insert(id);
    }

    pub fn recover(&self, id: u64) {
        self.state.failing.lock().unwrap().remove(&id);
    }

    /// Requests received so far, collections and items alike
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Item ids in the order their responses were produced
    pub fn completion_order(&self) -> Vec<u64> {
        self.state.completed.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

async fn collection_handler(
    State(state): State<Arc<FakeHn>>,
    Path(file): Path<String>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let Some(endpoint) = file.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if state.failing_collections.lock().unwrap().contains(endpoint) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let body = state
        .collections
        .lock()
        .unwrap()
        .get(endpoint)
        .cloned()
        .unwrap_or_else(|| json!([]));

    Json(body).into_response()
}

async fn item_handler(State(state): State<Arc<FakeHn>>, Path(file): Path<String>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let Some(id) = file
        .strip_suffix(".json")
        .and_then(|raw| raw.parse::<u64>().ok())
    else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let _in_flight = InFlight::enter(&state);

    let delay = state.delays.lock().unwrap().get(&id).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    state.completed.lock().unwrap().push(id);

    if state.failing.lock().unwrap().contains(&id) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let body = state
        .items
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or(Value::Null);

    Json(body).into_response()
}
