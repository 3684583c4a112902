//! Scripted port implementations shared by unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clipper_domain::HttpMethod;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::auth::TokenStore;
use crate::client::ApiClient;
use crate::ports::{
    Clock, DataCache, HttpTransport, Navigator, TransportFuture, TransportRequest,
    TransportResponse,
};

pub const BASE: &str = "http://shop.test/api";

pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Answers fixed responses by method and path; unknown routes get 404.
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<(HttpMethod, String), TransportResponse>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, method: HttpMethod, path: &str, status: u16, body: &Value) {
        let response = TransportResponse::new(status, serde_json::to_vec(body).unwrap());
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
    }

    pub fn ok(&self, method: HttpMethod, path: &str, data: &Value) {
        self.route(
            method,
            path,
            200,
            &json!({"success": true, "data": data, "timestamp": "t"}),
        );
    }

    pub fn recorded(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        let url = format!("{BASE}{path}");
        self.recorded()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

impl HttpTransport for StubTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let path = request
                .url
                .strip_prefix(BASE)
                .unwrap_or(&request.url)
                .to_string();
            let response = self
                .routes
                .lock()
                .unwrap()
                .get(&(request.method, path))
                .cloned()
                .unwrap_or_else(|| {
                    TransportResponse::new(
                        404,
                        serde_json::to_vec(&json!({"success": false, "error": "Not found"}))
                            .unwrap(),
                    )
                });
            self.requests.lock().unwrap().push(request);
            Ok(response)
        })
    }
}

pub fn client(transport: Arc<StubTransport>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(
        BASE,
        transport,
        TokenStore::new(Arc::new(WallClock)),
    ))
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Value>>,
    epoch: AtomicU64,
}

impl MemoryCache {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DataCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn put(&self, key: &str, value: Value) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    async fn invalidate_prefix(&self, prefix: &str) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .retain(|key, _| !key.starts_with(prefix));
    }

    async fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().clear();
    }
}

/// Counts trips to the login page and wakes anyone waiting for one.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<usize>,
    notify: Notify,
}

impl RecordingNavigator {
    pub fn visits(&self) -> usize {
        *self.visits.lock().unwrap()
    }

    pub async fn wait(&self) {
        tokio::time::timeout(std::time::Duration::from_secs(2), self.notify.notified())
            .await
            .expect("navigator was never called");
    }
}

impl Navigator for RecordingNavigator {
    fn to_login(&self) {
        *self.visits.lock().unwrap() += 1;
        self.notify.notify_one();
    }
}
