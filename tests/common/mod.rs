#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use predictpool_client::api::ApiClient;
use predictpool_client::clock::Clock;
use predictpool_client::config::ClientConfig;
use predictpool_client::transport::{
    ApiRequest, HttpTransport, Method, RawResponse, TransportError,
};
use serde_json::{Value, json};
use std::sync::Arc;

struct Route {
    method: Method,
    path: String,
    status: u16,
    body: String,
}

/// Scripted stand-in for the wire: canned responses per (method, path),
/// a call counter, and an optional artificial latency for races.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    hits: Mutex<Vec<String>>,
    bearers: Mutex<Vec<Option<String>>>,
    pub calls: AtomicUsize,
    pub latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: String) {
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            status,
            body,
        });
    }

    pub fn on_success(&self, method: Method, path: &str, data: Value) {
        self.on(method, path, 200, success_body(data));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn hit_urls(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn seen_bearers(&self) -> Vec<Option<String>> {
        self.bearers.lock().unwrap().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, req: &ApiRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hits.lock().unwrap().push(req.url.clone());
        self.bearers.lock().unwrap().push(req.bearer.clone());
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let routes = self.routes.lock().unwrap();
        let found = routes
            .iter()
            .find(|route| route.method == req.method && req.url.contains(&route.path));
        match found {
            Some(route) => Ok(RawResponse {
                status: route.status,
                body: route.body.clone(),
            }),
            None => Ok(RawResponse {
                status: 404,
                body: error_body("not found"),
            }),
        }
    }
}

pub fn success_body(data: Value) -> String {
    json!({"status": "success", "data": data}).to_string()
}

pub fn error_body(message: &str) -> String {
    json!({"status": "error", "data": null, "message": message}).to_string()
}

pub fn frozen_clock() -> Clock {
    // A Friday afternoon, mid-season.
    Clock::fixed(Utc.with_ymd_and_hms(2025, 10, 3, 12, 0, 0).unwrap())
}

pub fn test_client(transport: Arc<ScriptedTransport>, clock: Clock) -> ApiClient {
    let config = ClientConfig {
        api_base: "http://test.local/api".to_string(),
        ..ClientConfig::default()
    };
    ApiClient::with_transport(&config, clock, transport)
}
