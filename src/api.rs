use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::http_cache::{ResponseCache, cache_key, is_cacheable_path};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, HttpTransport, Method, ReqwestTransport, TransportError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no response from server: {0}")]
    Network(String),

    #[error("http {status}: {message}")]
    Http {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("session expired")]
    SessionExpired,

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if (400..500).contains(status))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if *status >= 500)
    }

    /// What a toast shows. Validation messages come from the server; 5xx and
    /// decode failures collapse to a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            ApiError::Http { status, message, .. } if *status < 500 => message.clone(),
            ApiError::Http { .. } => "Something went wrong on the server. Try again.".to_string(),
            ApiError::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            ApiError::Decode(_) => "Something went wrong on the server. Try again.".to_string(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(msg) => ApiError::Network(msg),
        }
    }
}

// `{status: "success"|"error", data, message?, details?}` as sent by the
// backend around every payload.
#[derive(Debug, serde::Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    cache: ResponseCache,
    flights: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, clock: Clock) -> Self {
        Self::with_transport(config, clock.clone(), Arc::new(ReqwestTransport))
    }

    pub fn with_transport(
        config: &ClientConfig,
        clock: Clock,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            transport,
            session: SessionStore::in_memory(clock.clone()),
            cache: ResponseCache::new(config.cache_ttl_secs, clock),
            flights: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_session(mut self, session: SessionStore) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn response_cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        if !is_cacheable_path(path) {
            return self.request(Method::Get, path, query, None);
        }

        let key = cache_key(path, query);
        // Single-flight: one fetch per key at a time; late arrivals block on
        // the key lock and then read whatever the winner cached.
        let lock = self.flight_lock(&key);
        let _guard = lock.lock().expect("flight lock poisoned");

        if let Some(body) = self.cache.get(&key) {
            return decode_data(&body);
        }
        let body = self.request_raw(Method::Get, path, query, None)?;
        self.cache.put(&key, body.clone());
        decode_data(&body)
    }

    pub fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.request(Method::Post, path, &[], Some(value))
    }

    pub fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::Post, path, &[], None)
    }

    pub fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.request(Method::Put, path, &[], Some(value))
    }

    fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let raw = self.request_raw(method, path, query, body)?;
        decode_data(&raw)
    }

    // Runs the request and returns the unwrapped `data` payload as raw JSON
    // text, suitable for caching.
    fn request_raw(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<String, ApiError> {
        let url = self.build_url(path, query);
        let req = ApiRequest {
            method,
            url,
            bearer: self.session.token(),
            body,
        };
        let resp = self.transport.execute(&req)?;

        if resp.status == 401 {
            self.session.clear();
            return Err(ApiError::SessionExpired);
        }

        let envelope = parse_envelope(&resp.body);
        let ok_status = (200..300).contains(&resp.status);
        match envelope {
            Some(env) if ok_status && env.status == "success" => Ok(env.data.to_string()),
            Some(env) => Err(ApiError::Http {
                status: resp.status,
                message: env
                    .message
                    .unwrap_or_else(|| format!("request failed ({})", resp.status)),
                details: env.details,
            }),
            None if ok_status => Err(ApiError::Decode(format!(
                "response is not a valid envelope: {}",
                truncate(&resp.body, 120)
            ))),
            None => Err(ApiError::Http {
                status: resp.status,
                message: format!("request failed ({})", resp.status),
                details: None,
            }),
        }
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if !query.is_empty() {
            url.push('?');
            for (idx, (name, value)) in query.iter().enumerate() {
                if idx > 0 {
                    url.push('&');
                }
                url.push_str(name);
                url.push('=');
                url.push_str(value);
            }
        }
        url
    }

    fn flight_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut flights = self.flights.lock().expect("flights lock poisoned");
        flights
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn parse_envelope(raw: &str) -> Option<Envelope> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn decode_data<T: DeserializeOwned>(data: &str) -> Result<T, ApiError> {
    serde_json::from_str(data).map_err(|err| ApiError::Decode(err.to_string()))
}

fn truncate(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}
