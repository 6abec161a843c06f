use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use crate::http_client::http_client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no response from server: {0}")]
    Network(String),
}

/// Seam between `ApiClient` and the wire. Production uses reqwest; tests
/// substitute a scripted transport.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, req: &ApiRequest) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Default)]
pub struct ReqwestTransport;

impl HttpTransport for ReqwestTransport {
    fn execute(&self, req: &ApiRequest) -> Result<RawResponse, TransportError> {
        let client = http_client().map_err(|err| TransportError::Network(err.to_string()))?;

        let mut builder = match req.method {
            Method::Get => client.get(&req.url),
            Method::Post => client.post(&req.url),
            Method::Put => client.put(&req.url),
        };
        builder = builder.header(ACCEPT, "application/json");
        if let Some(token) = req.bearer.as_deref() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = req.body.as_ref() {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let resp = builder
            .send()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Ok(RawResponse { status, body })
    }
}
