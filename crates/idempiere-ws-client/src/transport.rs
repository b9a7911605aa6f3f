//! HTTP transport seam

use crate::config::ClientConfig;
use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::warn;

/// Content type required by the SOAP 1.1 endpoint
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Outbound HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// POST of a SOAP document with the SOAP content type
    pub fn soap_post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), SOAP_CONTENT_TYPE.to_string())],
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response as seen by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, empty when unknown
    pub status_message: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, status_message: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_message: status_message.into(),
            body: body.into(),
        }
    }
}

/// No response could be obtained (connection, DNS, TLS, timeout, body read)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Input of the response classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    Failed(TransportFailure),
    Responded(HttpResponse),
}

impl From<Result<HttpResponse, TransportFailure>> for TransportOutcome {
    fn from(result: Result<HttpResponse, TransportFailure>) -> Self {
        match result {
            Ok(response) => TransportOutcome::Responded(response),
            Err(failure) => TransportOutcome::Failed(failure),
        }
    }
}

/// Performs one request/response exchange.
///
/// Implementations must not retry and must not follow redirects: a 302 is a
/// meaningful answer for this protocol.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportFailure> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| TransportFailure::new(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client. Its redirect policy is used as is.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self.client.request(request.method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportFailure::new(error_chain(&e)))?;

        let status = response.status();
        let status_message = reason_phrase(&response)
            .or_else(|| status.canonical_reason())
            .unwrap_or_default()
            .to_string();

        // Once a status line arrived the exchange is a response; a body cut
        // short is left to classification.
        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        status = status.as_u16(),
                        received = body.len(),
                        error = %error_chain(&e),
                        "Response body incomplete"
                    );
                    break;
                }
            }
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            status_message,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Reason phrase as sent by the server, when it differs from the canonical one
fn reason_phrase(response: &Response) -> Option<&str> {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
}

fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // hyper and reqwest often repeat their cause in Display
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
