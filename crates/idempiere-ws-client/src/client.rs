//! Run-process invocation

use crate::classify::classify;
use crate::config::ClientConfig;
use crate::envelope::{endpoint_url, EnvelopeBuilder, RequestEnvelope};
use crate::observer::{InvocationEvent, InvocationObserver, TracingObserver};
use crate::transport::{
    HttpRequest, ReqwestTransport, Transport, TransportFailure, TransportOutcome,
};
use idempiere_ws_types::{InvocationResult, Parameter, UserContext, WsError, WsResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Client for one iDempiere server.
///
/// Holds no per-call state; a single instance can serve concurrent calls.
pub struct ProcessClient<T = ReqwestTransport> {
    server: String,
    transport: T,
    builder: EnvelopeBuilder,
    observer: Arc<dyn InvocationObserver>,
}

impl ProcessClient<ReqwestTransport> {
    /// Create a client with the `reqwest` transport described by `config`
    pub fn new(config: &ClientConfig) -> Result<Self, TransportFailure> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(&config.server, transport).with_locale(config.locale.as_str()))
    }
}

impl<T: Transport> ProcessClient<T> {
    pub fn with_transport(server: &str, transport: T) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            transport,
            builder: EnvelopeBuilder::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.builder = self.builder.with_locale(locale);
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn endpoint(&self) -> String {
        endpoint_url(&self.server)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the envelope this client would send, without sending it
    pub fn envelope(
        &self,
        process_name: &str,
        ctx: &UserContext,
        params: &[Parameter],
    ) -> WsResult<RequestEnvelope> {
        self.builder.build(&self.server, process_name, ctx, params)
    }

    /// Run `process_name` and return its summary or the classified failure.
    pub async fn invoke_process(
        &self,
        process_name: &str,
        ctx: &UserContext,
        params: &[Parameter],
    ) -> InvocationResult {
        match self.envelope(process_name, ctx, params) {
            Ok(envelope) => self.dispatch(process_name, params.len(), envelope).await,
            Err(error) => Err(self.reject(process_name, error)),
        }
    }

    /// Like [`Self::invoke_process`] for loosely-typed context and
    /// parameters. Validation errors are returned without touching the
    /// transport.
    pub async fn invoke_process_value(
        &self,
        process_name: &str,
        ctx: &Value,
        params: &Value,
    ) -> InvocationResult {
        let validated = UserContext::from_value(ctx)
            .and_then(|ctx| Parameter::list_from_value(params).map(|params| (ctx, params)));

        match validated {
            Ok((ctx, params)) => self.invoke_process(process_name, &ctx, &params).await,
            Err(error) => Err(self.reject(process_name, error)),
        }
    }

    fn reject(&self, process_name: &str, error: WsError) -> WsError {
        self.observer.on_event(&InvocationEvent::Rejected {
            process: process_name.to_string(),
            error: error.clone(),
        });
        error
    }

    async fn dispatch(
        &self,
        process_name: &str,
        parameters: usize,
        envelope: RequestEnvelope,
    ) -> InvocationResult {
        let (endpoint, document, advisories) = envelope.into_parts();

        for advisory in advisories {
            self.observer.on_event(&InvocationEvent::TruncationAdvisory {
                process: process_name.to_string(),
                advisory,
            });
        }

        self.observer.on_event(&InvocationEvent::Dispatching {
            process: process_name.to_string(),
            endpoint: endpoint.clone(),
            parameters,
        });

        let started = Instant::now();
        let outcome = TransportOutcome::from(
            self.transport
                .send(HttpRequest::soap_post(endpoint.as_str(), document))
                .await,
        );
        let result = classify(&outcome);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.observer.on_event(&InvocationEvent::Completed {
            process: process_name.to_string(),
            endpoint,
            result: result.clone(),
            elapsed_ms,
        });

        result
    }
}

/// One-shot invocation with a default `reqwest` transport for `server`.
pub async fn invoke_process(
    server: &str,
    process_name: &str,
    ctx: &UserContext,
    params: &[Parameter],
) -> InvocationResult {
    let client = ProcessClient::new(&ClientConfig::for_server(server))
        .map_err(|failure| WsError::Transport(failure.message))?;
    client.invoke_process(process_name, ctx, params).await
}
