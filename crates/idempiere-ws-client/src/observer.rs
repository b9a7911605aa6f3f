//! Observer hook for invocation events
//!
//! The library never prints. Everything worth reporting about a call is
//! handed to an [`InvocationObserver`]; the default one forwards to
//! `tracing`.

use idempiere_ws_types::{InvocationResult, TruncationAdvisory, WsError};
use tracing::{debug, info, warn};

/// Something that happened during one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationEvent {
    /// Request was rejected before anything was built or sent
    Rejected { process: String, error: WsError },

    /// A parameter value is longer than the remote column (non-fatal)
    TruncationAdvisory {
        process: String,
        advisory: TruncationAdvisory,
    },

    /// Request is about to be sent
    Dispatching {
        process: String,
        endpoint: String,
        parameters: usize,
    },

    /// Classified outcome of the exchange
    Completed {
        process: String,
        endpoint: String,
        result: InvocationResult,
        elapsed_ms: u64,
    },
}

/// Receives [`InvocationEvent`]s. Must not block.
pub trait InvocationObserver: Send + Sync {
    fn on_event(&self, event: &InvocationEvent);
}

impl<F> InvocationObserver for F
where
    F: Fn(&InvocationEvent) + Send + Sync,
{
    fn on_event(&self, event: &InvocationEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl InvocationObserver for NoopObserver {
    fn on_event(&self, _event: &InvocationEvent) {}
}

/// Emits structured `tracing` records. Never logs credentials or the
/// request document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl InvocationObserver for TracingObserver {
    fn on_event(&self, event: &InvocationEvent) {
        match event {
            InvocationEvent::Rejected { process, error } => {
                warn!(
                    process = %process,
                    kind = %error.kind(),
                    error = %error,
                    "Run-process request rejected before dispatch"
                );
            }
            InvocationEvent::TruncationAdvisory { process, advisory } => {
                warn!(
                    process = %process,
                    column = %advisory.column,
                    length = advisory.length,
                    limit = advisory.limit,
                    "Possible data loss in process parameter"
                );
            }
            InvocationEvent::Dispatching {
                process,
                endpoint,
                parameters,
            } => {
                debug!(
                    process = %process,
                    endpoint = %endpoint,
                    parameters = *parameters,
                    "Dispatching run-process request"
                );
            }
            InvocationEvent::Completed {
                process,
                endpoint,
                result,
                elapsed_ms,
            } => match result {
                Ok(_) => {
                    info!(
                        process = %process,
                        endpoint = %endpoint,
                        elapsed_ms = *elapsed_ms,
                        "Process completed"
                    );
                }
                Err(error) => {
                    warn!(
                        process = %process,
                        endpoint = %endpoint,
                        elapsed_ms = *elapsed_ms,
                        kind = %error.kind(),
                        error = %error,
                        "Process invocation failed"
                    );
                    debug!(process = %process, detail = %error.detail(), "Failure detail");
                }
            },
        }
    }
}
