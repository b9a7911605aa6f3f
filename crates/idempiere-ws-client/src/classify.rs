//! Response classification
//!
//! Maps one [`TransportOutcome`] to exactly one [`InvocationResult`]. The
//! checks run in a fixed order and the first match wins:
//!
//! 1. no response at all: `Transport`
//! 2. HTTP 404: `EndpointNotFound`, whatever the body says
//! 3. any status other than 200/302: SOAP fault handling
//!    (`MalformedFault`, `ProtocolFault` or `UnrecognizedFault`)
//! 4. 200/302: run-process result handling
//!    (`MalformedResponse`, `UnexpectedShape`, `Business` or the summary)
//!
//! The service signals business failures inside a successful HTTP exchange,
//! which is why transport and HTTP layers are consulted first.

use crate::transport::{HttpResponse, TransportOutcome};
use idempiere_ws_types::{InvocationResult, WsError, XmlElement};

/// 302 is how some deployments answer a completed run
const SUCCESS_STATUSES: [u16; 2] = [200, 302];
const NOT_FOUND: u16 = 404;

const FAULT_STRING_PATH: [&str; 4] = ["Envelope", "Body", "Fault", "faultstring"];
const RESULT_PATH: [&str; 4] = ["Envelope", "Body", "runProcessResponse", "RunProcessResponse"];

/// Classify a transport outcome. Pure; the same outcome always yields the
/// same result.
pub fn classify(outcome: &TransportOutcome) -> InvocationResult {
    match outcome {
        TransportOutcome::Failed(failure) => Err(WsError::Transport(failure.message.clone())),
        TransportOutcome::Responded(response) => classify_response(response),
    }
}

fn classify_response(response: &HttpResponse) -> InvocationResult {
    if response.status == NOT_FOUND {
        return Err(WsError::EndpointNotFound {
            status: response.status,
            message: response.status_message.clone(),
        });
    }

    if !SUCCESS_STATUSES.contains(&response.status) {
        return Err(classify_fault(&response.body));
    }

    classify_run_process(&response.body)
}

fn classify_fault(body: &str) -> WsError {
    let document = match XmlElement::parse(body) {
        Ok(document) => document,
        Err(_) => return WsError::MalformedFault(body.to_string()),
    };

    match document.select(&FAULT_STRING_PATH) {
        Some(faultstring) => WsError::ProtocolFault(faultstring.text().trim().to_string()),
        None => WsError::UnrecognizedFault(document),
    }
}

fn classify_run_process(body: &str) -> InvocationResult {
    let document =
        XmlElement::parse(body).map_err(|_| WsError::MalformedResponse(body.to_string()))?;

    match RunProcessVerdict::extract(&document) {
        Some(RunProcessVerdict::Completed(summary)) => Ok(summary),
        Some(RunProcessVerdict::Failed(message)) => Err(WsError::Business(message)),
        None => Err(WsError::UnexpectedShape(document)),
    }
}

/// Typed view of `RunProcessResponse`
#[derive(Debug, Clone, PartialEq, Eq)]
enum RunProcessVerdict {
    Completed(String),
    Failed(String),
}

impl RunProcessVerdict {
    /// `None` when the result node, its `IsError` flag, or the child the
    /// flag selects is missing.
    fn extract(document: &XmlElement) -> Option<Self> {
        let result = document.select(&RESULT_PATH)?;
        // exact, case-sensitive comparison
        if result.attribute("IsError")? == "true" {
            let message = result.child("Error")?.text().trim().to_string();
            Some(RunProcessVerdict::Failed(message))
        } else {
            let summary = result.child("Summary")?.text().trim().to_string();
            Some(RunProcessVerdict::Completed(summary))
        }
    }
}
