//! Error taxonomy for process invocations

use crate::document::XmlElement;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Every way a process invocation can fail.
///
/// The first four variants are raised while building the request and never
/// reach the network. The rest are produced by response classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WsError {
    /// User context absent or not an object
    #[error("Invalid user context: {0}")]
    InvalidContext(String),

    /// Username or password missing or empty
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Client/org (or a present role/warehouse) identifier missing or not an integer
    #[error("Missing or non-numeric identifier: {0}")]
    MissingIdentifier(String),

    /// Parameter list is not a sequence of well-formed entries
    #[error("Invalid parameter list: {0}")]
    InvalidParameterList(String),

    /// No HTTP response was obtained
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service path does not exist on the server
    #[error("Endpoint not found: {status} {message}")]
    EndpointNotFound {
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        message: String,
    },

    /// Error status with a body that is not well-formed XML
    #[error("Malformed fault body: {}", excerpt(.0))]
    MalformedFault(String),

    /// Standard SOAP fault
    #[error("Protocol fault: {0}")]
    ProtocolFault(String),

    /// Error status with well-formed XML lacking a SOAP fault
    #[error("Unrecognized fault document <{}>", root_name(.0))]
    UnrecognizedFault(XmlElement),

    /// Success status with a body that is not well-formed XML
    #[error("Malformed response body: {}", excerpt(.0))]
    MalformedResponse(String),

    /// Well-formed response missing the run-process result fields
    #[error("Unexpected response shape <{}>", root_name(.0))]
    UnexpectedShape(XmlElement),

    /// The server ran the request and reported IsError="true"
    #[error("Business error: {0}")]
    Business(String),
}

/// Result type for a single invocation: the process summary or a classified error
pub type InvocationResult = Result<String, WsError>;

/// Result type alias for fallible operations in this workspace
pub type WsResult<T> = Result<T, WsError>;

/// Flat discriminant of [`WsError`], suitable for reports and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidContext,
    MissingCredential,
    MissingIdentifier,
    InvalidParameterList,
    TransportError,
    EndpointNotFound,
    MalformedFault,
    ProtocolFault,
    UnrecognizedFault,
    MalformedResponse,
    UnexpectedShape,
    BusinessError,
}

impl FailureKind {
    /// Whether the failure is raised before anything is sent
    pub fn is_construction(self) -> bool {
        matches!(
            self,
            FailureKind::InvalidContext
                | FailureKind::MissingCredential
                | FailureKind::MissingIdentifier
                | FailureKind::InvalidParameterList
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::InvalidContext => "InvalidContext",
            FailureKind::MissingCredential => "MissingCredential",
            FailureKind::MissingIdentifier => "MissingIdentifier",
            FailureKind::InvalidParameterList => "InvalidParameterList",
            FailureKind::TransportError => "TransportError",
            FailureKind::EndpointNotFound => "EndpointNotFound",
            FailureKind::MalformedFault => "MalformedFault",
            FailureKind::ProtocolFault => "ProtocolFault",
            FailureKind::UnrecognizedFault => "UnrecognizedFault",
            FailureKind::MalformedResponse => "MalformedResponse",
            FailureKind::UnexpectedShape => "UnexpectedShape",
            FailureKind::BusinessError => "BusinessError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WsError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WsError::InvalidContext(_) => FailureKind::InvalidContext,
            WsError::MissingCredential(_) => FailureKind::MissingCredential,
            WsError::MissingIdentifier(_) => FailureKind::MissingIdentifier,
            WsError::InvalidParameterList(_) => FailureKind::InvalidParameterList,
            WsError::Transport(_) => FailureKind::TransportError,
            WsError::EndpointNotFound { .. } => FailureKind::EndpointNotFound,
            WsError::MalformedFault(_) => FailureKind::MalformedFault,
            WsError::ProtocolFault(_) => FailureKind::ProtocolFault,
            WsError::UnrecognizedFault(_) => FailureKind::UnrecognizedFault,
            WsError::MalformedResponse(_) => FailureKind::MalformedResponse,
            WsError::UnexpectedShape(_) => FailureKind::UnexpectedShape,
            WsError::Business(_) => FailureKind::BusinessError,
        }
    }

    pub fn is_construction(&self) -> bool {
        self.kind().is_construction()
    }

    /// Full diagnostic payload.
    ///
    /// Raw bodies are returned untruncated and parsed documents are
    /// re-serialized, unlike the `Display` form which only shows an excerpt.
    pub fn detail(&self) -> String {
        match self {
            WsError::InvalidContext(detail)
            | WsError::MissingCredential(detail)
            | WsError::MissingIdentifier(detail)
            | WsError::InvalidParameterList(detail)
            | WsError::Transport(detail)
            | WsError::MalformedFault(detail)
            | WsError::ProtocolFault(detail)
            | WsError::MalformedResponse(detail)
            | WsError::Business(detail) => detail.clone(),
            WsError::EndpointNotFound { status, message } => format!("{} {}", status, message),
            WsError::UnrecognizedFault(document) | WsError::UnexpectedShape(document) => {
                document.to_xml_string()
            }
        }
    }
}

const EXCERPT_CHARS: usize = 200;

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head)
}

fn root_name(document: &XmlElement) -> &str {
    &document.name
}
