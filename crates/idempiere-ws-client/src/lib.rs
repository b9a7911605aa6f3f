//! iDempiere WS Client - run a server-side process through `ModelADService`
//!
//! A call goes through three steps:
//!
//! 1. [`envelope`] builds the SOAP request from the process name, the user
//!    context and the parameters (pure, escaping every value)
//! 2. a [`Transport`] performs the single HTTP round trip
//! 3. [`classify`] turns the transport outcome into the process summary or
//!    exactly one classified [`WsError`]
//!
//! [`ProcessClient`] wires the steps together and reports what happened to
//! an [`InvocationObserver`]. There are no retries; the caller decides.
//!
//! ```no_run
//! use idempiere_ws_client::{invoke_process, Parameter, UserContext};
//!
//! # async fn run() -> Result<(), idempiere_ws_client::WsError> {
//! let ctx = UserContext::new("SuperUser", "System", 11, 0)?.with_role(102);
//! let params = vec![Parameter::new("C_Order_ID", 1000123)];
//! let summary = invoke_process("https://erp.example.com", "CompleteOrder", &ctx, &params).await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod classify;
pub mod client;
pub mod config;
pub mod envelope;
pub mod observer;
pub mod transport;

pub use classify::classify;
pub use client::{invoke_process, ProcessClient};
pub use config::ClientConfig;
pub use envelope::{build, build_from_value, EnvelopeBuilder, RequestEnvelope, SERVICE_PATH};
pub use observer::{InvocationEvent, InvocationObserver, NoopObserver, TracingObserver};
pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportFailure, TransportOutcome,
};

pub use idempiere_ws_types::{
    FailureKind, InvocationResult, ParamValue, Parameter, TruncationAdvisory, UserContext,
    WsError, WsResult, XmlElement,
};
