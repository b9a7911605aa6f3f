//! iDempiere WS Types - Core types for the "run process" web-service client
//!
//! The iDempiere `ModelADService` exposes a SOAP operation that executes a
//! configured server-side process on behalf of an authenticated user. This
//! crate holds everything that is shared between request building and
//! response classification:
//!
//! - **UserContext**: credentials plus tenant/org/role/warehouse identifiers
//! - **Parameter**: one named process parameter and its scalar value
//! - **WsError**: the complete failure taxonomy, construction and post-dispatch
//! - **XmlElement**: owned document tree with an escaping serializer and a
//!   well-formedness-checking parser
//!
//! Nothing here performs I/O.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod context;
pub mod document;
pub mod error;
pub mod param;

pub use context::UserContext;
pub use document::{escape_text, XmlElement, XmlParseError};
pub use error::{FailureKind, InvocationResult, WsError, WsResult};
pub use param::{ParamValue, Parameter, TruncationAdvisory, MAX_PARAM_LENGTH};
