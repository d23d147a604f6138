//! Client for the remote isolation check service.
//!
//! Layers, innermost first:
//! - [`Transport`]: executes one request and reports transport-level failures
//! - [`Retrying`]: re-executes transient failures according to a [`RetryPolicy`]
//! - [`AnalysisClient`]: the typed protocol operations
//!
//! A [`Connector`] hands out a fresh transport per check run; dropping it releases the
//! underlying connection pool.

#![forbid(unsafe_code)]

mod client;
mod error;
mod http;
mod retry;
mod transport;

pub use client::AnalysisClient;
pub use error::{ClientError, Operation, TransportError, TransportErrorKind};
pub use http::{HttpConnector, HttpSettings, HttpTransport};
pub use retry::{RetryPolicy, Retrying, is_transient_kind, is_transient_status};
pub use transport::{ApiRequest, ApiResponse, Body, Connector, Method, Transport};
