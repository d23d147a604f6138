//! Shared test utilities for the fsmcheck workspace.
//!
//! Two ways to fake the isolation check service:
//! - [`StubServer`] listens on a real local port, for tests that go through HTTP
//! - [`ScriptedService`] plugs in as a [`fsmcheck_client::Connector`] and never touches the network
//!
//! Both answer from the same [`ServiceFixture`].

mod fixture;
mod scripted;
mod stub_server;

pub use fixture::ServiceFixture;
pub use scripted::{Fault, ScriptedHandle, ScriptedService};
pub use stub_server::{RecordedRequest, StubResponse, StubServer};
