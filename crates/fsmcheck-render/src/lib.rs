//! Violation sinks for CI surfaces (plain text, JUnit XML).

#![forbid(unsafe_code)]

mod junit;
mod sink;
mod text;

pub use junit::{JunitSink, report_path};
pub use sink::ViolationSink;
pub use text::TextSink;
