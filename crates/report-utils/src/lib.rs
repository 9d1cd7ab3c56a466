//! Shared utilities for stock-report
//!
//! Holds the ambient setup shared by the workspace binaries, currently the
//! tracing subscriber.

pub mod logging;

pub use logging::{init_tracing, init_tracing_with_default};
