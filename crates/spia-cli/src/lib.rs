//! Library side of the `spia` binary, shared with integration tests.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
