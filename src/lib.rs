//! API Key Validator Library
//!
//! Validates API keys against an HTTP endpoint using a fixed pool of worker threads.

pub mod config;
pub mod core;
pub mod scanner;
pub mod reporting;

pub use core::validator;
pub use core::worker_pool;
pub use scanner::key_loader;
pub use reporting::report_writer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{RunConfig, DEFAULT_ENDPOINT};
    pub use crate::core::validator::{
        HttpTransport, Probe, Transport, TransportError, ValidationResult, Validator,
        FAILURE_MARKER,
    };
    pub use crate::core::worker_pool::{dispatch, dispatch_with_progress};
    pub use crate::scanner::key_loader::{collect_keys, parse_keys};
    pub use crate::reporting::report_writer::{
        format_result, write_diagnostics, write_report, write_summary, Summary,
    };
}
