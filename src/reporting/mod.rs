//! Console reporting

pub mod report_writer;

pub use report_writer::{format_result, write_diagnostics, write_report, write_summary, Summary};
