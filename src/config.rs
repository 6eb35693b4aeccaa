//! Run configuration shared by the dispatcher and the reporter

use anyhow::Result;

/// Endpoint used when `-e` is not given; the key is appended verbatim.
pub const DEFAULT_ENDPOINT: &str = "https://api.opsgenie.com/v1/json/cloudwatch?apiKey=";

/// Immutable settings for one run, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub endpoint: String,
    pub workers: usize,
    pub show_invalid: bool,
    pub use_color: bool,
    pub debug: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            workers: 1,
            show_invalid: false,
            use_color: true,
            debug: false,
        }
    }
}

impl RunConfig {
    /// Reject settings the worker pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            anyhow::bail!("Worker count must be at least 1");
        }
        if self.endpoint.trim().is_empty() {
            anyhow::bail!("Endpoint must not be empty");
        }
        Ok(())
    }
}
