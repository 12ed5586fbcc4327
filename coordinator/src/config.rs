//! Command line and environment configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use shared::StoreLayout;
use shared::store::DEFAULT_STORE_DIR;

use crate::core::{SubmissionSettings, WaitPolicy};
use crate::error::{CoordinatorError, CoordinatorResult};

/// Longest accepted wait ceiling (one week)
pub const MAX_WAIT_CEILING_SECS: u64 = 7 * 24 * 60 * 60;

/// Sequential indices travel as signed integers on the wire
pub const MAX_TOTAL_SAMPLES: u64 = i64::MAX as u64;

/// Every flag can also be set through the environment (or a `.env` file)
#[derive(Parser, Debug, Clone)]
#[command(name = "coordinator")]
#[command(about = "Hands generation jobs to a file-watching worker and waits for the results")]
pub struct CoordinatorConfig {
    /// Address to bind the HTTP API to
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the HTTP API
    #[arg(long, env = "API_PORT", default_value_t = 8081)]
    pub port: u16,

    /// Directory shared with the worker
    #[arg(long, env = "STORE_DIR", default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,

    /// Interval between result checks, in milliseconds
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Maximum time to wait for a result, in seconds
    #[arg(long, env = "MAX_WAIT_SECS", default_value_t = 30_000)]
    pub max_wait_secs: u64,

    /// Number of sequential samples available
    #[arg(long, env = "TOTAL_SAMPLES", default_value_t = 1000)]
    pub total_samples: u64,

    /// Keys every custom_params mapping must contain (comma separated)
    #[arg(long, env = "REQUIRED_CUSTOM_FIELDS", value_delimiter = ',')]
    pub required_custom_fields: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl CoordinatorConfig {
    pub fn validate(&self) -> CoordinatorResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(CoordinatorError::config("poll_interval_ms", "must be greater than zero"));
        }
        if self.max_wait_secs == 0 {
            return Err(CoordinatorError::config("max_wait_secs", "must be greater than zero"));
        }
        if self.max_wait_secs > MAX_WAIT_CEILING_SECS {
            return Err(CoordinatorError::config(
                "max_wait_secs",
                format!("must not exceed {MAX_WAIT_CEILING_SECS} seconds"),
            ));
        }
        if self.total_samples > MAX_TOTAL_SAMPLES {
            return Err(CoordinatorError::config(
                "total_samples",
                format!("must not exceed {MAX_TOTAL_SAMPLES}"),
            ));
        }
        if self.poll_interval() > self.max_wait() {
            return Err(CoordinatorError::config(
                "poll_interval_ms",
                format!(
                    "{}ms exceeds the wait ceiling of {}s",
                    self.poll_interval_ms, self.max_wait_secs
                ),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> CoordinatorResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| CoordinatorError::config("host", format!("Invalid bind address: {e}")))
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(self.store_dir.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn submission_settings(&self) -> SubmissionSettings {
        let required_custom_fields = self
            .required_custom_fields
            .iter()
            .map(|field| field.trim())
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();

        SubmissionSettings {
            total_samples: self.total_samples,
            required_custom_fields,
            wait: WaitPolicy::new(self.poll_interval(), self.max_wait()),
        }
    }
}
