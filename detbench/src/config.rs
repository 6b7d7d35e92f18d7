//! Configuration management
//!
//! Environment variable helpers (with fallback to deprecated names) and the
//! immutable [`BenchmarkConfig`] handed to the harness at run start.

use crate::common::error::{CommonError, CommonResult};
use crate::compress::CompressionParams;
use crate::runtime::http::default_base_url;
use crate::types::EndpointIdentity;
use std::path::PathBuf;
use std::time::Duration;

/// Default frame pacing interval (seconds)
pub const DEFAULT_INTERVAL_SECS: f64 = 0.5;

/// Default region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default number of warm-up calls per endpoint
pub const DEFAULT_WARMUP_COUNT: u32 = 3;

/// Default image folder
pub const DEFAULT_IMAGE_FOLDER: &str = "test_images";

/// Measurement call timeout; generous so cold starts surface as latency, not errors
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 300;

const DEFAULT_WARMUP_TIMEOUT_SECS: u64 = 300;

const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 10;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use detbench::config::get_env_with_fallback;
///
/// let level = get_env_with_fallback("DETBENCH_LOG_LEVEL", "RUST_LOG");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        if new_name != old_name {
            tracing::warn!(
                "Environment variable '{}' is deprecated, use '{}' instead",
                old_name,
                new_name
            );
        }
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` when neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Convert a payload ceiling given in MB (1024 * 1024 bytes) to bytes.
pub fn ceiling_from_mb(megabytes: f64) -> CommonResult<u64> {
    if !megabytes.is_finite() || megabytes <= 0.0 {
        return Err(CommonError::Validation(format!(
            "payload ceiling must be a positive number of MB (got {})",
            megabytes
        )));
    }
    Ok((megabytes * 1024.0 * 1024.0).round() as u64)
}

/// Per-call timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Measurement call timeout
    pub probe: Duration,
    /// Warm-up call timeout
    pub warmup: Duration,
    /// Health query timeout
    pub health: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            warmup: Duration::from_secs(DEFAULT_WARMUP_TIMEOUT_SECS),
            health: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    /// Load timeouts from environment variables.
    pub fn from_env() -> Self {
        let probe = get_env_with_fallback_parse(
            "DETBENCH_PROBE_TIMEOUT_SECS",
            "PROBE_TIMEOUT_SECS",
            DEFAULT_PROBE_TIMEOUT_SECS,
        );
        let warmup = get_env_with_fallback_parse(
            "DETBENCH_WARMUP_TIMEOUT_SECS",
            "WARMUP_TIMEOUT_SECS",
            DEFAULT_WARMUP_TIMEOUT_SECS,
        );
        let health = get_env_with_fallback_parse(
            "DETBENCH_HEALTH_TIMEOUT_SECS",
            "HEALTH_TIMEOUT_SECS",
            DEFAULT_HEALTH_TIMEOUT_SECS,
        );

        Self {
            probe: Duration::from_secs(probe),
            warmup: Duration::from_secs(warmup),
            health: Duration::from_secs(health),
        }
    }
}

/// Benchmark run configuration.
///
/// Immutable once the run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Candidate endpoints (before health filtering)
    pub endpoints: Vec<EndpointIdentity>,
    /// Folder containing the source images
    pub image_folder: PathBuf,
    /// Pause between frames
    pub interval: Duration,
    /// Region the endpoints live in
    pub region: String,
    /// Image transform parameters and payload ceiling
    pub compression: CompressionParams,
    /// Warm-up calls per endpoint (0 disables warm-up)
    pub warmup_count: u32,
    /// Per-call timeouts
    pub timeouts: TimeoutConfig,
    /// Serving layer base URL
    pub base_url: String,
    /// Optional bearer token for the serving layer
    pub api_token: Option<String>,
    /// Directory the CSV artifacts are written to
    pub output_dir: PathBuf,
}

impl BenchmarkConfig {
    /// Build a configuration with defaults for everything but the endpoints and folder.
    pub fn new(endpoint_names: &[&str], image_folder: impl Into<PathBuf>) -> Self {
        let region = DEFAULT_REGION.to_string();
        Self {
            endpoints: endpoint_names
                .iter()
                .map(|name| EndpointIdentity::new(*name, region.as_str()))
                .collect(),
            image_folder: image_folder.into(),
            interval: Duration::from_secs_f64(DEFAULT_INTERVAL_SECS),
            base_url: default_base_url(&region),
            region,
            compression: CompressionParams::default(),
            warmup_count: DEFAULT_WARMUP_COUNT,
            timeouts: TimeoutConfig::default(),
            api_token: None,
            output_dir: PathBuf::from("."),
        }
    }

    /// Validate value ranges.
    pub fn validate(&self) -> CommonResult<()> {
        if self.endpoints.is_empty() {
            return Err(CommonError::Validation(
                "at least one endpoint is required".to_string(),
            ));
        }
        if let Some(blank) = self.endpoints.iter().find(|e| e.name.trim().is_empty()) {
            return Err(CommonError::Validation(format!(
                "endpoint name must not be blank (region {})",
                blank.region
            )));
        }
        if !(1..=100).contains(&self.compression.quality) {
            return Err(CommonError::Validation(
                "quality must be between 1 and 100".to_string(),
            ));
        }
        if self.compression.max_dimension == 0 {
            return Err(CommonError::Validation(
                "max dimension must be greater than 0".to_string(),
            ));
        }
        if self.compression.ceiling_bytes == 0 {
            return Err(CommonError::Validation(
                "payload ceiling must be greater than 0".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(CommonError::Config("base URL must not be empty".to_string()));
        }
        Ok(())
    }
}
