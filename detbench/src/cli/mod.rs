//! CLI module for detbench
//!
//! Provides the command-line interface for benchmark runs.

pub mod compress;
pub mod run;

use clap::{Parser, Subcommand};

/// Detection endpoint benchmark harness - latency and confidence comparison across inference endpoints
#[derive(Parser, Debug)]
#[command(name = "detbench")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    DETBENCH_ENDPOINTS             Comma-separated endpoint names
    DETBENCH_IMAGE_FOLDER          Image folder (default: test_images)
    DETBENCH_INTERVAL_SECS         Pause between frames (default: 0.5)
    DETBENCH_REGION                Region (default: us-east-1)
    DETBENCH_BASE_URL              Serving layer base URL (default: regional runtime URL)
    DETBENCH_API_TOKEN             Bearer token for the serving layer
    DETBENCH_OUTPUT_DIR            Directory for CSV reports (default: .)
    DETBENCH_LOG_LEVEL             Log level (default: info)
    DETBENCH_LOG_DIR               Also write daily-rotated log files here
    DETBENCH_PROBE_TIMEOUT_SECS    Measurement call timeout (default: 300)
    DETBENCH_WARMUP_TIMEOUT_SECS   Warm-up call timeout (default: 300)
    DETBENCH_HEALTH_TIMEOUT_SECS   Health query timeout (default: 10)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Benchmark endpoints with every image in a folder
    Run(run::RunArgs),
    /// Compress images and report sizes without calling any endpoint
    Compress(compress::CompressArgs),
}
