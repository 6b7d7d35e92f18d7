//! run サブコマンド
//!
//! フォルダ内の全画像で各エンドポイントを計測し、CSVレポートを出力します。

use crate::common::error::{CommonError, CommonResult};
use crate::compress::{CompressionParams, DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY};
use crate::config::{
    ceiling_from_mb, BenchmarkConfig, TimeoutConfig, DEFAULT_IMAGE_FOLDER, DEFAULT_INTERVAL_SECS,
    DEFAULT_REGION, DEFAULT_WARMUP_COUNT,
};
use crate::run::Harness;
use crate::runtime::http::default_base_url;
use crate::shutdown::ShutdownController;
use crate::types::EndpointIdentity;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// run サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Endpoint names to benchmark (space or comma separated)
    #[arg(
        short,
        long,
        required = true,
        num_args = 1..,
        value_delimiter = ',',
        env = "DETBENCH_ENDPOINTS"
    )]
    pub endpoints: Vec<String>,

    /// Folder containing test images
    #[arg(short, long, default_value = DEFAULT_IMAGE_FOLDER, env = "DETBENCH_IMAGE_FOLDER")]
    pub folder: PathBuf,

    /// Interval between frames in seconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS, env = "DETBENCH_INTERVAL_SECS")]
    pub interval: f64,

    /// Region the endpoints are deployed in
    #[arg(long, default_value = DEFAULT_REGION, env = "DETBENCH_REGION")]
    pub region: String,

    /// Max image dimension for resizing
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION)]
    pub max_size: u32,

    /// JPEG compression quality 1-100
    #[arg(long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Number of warm-up requests per endpoint (0 to disable)
    #[arg(long, default_value_t = DEFAULT_WARMUP_COUNT)]
    pub warmup: u32,

    /// Payload ceiling in MB
    #[arg(long, default_value_t = 6.0)]
    pub max_payload_mb: f64,

    /// Directory the CSV reports are written to
    #[arg(short, long, default_value = ".", env = "DETBENCH_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Serving layer base URL (default: regional runtime URL)
    #[arg(long, env = "DETBENCH_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "DETBENCH_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
}

impl TryFrom<RunArgs> for BenchmarkConfig {
    type Error = CommonError;

    fn try_from(args: RunArgs) -> CommonResult<Self> {
        let interval = Duration::try_from_secs_f64(args.interval).map_err(|e| {
            CommonError::Validation(format!(
                "interval must be a non-negative number of seconds (got {}): {}",
                args.interval, e
            ))
        })?;

        let endpoints = args
            .endpoints
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| EndpointIdentity::new(name, args.region.as_str()))
            .collect();
        let base_url = args
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(&args.region));

        let config = BenchmarkConfig {
            endpoints,
            image_folder: args.folder,
            interval,
            region: args.region,
            compression: CompressionParams {
                max_dimension: args.max_size,
                quality: args.quality,
                ceiling_bytes: ceiling_from_mb(args.max_payload_mb)?,
            },
            warmup_count: args.warmup,
            timeouts: TimeoutConfig::from_env(),
            base_url,
            api_token: args.api_token,
            output_dir: args.output_dir,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Execute the run command
pub async fn execute(args: RunArgs, shutdown: ShutdownController) -> Result<(), anyhow::Error> {
    let config = BenchmarkConfig::try_from(args)?;
    let harness = Harness::with_http(config, shutdown)?;
    let outcome = harness.execute().await?;

    match &outcome.artifacts {
        Some(artifacts) => {
            println!(
                "📊 Benchmark complete! Results saved to: {}",
                artifacts.results_path.display()
            );
            if let Some(summary) = &artifacts.summary_path {
                println!("📋 Summary saved to: {}", summary.display());
            }
        }
        None => println!("No results recorded"),
    }
    if outcome.run.interrupted {
        println!("🛑 Benchmark stopped by user");
    }
    Ok(())
}
