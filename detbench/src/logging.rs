//! ロギング初期化
//!
//! - `DETBENCH_LOG_LEVEL`（旧: `RUST_LOG`）でフィルタを指定、未設定時は `info`
//! - `DETBENCH_LOG_DIR` が設定されている場合は日次ローテーションのファイルにも出力

use crate::common::error::{CommonError, CommonResult};
use crate::config::get_env_with_fallback;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_FILE_PREFIX: &str = "detbench.log";

/// ログフィルタ文字列を解決
pub fn resolve_filter() -> String {
    get_env_with_fallback("DETBENCH_LOG_LEVEL", "RUST_LOG")
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// グローバルsubscriberを初期化
///
/// ファイル出力が有効な場合は返された `WorkerGuard` をプロセス終了まで保持すること。
pub fn init() -> CommonResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(resolve_filter())
        .map_err(|e| CommonError::Config(format!("invalid log filter: {}", e)))?;

    let (file_layer, guard) = match std::env::var("DETBENCH_LOG_DIR").ok() {
        Some(dir) => {
            std::fs::create_dir_all(&dir).map_err(|e| {
                CommonError::Config(format!("failed to create log dir {}: {}", dir, e))
            })?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|e| CommonError::Config(format!("failed to install subscriber: {}", e)))?;

    Ok(guard)
}
