//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! # エラー分類
//!
//! - 事前拒否（ペイロード上限超過）・通信失敗・タイムアウトは [`ProbeFailure`] として
//!   呼び出し結果のデータに変換され、コンポーネント境界を越えて伝播しない。
//! - ヘルスチェック失敗は除外ログとして記録される。
//! - ラン全体の失敗（画像なし・健全なエンドポイントなし）だけが [`BenchError`] として
//!   呼び出し元まで伝播し、実行を中断する。

use std::path::PathBuf;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// benchmark harness error type
#[derive(Debug, Error)]
pub enum BenchError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// No usable images in the source folder
    #[error("No images found in {}", .0.display())]
    NoImagesFound(PathBuf),

    /// Every candidate endpoint failed the health gate
    #[error("No healthy endpoints found ({checked} checked)")]
    NoHealthyEndpoints {
        /// Number of endpoints that were checked
        checked: usize,
    },

    /// Image decode / encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV report error
    #[error("Report error: {0}")]
    Report(#[from] csv::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Timeout error
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Non-success status returned by the serving layer
    #[error("HTTP {status}: {message}")]
    UpstreamStatus {
        /// HTTP status code
        status: u16,
        /// Response body (as returned)
        message: String,
    },

    /// Response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// 単発呼び出しの失敗理由
///
/// `CallResult` のステータス列には `Error: <Display>` として出力される。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProbeFailure {
    /// ペイロードが上限を超えていたため送信しなかった
    #[error("Payload too large ({size_mb:.2} MB > {limit_mb} MB limit)")]
    PayloadTooLarge {
        /// ペイロードサイズ（MB）
        size_mb: f64,
        /// 上限（MB）
        limit_mb: f64,
    },

    /// タイムアウト
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// 通信エラー
    #[error("{0}")]
    Transport(String),

    /// 2xx以外の応答
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// 応答の解析失敗
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 呼び出しタスク自体の異常終了
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl From<BenchError> for ProbeFailure {
    fn from(err: BenchError) -> Self {
        match err {
            BenchError::Timeout(message) => Self::Timeout(message),
            BenchError::UpstreamStatus { status, message } => {
                Self::HttpStatus { status, message }
            }
            BenchError::InvalidResponse(message) => Self::InvalidResponse(message),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (benchmark harness)
pub type BenchResult<T> = Result<T, BenchError>;
