//! 呼び出し結果とサマリー型

use super::{Dimensions, EndpointIdentity};
use crate::common::error::ProbeFailure;
use chrono::{DateTime, Local};
use serde::Deserialize;

/// 推論コンテナが返すJSON応答
///
/// 欠落フィールドは0として扱う（検出なしの場合 `max_confidence` は0.0）。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InferenceResponse {
    /// モデルが報告した推論時間（ms）
    #[serde(default)]
    pub model_latency_ms: f64,
    /// 検出数
    #[serde(default)]
    pub detections_count: u64,
    /// 最大信頼度
    #[serde(default)]
    pub max_confidence: f64,
}

/// 成功した呼び出しの計測値
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// ローカルで計測した往復レイテンシ（ms）
    pub roundtrip_ms: f64,
    /// サーバー報告の推論レイテンシ（ms）
    pub inference_ms: f64,
    /// 最大信頼度
    pub max_confidence: f64,
    /// 検出数
    pub detections: u64,
}

impl Measurement {
    /// 往復レイテンシと推論応答から計測値を組み立てる
    pub fn from_response(roundtrip_ms: f64, response: &InferenceResponse) -> Self {
        Self {
            roundtrip_ms,
            inference_ms: response.model_latency_ms,
            max_confidence: response.max_confidence,
            detections: response.detections_count,
        }
    }
}

/// 呼び出し結果（成功 / 失敗）
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// 成功
    Success(Measurement),
    /// 失敗（理由付き）
    Failure(ProbeFailure),
}

/// 1エンドポイント × 1フレームの呼び出し結果
///
/// 計測値は成功時にのみ存在する。生成後に変更されない。
#[derive(Debug, Clone)]
pub struct CallResult {
    /// 呼び出し先
    pub endpoint: EndpointIdentity,
    /// 結果の記録時刻
    pub timestamp: DateTime<Local>,
    /// 結果
    pub outcome: CallOutcome,
    /// 元画像サイズ（MB）
    pub original_size_mb: f64,
    /// 送信ペイロードサイズ（MB）
    pub payload_size_mb: f64,
    /// 送信画像のサイズ（事前拒否時は `None`）
    pub image_dimensions: Option<Dimensions>,
}

impl CallResult {
    /// 成功したかどうか
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CallOutcome::Success(_))
    }

    /// 成功時の計測値
    pub fn measurement(&self) -> Option<&Measurement> {
        match &self.outcome {
            CallOutcome::Success(measurement) => Some(measurement),
            CallOutcome::Failure(_) => None,
        }
    }

    /// 失敗理由
    pub fn failure(&self) -> Option<&ProbeFailure> {
        match &self.outcome {
            CallOutcome::Success(_) => None,
            CallOutcome::Failure(failure) => Some(failure),
        }
    }

    /// レポート用のステータス文字列（`Success` / `Error: <reason>`）
    pub fn status_label(&self) -> String {
        match &self.outcome {
            CallOutcome::Success(_) => "Success".to_string(),
            CallOutcome::Failure(failure) => format!("Error: {}", failure),
        }
    }
}

/// エンドポイント毎のサマリー
///
/// 平均値はすべて成功結果のみから算出する。
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSummary {
    /// エンドポイント
    pub endpoint: EndpointIdentity,
    /// 成功サンプル数
    pub samples: usize,
    /// 平均往復レイテンシ（ms）
    pub avg_roundtrip_ms: f64,
    /// 最小往復レイテンシ（ms）
    pub min_roundtrip_ms: f64,
    /// 最大往復レイテンシ（ms）
    pub max_roundtrip_ms: f64,
    /// p50往復レイテンシ（ms）
    pub p50_roundtrip_ms: f64,
    /// p95往復レイテンシ（ms）
    pub p95_roundtrip_ms: f64,
    /// 平均推論レイテンシ（ms）
    pub avg_inference_ms: f64,
    /// 平均最大信頼度
    pub avg_confidence: f64,
    /// 平均検出数
    pub avg_detections: f64,
}
