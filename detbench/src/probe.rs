//! 単発呼び出しプローブ
//!
//! 1エンドポイント × 1ペイロードに対し、タイムアウト付きで **ちょうど1回** だけ呼び出す。
//! リトライはレイテンシ計測とエラー率を歪めるため行わない。
//!
//! どのような失敗も `CallResult` のデータとして返し、呼び出し元へ伝播させない。

use crate::common::error::ProbeFailure;
use crate::common::{bytes_to_mb, round_to, truncate_chars};
use crate::runtime::InvocationClient;
use crate::types::{CallOutcome, CallResult, EndpointIdentity, Frame, InferenceResponse, Measurement};
use chrono::Local;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// ログに出すエラー本文の最大文字数
const LOG_ERROR_CHARS: usize = 200;

/// 単発呼び出しプローブ
#[derive(Clone)]
pub struct Prober {
    client: Arc<dyn InvocationClient>,
    ceiling_bytes: u64,
    timeout: Duration,
}

impl Prober {
    /// 新しいプローブを作成
    pub fn new(client: Arc<dyn InvocationClient>, ceiling_bytes: u64, timeout: Duration) -> Self {
        Self {
            client,
            ceiling_bytes,
            timeout,
        }
    }

    /// フレームを1回送信して結果を分類する
    pub async fn probe(&self, endpoint: &EndpointIdentity, frame: &Frame) -> CallResult {
        let payload_len = frame.payload_len();
        let payload_size_mb = bytes_to_mb(payload_len);

        debug!(
            endpoint = %endpoint,
            payload_mb = %format!("{:.2}", payload_size_mb),
            "Sending frame"
        );

        if payload_len > self.ceiling_bytes {
            let failure = ProbeFailure::PayloadTooLarge {
                size_mb: payload_size_mb,
                limit_mb: bytes_to_mb(self.ceiling_bytes),
            };
            warn!(endpoint = %endpoint, reason = %failure, "Payload rejected before sending");
            return self.result(endpoint, frame, CallOutcome::Failure(failure), false);
        }

        let body = frame.payload.to_vec();
        let started = Instant::now();
        let response = self.client.invoke(endpoint, body, self.timeout).await;
        let roundtrip_ms = started.elapsed().as_secs_f64() * 1000.0;

        let outcome = match response {
            Ok(bytes) => match serde_json::from_slice::<InferenceResponse>(&bytes) {
                Ok(parsed) => {
                    debug!(
                        endpoint = %endpoint,
                        response_bytes = bytes.len(),
                        "Response parsed"
                    );
                    CallOutcome::Success(Measurement::from_response(roundtrip_ms, &parsed))
                }
                Err(e) => CallOutcome::Failure(ProbeFailure::InvalidResponse(e.to_string())),
            },
            Err(e) => CallOutcome::Failure(ProbeFailure::from(e)),
        };

        if let CallOutcome::Failure(failure) = &outcome {
            warn!(
                endpoint = %endpoint,
                error = %truncate_chars(&failure.to_string(), LOG_ERROR_CHARS),
                "Call failed"
            );
        }

        self.result(endpoint, frame, outcome, true)
    }

    fn result(
        &self,
        endpoint: &EndpointIdentity,
        frame: &Frame,
        outcome: CallOutcome,
        sent: bool,
    ) -> CallResult {
        CallResult {
            endpoint: endpoint.clone(),
            timestamp: Local::now(),
            outcome,
            original_size_mb: frame.metadata.original_size_mb(),
            payload_size_mb: round_to(bytes_to_mb(frame.payload_len()), 2),
            image_dimensions: sent.then_some(frame.metadata.compressed_dimensions),
        }
    }
}
