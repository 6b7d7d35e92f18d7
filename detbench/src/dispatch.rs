//! フレーム単位の並列ディスパッチ
//!
//! 1フレームを全エンドポイントへ同時に送信し（エンドポイント毎に1タスク）、
//! 全タスクの完了を待ってから次のフレームへ進む。フレーム間は固定間隔で待機する。
//!
//! 中断要求はフレーム境界でのみ反映され、送信済みの呼び出しは必ず完了まで待つ。

use crate::common::error::ProbeFailure;
use crate::common::{bytes_to_mb, round_to, truncate_chars};
use crate::probe::Prober;
use crate::shutdown::ShutdownController;
use crate::types::{CallOutcome, CallResult, EndpointIdentity, Frame};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// コンソールに出すエラー本文の最大文字数
const CONSOLE_ERROR_CHARS: usize = 100;

/// フレームループの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLoopStats {
    /// 完了したフレーム数
    pub frames_completed: usize,
    /// 中断要求で停止したか
    pub interrupted: bool,
}

/// 並列ディスパッチャ
#[derive(Clone)]
pub struct Dispatcher {
    prober: Prober,
    interval: Duration,
    shutdown: ShutdownController,
}

impl Dispatcher {
    /// 新しいディスパッチャを作成
    pub fn new(prober: Prober, interval: Duration, shutdown: ShutdownController) -> Self {
        Self {
            prober,
            interval,
            shutdown,
        }
    }

    /// 1フレームを全エンドポイントへ送信し、全結果を返す
    ///
    /// 結果はエンドポイントの入力順に並ぶが、呼び出し自体は順不同で実行される。
    pub async fn dispatch_frame(
        &self,
        frame: &Arc<Frame>,
        endpoints: &[EndpointIdentity],
    ) -> Vec<CallResult> {
        let mut handles = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let prober = self.prober.clone();
            let frame = Arc::clone(frame);
            let endpoint = endpoint.clone();
            handles.push(tokio::spawn(
                async move { prober.probe(&endpoint, &frame).await },
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (endpoint, handle) in endpoints.iter().zip(handles) {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(endpoint = %endpoint, error = %e, "Probe task join error");
                    results.push(task_failure(endpoint, frame, e.to_string()));
                }
            }
        }
        results
    }

    /// 全フレームを順に処理し、結果を `results` に追記する
    pub async fn run_frames(
        &self,
        frames: &[Arc<Frame>],
        endpoints: &[EndpointIdentity],
        results: &mut Vec<CallResult>,
    ) -> FrameLoopStats {
        let total = frames.len();
        let mut frames_completed = 0;

        for (i, frame) in frames.iter().enumerate() {
            if self.shutdown.is_shutdown_requested() {
                break;
            }

            info!(
                "Frame {}/{}: {} ({:.2} MB)",
                i + 1,
                total,
                frame.metadata.source,
                bytes_to_mb(frame.payload_len())
            );

            let frame_results = self.dispatch_frame(frame, endpoints).await;
            for result in &frame_results {
                log_result(result);
            }
            results.extend(frame_results);
            frames_completed += 1;

            if i + 1 < total && !self.interval.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = self.shutdown.wait() => {}
                }
            }
        }

        let interrupted = frames_completed < total;
        if interrupted {
            warn!(
                frames_completed = frames_completed,
                total = total,
                "Benchmark stopped by user"
            );
        }

        FrameLoopStats {
            frames_completed,
            interrupted,
        }
    }
}

fn task_failure(endpoint: &EndpointIdentity, frame: &Frame, reason: String) -> CallResult {
    CallResult {
        endpoint: endpoint.clone(),
        timestamp: Local::now(),
        outcome: CallOutcome::Failure(ProbeFailure::TaskFailed(reason)),
        original_size_mb: frame.metadata.original_size_mb(),
        payload_size_mb: round_to(bytes_to_mb(frame.payload_len()), 2),
        image_dimensions: Some(frame.metadata.compressed_dimensions),
    }
}

fn log_result(result: &CallResult) {
    match &result.outcome {
        CallOutcome::Success(m) => info!(
            "  ✅ {}: {:.2}ms, {} detections, conf={:.3}",
            result.endpoint, m.roundtrip_ms, m.detections, m.max_confidence
        ),
        CallOutcome::Failure(_) => warn!(
            "  ❌ {}: {}",
            result.endpoint,
            truncate_chars(&result.status_label(), CONSOLE_ERROR_CHARS)
        ),
    }
}
