//! ベンチマーク実行オーケストレーション
//!
//! 画像探索 → 圧縮 → ヘルスゲート → ウォームアップ → フレームループ → 集計・出力
//! の順に、明示的な [`Run`] コンテキストを各コンポーネントへ引き回す。

use crate::common::error::{BenchError, BenchResult};
use crate::compress::{compress_image, CompressionParams};
use crate::config::BenchmarkConfig;
use crate::dispatch::Dispatcher;
use crate::health::HealthGate;
use crate::probe::Prober;
use crate::report::{self, ReportArtifacts};
use crate::runtime::{HttpServingClient, InvocationClient, StatusClient};
use crate::shutdown::ShutdownController;
use crate::types::{CallResult, EndpointIdentity, EndpointSummary, Frame};
use crate::warmup::WarmupController;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 入力として扱う画像の拡張子（小文字比較）
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// 1回のベンチマーク実行の状態
#[derive(Debug, Clone)]
pub struct Run {
    /// 実行ID
    pub id: Uuid,
    /// 開始時刻（成果物のファイル名に使う）
    pub started_at: DateTime<Local>,
    /// 圧縮済みフレーム（入力順）
    pub frames: Vec<Arc<Frame>>,
    /// ヘルスゲート通過後のエンドポイント
    pub endpoints: Vec<EndpointIdentity>,
    /// 全呼び出し結果（フレーム順）
    pub results: Vec<CallResult>,
    /// 中断されたか
    pub interrupted: bool,
}

impl Run {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Local::now(),
            frames: Vec::new(),
            endpoints: Vec::new(),
            results: Vec::new(),
            interrupted: false,
        }
    }
}

/// 実行結果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// 実行状態
    pub run: Run,
    /// エンドポイント毎のサマリー
    pub summaries: Vec<EndpointSummary>,
    /// 書き出した成果物（結果0件なら `None`）
    pub artifacts: Option<ReportArtifacts>,
}

/// フォルダ直下の画像ファイルを名前順で列挙する
pub fn discover_images(folder: &Path) -> BenchResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BenchError::NoImagesFound(folder.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            images.push(path);
        }
    }
    images.sort();

    if images.is_empty() {
        return Err(BenchError::NoImagesFound(folder.to_path_buf()));
    }
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// ベンチマークハーネス
pub struct Harness {
    config: BenchmarkConfig,
    invoker: Arc<dyn InvocationClient>,
    status: Arc<dyn StatusClient>,
    shutdown: ShutdownController,
}

impl Harness {
    /// 任意のトランスポートでハーネスを作成
    pub fn new(
        config: BenchmarkConfig,
        invoker: Arc<dyn InvocationClient>,
        status: Arc<dyn StatusClient>,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            config,
            invoker,
            status,
            shutdown,
        }
    }

    /// 設定のベースURLに対するHTTPクライアントでハーネスを作成
    pub fn with_http(config: BenchmarkConfig, shutdown: ShutdownController) -> BenchResult<Self> {
        let client = Arc::new(HttpServingClient::new(
            config.base_url.clone(),
            config.api_token.clone(),
            config.timeouts.health,
        )?);
        Ok(Self::new(config, client.clone(), client, shutdown))
    }

    /// ベンチマークを実行する
    ///
    /// 画像が無い場合と健全なエンドポイントが無い場合だけエラーを返し、
    /// どちらもネットワーク呼び出し（前者）や成果物の出力（両方）より前に判定される。
    pub async fn execute(&self) -> BenchResult<RunOutcome> {
        self.config.validate()?;
        let mut run = Run::new();

        let images = discover_images(&self.config.image_folder)?;
        self.log_configuration(&run, images.len());

        run.frames = prepare_frames(&images, self.config.compression).await?;
        if run.frames.is_empty() {
            return Err(BenchError::NoImagesFound(self.config.image_folder.clone()));
        }

        let gate = HealthGate::new(self.status.clone());
        run.endpoints = gate.filter_healthy(&self.config.endpoints).await;
        if run.endpoints.is_empty() {
            return Err(BenchError::NoHealthyEndpoints {
                checked: self.config.endpoints.len(),
            });
        }
        info!(
            "{}/{} endpoints healthy",
            run.endpoints.len(),
            self.config.endpoints.len()
        );

        self.warm_up(&run).await;

        let dispatcher = Dispatcher::new(
            Prober::new(
                self.invoker.clone(),
                self.config.compression.ceiling_bytes,
                self.config.timeouts.probe,
            ),
            self.config.interval,
            self.shutdown.clone(),
        );
        let mut results = Vec::new();
        let stats = dispatcher
            .run_frames(&run.frames, &run.endpoints, &mut results)
            .await;
        run.results = results;
        run.interrupted = stats.interrupted;

        let summaries = report::summarize(&run.results);
        let artifacts = report::write_reports(
            &self.config.output_dir,
            &run.results,
            &summaries,
            &run.started_at,
        )?;
        report::log_summary(&summaries);

        info!(
            run_id = %run.id,
            frames = stats.frames_completed,
            results = run.results.len(),
            interrupted = run.interrupted,
            "Benchmark complete"
        );

        Ok(RunOutcome {
            run,
            summaries,
            artifacts,
        })
    }

    async fn warm_up(&self, run: &Run) {
        if self.config.warmup_count == 0 {
            return;
        }
        let Some(first) = warmup_frame(&run.frames) else {
            warn!("No frame fits the payload ceiling, skipping warm-up");
            return;
        };

        let controller = WarmupController::new(
            self.invoker.clone(),
            self.config.warmup_count,
            self.config.timeouts.warmup,
        );
        for endpoint in &run.endpoints {
            let report = controller.warm_up(endpoint, &first.payload).await;
            info!(
                endpoint = %report.endpoint,
                succeeded = report.succeeded,
                attempted = report.attempted,
                "Warm-up finished"
            );
        }
    }

    fn log_configuration(&self, run: &Run, image_count: usize) {
        let config = &self.config;
        info!(run_id = %run.id, "Benchmark configuration");
        info!("   Endpoints: {}", config.endpoints.len());
        for endpoint in &config.endpoints {
            info!("      - {}", endpoint);
        }
        info!("   Images: {}", image_count);
        info!("   Interval: {:?}", config.interval);
        info!("   Region: {}", config.region);
        info!("   Max Image Size: {}px", config.compression.max_dimension);
        info!("   JPEG Quality: {}", config.compression.quality);
        info!("   Warm-up Requests: {}", config.warmup_count);
        info!(
            "   Payload Limit: {:.2} MB",
            crate::common::bytes_to_mb(config.compression.ceiling_bytes)
        );
    }
}

/// ウォームアップに使うフレーム（上限内に収まった最初のフレーム）
fn warmup_frame(frames: &[Arc<Frame>]) -> Option<&Arc<Frame>> {
    frames.iter().find(|frame| frame.metadata.under_limit)
}

/// 全画像を圧縮してフレーム列を作る
///
/// 読み込み・デコードに失敗した画像は警告を出してスキップする。
pub async fn prepare_frames(
    images: &[PathBuf],
    params: CompressionParams,
) -> BenchResult<Vec<Arc<Frame>>> {
    let mut frames = Vec::with_capacity(images.len());

    for path in images {
        let owned = path.clone();
        let compressed = tokio::task::spawn_blocking(move || compress_image(&owned, &params))
            .await
            .map_err(|e| BenchError::Internal(format!("Compression task failed: {}", e)))?;

        match compressed {
            Ok((payload, metadata)) => {
                let icon = if metadata.under_limit { "✅" } else { "❌" };
                info!("   {} {}", icon, metadata.source);
                info!(
                    "      Original:   {:.2} MB ({}, {})",
                    metadata.original_size_mb(),
                    metadata.original_dimensions,
                    metadata.original_mode
                );
                info!(
                    "      Compressed: {:.2} MB ({}, Q={})",
                    metadata.compressed_size_mb(),
                    metadata.compressed_dimensions,
                    metadata.final_quality
                );
                info!("      Ratio:      {}x smaller", metadata.compression_ratio);
                if !metadata.under_limit {
                    warn!(
                        source = %metadata.source,
                        "Compressed image still exceeds the payload ceiling"
                    );
                }
                frames.push(Arc::new(Frame::new(frames.len(), payload, metadata)));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable image");
            }
        }
    }

    Ok(frames)
}
