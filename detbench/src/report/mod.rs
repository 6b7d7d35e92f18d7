//! 集計とレポート出力
//!
//! 生結果CSVとサマリーCSVは独立した成果物として書き出す。
//! 結果が0件の場合は何も書き出さない（エラーではない）。

/// CSV成果物
pub mod artifact;
/// 集計
pub mod summary;

pub use summary::summarize;

use crate::common::error::BenchResult;
use crate::types::{CallResult, EndpointSummary};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

/// 書き出した成果物のパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    /// 生結果CSV
    pub results_path: PathBuf,
    /// サマリーCSV（成功したエンドポイントが無い場合は `None`）
    pub summary_path: Option<PathBuf>,
}

/// 成果物のファイル名（`benchmark_results_<stamp>.csv`, `benchmark_summary_<stamp>.csv`）
pub fn artifact_names(stamp: &DateTime<Local>) -> (String, String) {
    let stamp = stamp.format("%Y%m%d_%H%M%S");
    (
        format!("benchmark_results_{stamp}.csv"),
        format!("benchmark_summary_{stamp}.csv"),
    )
}

/// 生結果とサマリーを `output_dir` に書き出す
pub fn write_reports(
    output_dir: &Path,
    results: &[CallResult],
    summaries: &[EndpointSummary],
    stamp: &DateTime<Local>,
) -> BenchResult<Option<ReportArtifacts>> {
    if results.is_empty() {
        info!("No results to save");
        return Ok(None);
    }

    std::fs::create_dir_all(output_dir)?;
    let (results_name, summary_name) = artifact_names(stamp);

    let results_path = output_dir.join(results_name);
    artifact::write_results(&results_path, results)?;
    info!(path = %results_path.display(), rows = results.len(), "Results saved");

    let summary_path = if summaries.is_empty() {
        None
    } else {
        let path = output_dir.join(summary_name);
        artifact::write_summary(&path, summaries)?;
        info!(path = %path.display(), rows = summaries.len(), "Summary saved");
        Some(path)
    };

    Ok(Some(ReportArtifacts {
        results_path,
        summary_path,
    }))
}

/// エンドポイント毎のサマリーをログに出す
pub fn log_summary(summaries: &[EndpointSummary]) {
    info!("{}", "=".repeat(60));
    info!("BENCHMARK SUMMARY");
    info!("{}", "=".repeat(60));
    for s in summaries {
        info!("🤖 {}", s.endpoint);
        info!("   Samples: {}", s.samples);
        info!(
            "   Avg Roundtrip Latency: {:.2} ms (min: {:.2}, max: {:.2}, p50: {:.2}, p95: {:.2})",
            s.avg_roundtrip_ms,
            s.min_roundtrip_ms,
            s.max_roundtrip_ms,
            s.p50_roundtrip_ms,
            s.p95_roundtrip_ms
        );
        info!("   Avg Inference Latency: {:.2} ms", s.avg_inference_ms);
        info!(
            "   Avg Max Confidence:    {:.4} ({:.2}%)",
            s.avg_confidence,
            s.avg_confidence * 100.0
        );
        info!("   Avg Detections:        {:.1}", s.avg_detections);
    }
}
