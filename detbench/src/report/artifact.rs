//! CSV成果物の書き出し

use crate::common::error::BenchResult;
use crate::common::round_to;
use crate::types::{CallResult, EndpointSummary};
use std::path::Path;

/// 生結果CSVのヘッダー
pub const RESULTS_HEADER: [&str; 10] = [
    "Model",
    "Timestamp",
    "Roundtrip_Latency_ms",
    "Inference_Latency_ms",
    "Max_Confidence",
    "Detections",
    "Original_Size_MB",
    "Payload_Size_MB",
    "Image_Dimensions",
    "Status",
];

/// サマリーCSVのヘッダー
pub const SUMMARY_HEADER: [&str; 8] = [
    "Model",
    "Samples",
    "Avg_Roundtrip_ms",
    "Min_Roundtrip_ms",
    "Max_Roundtrip_ms",
    "Avg_Inference_ms",
    "Avg_Confidence",
    "Avg_Detections",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// 全呼び出し結果を1行ずつ書き出す
///
/// 失敗行の計測値カラムは空欄になる。
pub fn write_results(path: &Path, results: &[CallResult]) -> BenchResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(RESULTS_HEADER)?;

    for result in results {
        let measurement = result.measurement();
        writer.write_record(&[
            result.endpoint.name.clone(),
            result.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            measurement
                .map(|m| m.roundtrip_ms.to_string())
                .unwrap_or_default(),
            measurement
                .map(|m| m.inference_ms.to_string())
                .unwrap_or_default(),
            measurement
                .map(|m| m.max_confidence.to_string())
                .unwrap_or_default(),
            measurement
                .map(|m| m.detections.to_string())
                .unwrap_or_default(),
            result.original_size_mb.to_string(),
            result.payload_size_mb.to_string(),
            result
                .image_dimensions
                .map(|d| d.to_string())
                .unwrap_or_default(),
            result.status_label(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// エンドポイント毎のサマリーを書き出す
pub fn write_summary(path: &Path, summaries: &[EndpointSummary]) -> BenchResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SUMMARY_HEADER)?;

    for summary in summaries {
        writer.write_record(&[
            summary.endpoint.name.clone(),
            summary.samples.to_string(),
            round_to(summary.avg_roundtrip_ms, 2).to_string(),
            round_to(summary.min_roundtrip_ms, 2).to_string(),
            round_to(summary.max_roundtrip_ms, 2).to_string(),
            round_to(summary.avg_inference_ms, 2).to_string(),
            round_to(summary.avg_confidence, 4).to_string(),
            round_to(summary.avg_detections, 1).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
