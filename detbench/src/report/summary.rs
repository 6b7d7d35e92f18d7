//! エンドポイント毎の集計

use crate::types::{CallResult, EndpointIdentity, EndpointSummary};

/// 成功結果をエンドポイント毎に集計する
///
/// 行の順序は結果ストリーム中で最初に成功が現れた順。成功0件のエンドポイントは含まない。
pub fn summarize(results: &[CallResult]) -> Vec<EndpointSummary> {
    let mut groups: Vec<(EndpointIdentity, Samples)> = Vec::new();

    for result in results {
        let Some(measurement) = result.measurement() else {
            continue;
        };
        let index = match groups.iter().position(|(e, _)| *e == result.endpoint) {
            Some(index) => index,
            None => {
                groups.push((result.endpoint.clone(), Samples::default()));
                groups.len() - 1
            }
        };
        let samples = &mut groups[index].1;
        samples.roundtrip.push(measurement.roundtrip_ms);
        samples.inference.push(measurement.inference_ms);
        samples.confidence.push(measurement.max_confidence);
        samples.detections.push(measurement.detections as f64);
    }

    groups
        .into_iter()
        .filter_map(|(endpoint, samples)| samples.summarize(endpoint))
        .collect()
}

#[derive(Default)]
struct Samples {
    roundtrip: Vec<f64>,
    inference: Vec<f64>,
    confidence: Vec<f64>,
    detections: Vec<f64>,
}

impl Samples {
    fn summarize(&self, endpoint: EndpointIdentity) -> Option<EndpointSummary> {
        Some(EndpointSummary {
            endpoint,
            samples: self.roundtrip.len(),
            avg_roundtrip_ms: mean(&self.roundtrip)?,
            min_roundtrip_ms: self.roundtrip.iter().copied().reduce(f64::min)?,
            max_roundtrip_ms: self.roundtrip.iter().copied().reduce(f64::max)?,
            p50_roundtrip_ms: percentile(&self.roundtrip, 0.50)?,
            p95_roundtrip_ms: percentile(&self.roundtrip, 0.95)?,
            avg_inference_ms: mean(&self.inference)?,
            avg_confidence: mean(&self.confidence)?,
            avg_detections: mean(&self.detections)?,
        })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn percentile(values: &[f64], percentile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let index = ((sorted.len() - 1) as f64 * percentile)
        .round()
        .clamp(0.0, (sorted.len() - 1) as f64) as usize;
    sorted.get(index).copied()
}
