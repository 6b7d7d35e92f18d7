//! Shared helpers for detbench integration tests

#![allow(dead_code)]

use detbench::config::{BenchmarkConfig, TimeoutConfig};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Write `count` small gradient PNGs named `frame_00.png`, `frame_01.png`, ...
pub fn write_test_images(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("frame_{:02}.png", i));
            let img = image::RgbImage::from_fn(96, 64, |x, y| {
                image::Rgb([(x * 2) as u8, (y * 3) as u8, (i * 40) as u8])
            });
            img.save(&path).expect("write test image");
            path
        })
        .collect()
}

/// Write a noisy PNG that does not compress well
pub fn write_noisy_image(path: &Path, side: u32) {
    let mut state: u32 = 0x1234_5678;
    let img = image::RgbImage::from_fn(side, side, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xFF) as u8
        };
        image::Rgb([next(), next(), next()])
    });
    img.save(path).expect("write noisy image");
}

/// Mount a describe handler returning `status` for `name`
pub async fn mount_status(server: &MockServer, name: &str, status: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/endpoints/{}", name)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "EndpointName": name,
                "EndpointStatus": status,
            })),
        )
        .mount(server)
        .await;
}

/// Inference response body in the serving container's format
pub fn detection_body(latency_ms: f64, detections: u64, confidence: f64) -> serde_json::Value {
    json!({
        "model_latency_ms": latency_ms,
        "detections_count": detections,
        "max_confidence": confidence,
    })
}

/// Config pointed at the mock server with fast timeouts and no pacing
pub fn config_for(
    server: &MockServer,
    endpoints: &[&str],
    image_folder: &Path,
    output_dir: &Path,
) -> BenchmarkConfig {
    let mut config = BenchmarkConfig::new(endpoints, image_folder);
    config.base_url = server.uri();
    config.interval = Duration::ZERO;
    config.warmup_count = 0;
    config.output_dir = output_dir.to_path_buf();
    config.timeouts = TimeoutConfig {
        probe: Duration::from_millis(500),
        warmup: Duration::from_millis(500),
        health: Duration::from_secs(2),
    };
    config
}

/// Read a CSV artifact into string rows (header excluded)
pub fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    reader
        .records()
        .map(|record| record.expect("csv record"))
        .collect()
}

/// Column lookup by header name
pub fn column(path: &Path, name: &str) -> usize {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    reader
        .headers()
        .expect("csv headers")
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("missing column {}", name))
}
