//! End-to-end benchmark runs against a mock serving layer

use crate::support::{
    column, config_for, detection_body, mount_status, read_rows, write_noisy_image,
    write_test_images,
};
use detbench::common::error::BenchError;
use detbench::run::Harness;
use detbench::shutdown::ShutdownController;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_one_success_one_timeout() {
    let server = MockServer::start().await;
    mount_status(&server, "yolo11n", "InService").await;
    mount_status(&server, "yolo11s", "InService").await;

    Mock::given(method("POST"))
        .and(path("/endpoints/yolo11n/invocations"))
        .and(header("content-type", "application/x-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detection_body(50.0, 3, 0.91)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/endpoints/yolo11s/invocations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detection_body(40.0, 1, 0.5))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let images = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_test_images(images.path(), 1);
    let config = config_for(&server, &["yolo11n", "yolo11s"], images.path(), output.path());

    let harness = Harness::with_http(config, ShutdownController::default()).unwrap();
    let outcome = harness.execute().await.expect("run should complete");

    assert_eq!(outcome.run.results.len(), 2);
    assert!(!outcome.run.interrupted);

    let artifacts = outcome.artifacts.expect("artifacts written");
    let raw_rows = read_rows(&artifacts.results_path);
    assert_eq!(raw_rows.len(), 2);

    let model = column(&artifacts.results_path, "Model");
    let status = column(&artifacts.results_path, "Status");
    let roundtrip = column(&artifacts.results_path, "Roundtrip_Latency_ms");
    let ok = raw_rows.iter().find(|r| &r[model] == "yolo11n").unwrap();
    let timed_out = raw_rows.iter().find(|r| &r[model] == "yolo11s").unwrap();
    assert_eq!(&ok[status], "Success");
    assert!(ok[roundtrip].parse::<f64>().unwrap() > 0.0);
    assert!(timed_out[status].starts_with("Error: "));
    assert_eq!(&timed_out[roundtrip], "");

    let summary_path = artifacts.summary_path.expect("summary written");
    let summary_rows = read_rows(&summary_path);
    assert_eq!(summary_rows.len(), 1);
    let row = &summary_rows[0];
    assert_eq!(&row[column(&summary_path, "Model")], "yolo11n");
    assert_eq!(&row[column(&summary_path, "Samples")], "1");
    assert!(row[column(&summary_path, "Avg_Roundtrip_ms")].parse::<f64>().unwrap() > 0.0);
    assert_eq!(
        row[column(&summary_path, "Avg_Detections")]
            .parse::<f64>()
            .unwrap(),
        3.0
    );
    assert_eq!(
        row[column(&summary_path, "Avg_Confidence")]
            .parse::<f64>()
            .unwrap(),
        0.91
    );
}

#[tokio::test]
async fn test_unhealthy_endpoints_are_never_invoked() {
    let server = MockServer::start().await;
    mount_status(&server, "ready", "InService").await;
    mount_status(&server, "booting", "Creating").await;

    Mock::given(method("POST"))
        .and(path("/endpoints/ready/invocations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detection_body(10.0, 0, 0.0)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/endpoints/booting/invocations"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let images = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_test_images(images.path(), 2);
    let config = config_for(&server, &["booting", "ready"], images.path(), output.path());

    let outcome = Harness::with_http(config, ShutdownController::default())
        .unwrap()
        .execute()
        .await
        .unwrap();

    let names: Vec<&str> = outcome
        .run
        .endpoints
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["ready"]);
    assert_eq!(outcome.run.results.len(), 2);
    assert_eq!(outcome.summaries.len(), 1);
    // 検出なしの応答でも成功として集計される
    assert_eq!(outcome.summaries[0].avg_confidence, 0.0);
    server.verify().await;
}

#[tokio::test]
async fn test_all_unhealthy_produces_no_artifacts() {
    let server = MockServer::start().await;
    mount_status(&server, "a", "Failed").await;
    Mock::given(method("GET"))
        .and(path("/endpoints/b"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Could not find endpoint"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let images = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_test_images(images.path(), 1);
    let config = config_for(&server, &["a", "b"], images.path(), output.path());

    let result = Harness::with_http(config, ShutdownController::default())
        .unwrap()
        .execute()
        .await;

    assert!(matches!(
        result,
        Err(BenchError::NoHealthyEndpoints { checked: 2 })
    ));
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    server.verify().await;
}

#[tokio::test]
async fn test_no_images_aborts_before_network() {
    let server = MockServer::start().await;
    mount_status(&server, "a", "InService").await;

    let images = tempdir().unwrap();
    let output = tempdir().unwrap();
    std::fs::write(images.path().join("notes.txt"), b"not an image").unwrap();
    let config = config_for(&server, &["a"], images.path(), output.path());

    let result = Harness::with_http(config, ShutdownController::default())
        .unwrap()
        .execute()
        .await;

    assert!(matches!(result, Err(BenchError::NoImagesFound(_))));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_oversized_payload_is_rejected_locally() {
    let server = MockServer::start().await;
    mount_status(&server, "a", "InService").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detection_body(1.0, 1, 0.1)))
        .expect(0)
        .mount(&server)
        .await;

    let images = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_noisy_image(&images.path().join("noise.png"), 256);
    let mut config = config_for(&server, &["a"], images.path(), output.path());
    config.compression.ceiling_bytes = 1024;
    // 上限内のフレームが無いのでウォームアップも送信されない
    config.warmup_count = 2;

    let outcome = Harness::with_http(config, ShutdownController::default())
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(outcome.run.results.len(), 1);
    assert!(!outcome.run.frames[0].metadata.under_limit);
    let artifacts = outcome.artifacts.expect("raw results written");
    assert!(artifacts.summary_path.is_none());

    let rows = read_rows(&artifacts.results_path);
    let status = column(&artifacts.results_path, "Status");
    assert!(rows[0][status].starts_with("Error: Payload too large"));
    server.verify().await;
}

#[tokio::test]
async fn test_warmup_uses_first_frame_then_measures() {
    let server = MockServer::start().await;
    mount_status(&server, "a", "InService").await;
    // ウォームアップ2回 + 計測3フレーム
    Mock::given(method("POST"))
        .and(path("/endpoints/a/invocations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detection_body(20.0, 2, 0.8)))
        .expect(5)
        .mount(&server)
        .await;

    let images = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_test_images(images.path(), 3);
    let mut config = config_for(&server, &["a"], images.path(), output.path());
    config.warmup_count = 2;
    config.interval = Duration::from_millis(10);

    let outcome = Harness::with_http(config, ShutdownController::default())
        .unwrap()
        .execute()
        .await
        .unwrap();

    // ウォームアップ呼び出しは結果に含まれない
    assert_eq!(outcome.run.results.len(), 3);
    assert_eq!(outcome.summaries[0].samples, 3);
    server.verify().await;
}

#[tokio::test]
async fn test_shutdown_before_frames_writes_nothing() {
    let server = MockServer::start().await;
    mount_status(&server, "a", "InService").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let images = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_test_images(images.path(), 2);
    let config = config_for(&server, &["a"], images.path(), output.path());

    let shutdown = ShutdownController::default();
    shutdown.request_shutdown();
    let outcome = Harness::with_http(config, shutdown)
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert!(outcome.run.interrupted);
    assert!(outcome.run.results.is_empty());
    assert!(outcome.artifacts.is_none());
    server.verify().await;
}
