//! 推論エンドポイントへのトランスポート
//!
//! 呼び出し（invoke）と状態照会（describe）をtraitで抽象化し、
//! テストではモックエンドポイントに差し替えられるようにする。

pub mod http;

use crate::common::error::BenchResult;
use crate::types::{EndpointIdentity, EndpointStatus};
use async_trait::async_trait;
use std::time::Duration;

pub use http::HttpServingClient;

/// 推論リクエストのContent-Type
pub const IMAGE_CONTENT_TYPE: &str = "application/x-image";

/// 推論呼び出しのトランスポート
///
/// 実装は自動リトライを行ってはならない（リトライ方針は呼び出し側が決める）。
#[async_trait]
pub trait InvocationClient: Send + Sync {
    /// 画像バイト列を1回送信し、応答ボディを返す
    async fn invoke(
        &self,
        endpoint: &EndpointIdentity,
        body: Vec<u8>,
        timeout: Duration,
    ) -> BenchResult<Vec<u8>>;
}

/// エンドポイント状態の照会
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// エンドポイントの現在の状態を取得
    async fn describe(&self, endpoint: &EndpointIdentity) -> BenchResult<EndpointStatus>;
}
