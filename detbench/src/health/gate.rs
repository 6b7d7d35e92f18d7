//! ヘルスゲート本体
//!
//! 各エンドポイントは独立に照会され、1件の照会失敗が他の評価を中断することはない。

use crate::runtime::StatusClient;
use crate::types::{EndpointIdentity, EndpointStatus};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

/// 1エンドポイントの判定結果
#[derive(Debug, Clone, PartialEq)]
pub struct HealthVerdict {
    /// 対象エンドポイント
    pub endpoint: EndpointIdentity,
    /// 提供中かどうか
    pub healthy: bool,
    /// 観測した状態、または照会失敗の理由
    pub observed: String,
}

impl HealthVerdict {
    fn from_status(endpoint: EndpointIdentity, status: &EndpointStatus) -> Self {
        Self {
            endpoint,
            healthy: status.is_serving(),
            observed: status.to_string(),
        }
    }
}

/// エンドポイントヘルスゲート
#[derive(Clone)]
pub struct HealthGate {
    client: Arc<dyn StatusClient>,
}

impl HealthGate {
    /// 新しいヘルスゲートを作成
    pub fn new(client: Arc<dyn StatusClient>) -> Self {
        Self { client }
    }

    /// 全エンドポイントを並列に照会する
    ///
    /// 戻り値は入力と同じ順序。
    pub async fn check_all(&self, endpoints: &[EndpointIdentity]) -> Vec<HealthVerdict> {
        if endpoints.is_empty() {
            info!("No endpoints to check");
            return Vec::new();
        }

        let verdicts: Vec<HealthVerdict> = stream::iter(endpoints.iter().cloned())
            .map(|endpoint| self.check_endpoint(endpoint))
            .buffered(endpoints.len())
            .collect()
            .await;

        let healthy = verdicts.iter().filter(|v| v.healthy).count();
        info!(
            healthy = healthy,
            total = verdicts.len(),
            "Endpoint health check completed"
        );
        verdicts
    }

    /// 提供中のエンドポイントだけを返す
    pub async fn filter_healthy(&self, endpoints: &[EndpointIdentity]) -> Vec<EndpointIdentity> {
        self.check_all(endpoints)
            .await
            .into_iter()
            .filter(|verdict| verdict.healthy)
            .map(|verdict| verdict.endpoint)
            .collect()
    }

    async fn check_endpoint(&self, endpoint: EndpointIdentity) -> HealthVerdict {
        let verdict = match self.client.describe(&endpoint).await {
            Ok(status) => HealthVerdict::from_status(endpoint, &status),
            Err(e) => HealthVerdict {
                endpoint,
                healthy: false,
                observed: e.to_string(),
            },
        };

        if verdict.healthy {
            info!(
                endpoint = %verdict.endpoint,
                status = %verdict.observed,
                "Endpoint healthy"
            );
        } else {
            warn!(
                endpoint = %verdict.endpoint,
                status = %verdict.observed,
                "Endpoint excluded from benchmark"
            );
        }
        verdict
    }
}
