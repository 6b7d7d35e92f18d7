//! ウォームアップ
//!
//! 計測前に各エンドポイントへ決まった回数の呼び出しを順次行い、コールドスタートの
//! 影響を吸収する。応答は破棄する。失敗はログに残して残りの回数を続行し、
//! エンドポイントを計測対象から外すことはない。
//!
//! 計測経路と異なり、1回の呼び出しにつき限定的なリトライを許容する。

use crate::common::truncate_chars;
use crate::runtime::InvocationClient;
use crate::types::EndpointIdentity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 1回のウォームアップ呼び出しあたりの最大試行回数
pub const WARMUP_MAX_ATTEMPTS: u32 = 2;

/// ウォームアップ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmupReport {
    /// 対象エンドポイント
    pub endpoint: EndpointIdentity,
    /// 実行したウォームアップ回数
    pub attempted: u32,
    /// 成功した回数
    pub succeeded: u32,
}

/// ウォームアップコントローラ
#[derive(Clone)]
pub struct WarmupController {
    client: Arc<dyn InvocationClient>,
    count: u32,
    timeout: Duration,
    max_attempts: u32,
}

impl WarmupController {
    /// 新しいコントローラを作成
    pub fn new(client: Arc<dyn InvocationClient>, count: u32, timeout: Duration) -> Self {
        Self {
            client,
            count,
            timeout,
            max_attempts: WARMUP_MAX_ATTEMPTS,
        }
    }

    /// 1回あたりの最大試行回数を設定
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// 1エンドポイントをウォームアップする
    pub async fn warm_up(&self, endpoint: &EndpointIdentity, payload: &[u8]) -> WarmupReport {
        info!(
            endpoint = %endpoint,
            requests = self.count,
            "Warming up endpoint"
        );

        let mut succeeded = 0;
        for i in 1..=self.count {
            match self.call_with_retry(endpoint, payload).await {
                Ok(()) => {
                    succeeded += 1;
                    debug!(endpoint = %endpoint, "Warm-up {}/{} complete", i, self.count);
                }
                Err(e) => {
                    warn!(
                        endpoint = %endpoint,
                        error = %truncate_chars(&e, 50),
                        "Warm-up {}/{} failed",
                        i,
                        self.count
                    );
                }
            }
        }

        WarmupReport {
            endpoint: endpoint.clone(),
            attempted: self.count,
            succeeded,
        }
    }

    async fn call_with_retry(
        &self,
        endpoint: &EndpointIdentity,
        payload: &[u8],
    ) -> Result<(), String> {
        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self
                .client
                .invoke(endpoint, payload.to_vec(), self.timeout)
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => {
                    debug!(
                        endpoint = %endpoint,
                        attempt = attempt,
                        error = %e,
                        "Warm-up attempt failed"
                    );
                    last_error = e.to_string();
                }
            }
        }
        Err(last_error)
    }
}
