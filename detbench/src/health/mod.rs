//! エンドポイントヘルスゲート
//!
//! 計測開始前に全候補エンドポイントの状態を照会し、`InService` のものだけを残す。

pub mod gate;

pub use gate::{HealthGate, HealthVerdict};
