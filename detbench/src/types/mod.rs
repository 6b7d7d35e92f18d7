//! 型定義モジュール
//!
//! エンドポイント識別子・フレーム・呼び出し結果の型を提供

pub mod endpoint;
pub mod frame;
pub mod result;

pub use endpoint::{EndpointIdentity, EndpointStatus};
pub use frame::{CompressionMetadata, Dimensions, Frame};
pub use result::{CallOutcome, CallResult, EndpointSummary, InferenceResponse, Measurement};
