//! Detection endpoint benchmark harness
//!
//! 同一ワークロード（物体検出モデル）を提供する複数の推論エンドポイントに対し、
//! ペイロードサイズ上限の下でレイテンシ・信頼度・失敗挙動を計測する。

#![warn(missing_docs)]

/// 共通型定義（エラー型・ユーティリティ）
pub mod common;

/// 型定義
pub mod types;

/// 設定管理（環境変数ヘルパー・ベンチマーク設定）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// Cooperative shutdown controller (Ctrl-C between frames)
pub mod shutdown;

/// 画像圧縮（ペイロード上限への適応圧縮）
pub mod compress;

/// 推論エンドポイントへのトランスポート
pub mod runtime;

/// エンドポイントヘルスゲート
pub mod health;

/// ウォームアップ
pub mod warmup;

/// 単発呼び出しプローブ
pub mod probe;

/// フレーム単位の並列ディスパッチ
pub mod dispatch;

/// 集計とレポート出力
pub mod report;

/// ベンチマーク実行オーケストレーション
pub mod run;

/// CLIインターフェース
pub mod cli;
