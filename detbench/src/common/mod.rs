//! 共通ユーティリティ

/// エラー型定義
pub mod error;

/// 文字数（char単位）で切り詰める
///
/// ログや標準出力に長いエラー本文を流さないために使う。
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// バイト数をMB（1024 * 1024）に換算
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// 指定桁数で四捨五入
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
