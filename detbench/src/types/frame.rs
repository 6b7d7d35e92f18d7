//! フレーム（圧縮済み画像1枚分の作業単位）

use crate::common::{bytes_to_mb, round_to};
use std::sync::Arc;

/// 画像サイズ（ピクセル）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// 幅
    pub width: u32,
    /// 高さ
    pub height: u32,
}

impl Dimensions {
    /// 新しいサイズを作成
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 圧縮処理のメタデータ
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionMetadata {
    /// 元画像の名前（ファイル名）
    pub source: String,
    /// 元画像のバイト数
    pub original_size_bytes: u64,
    /// 元画像のサイズ
    pub original_dimensions: Dimensions,
    /// 元画像のカラーモード（`RGB`, `RGBA`, `L` など）
    pub original_mode: String,
    /// 圧縮後のバイト数
    pub compressed_size_bytes: u64,
    /// 圧縮後のサイズ
    pub compressed_dimensions: Dimensions,
    /// 最終的なJPEG品質
    pub final_quality: u8,
    /// 圧縮率（元 / 圧縮後、小数2桁）
    pub compression_ratio: f64,
    /// 圧縮後サイズが上限未満か
    pub under_limit: bool,
}

impl CompressionMetadata {
    /// 元画像サイズ（MB、小数2桁）
    pub fn original_size_mb(&self) -> f64 {
        round_to(bytes_to_mb(self.original_size_bytes), 2)
    }

    /// 圧縮後サイズ（MB、小数2桁）
    pub fn compressed_size_mb(&self) -> f64 {
        round_to(bytes_to_mb(self.compressed_size_bytes), 2)
    }
}

/// 全エンドポイントへ送信される1フレーム
///
/// ペイロードは全エンドポイントで共有され、エンドポイント毎に再圧縮しない。
#[derive(Debug, Clone)]
pub struct Frame {
    /// ラン内の通し番号（0始まり）
    pub index: usize,
    /// 圧縮済みJPEGバイト列
    pub payload: Arc<Vec<u8>>,
    /// 圧縮メタデータ
    pub metadata: CompressionMetadata,
}

impl Frame {
    /// 新しいフレームを作成
    pub fn new(index: usize, payload: Vec<u8>, metadata: CompressionMetadata) -> Self {
        Self {
            index,
            payload: Arc::new(payload),
            metadata,
        }
    }

    /// ペイロードのバイト数
    pub fn payload_len(&self) -> u64 {
        self.payload.len() as u64
    }
}
