//! 画像圧縮
//!
//! ペイロード上限に収まるよう画像を縮小・JPEG再エンコードする。
//!
//! 1. JPEGで扱えるカラーモード（`L` / `RGB`）へ正規化
//! 2. 長辺が `max_dimension` を超える場合のみアスペクト比を保って縮小（拡大はしない）
//! 3. 開始品質でエンコードし、上限を超えている間は品質を下げて再エンコード
//!
//! 品質の下限に達しても上限を超えている場合は `under_limit = false` をそのまま返し、
//! 送信するかどうかは呼び出し側が判断する。

use crate::common::error::BenchResult;
use crate::common::round_to;
use crate::types::{CompressionMetadata, Dimensions};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage};
use std::path::Path;
use tracing::debug;

/// サービング層が受け付けるペイロード上限（6 MB）
pub const DEFAULT_CEILING_BYTES: u64 = 6 * 1024 * 1024;

/// デフォルトの最大辺（px）
pub const DEFAULT_MAX_DIMENSION: u32 = 1280;

/// デフォルトのJPEG開始品質
pub const DEFAULT_QUALITY: u8 = 85;

/// これ以下の品質へは下げない
const QUALITY_FLOOR: u8 = 20;

/// 再エンコード毎に下げる品質幅
const QUALITY_STEP: u8 = 10;

/// 圧縮パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionParams {
    /// 最大辺（px）
    pub max_dimension: u32,
    /// 開始品質（1-100）
    pub quality: u8,
    /// ペイロード上限（バイト）
    pub ceiling_bytes: u64,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
            ceiling_bytes: DEFAULT_CEILING_BYTES,
        }
    }
}

/// ファイルから画像を読み込み圧縮する
pub fn compress_image(
    path: &Path,
    params: &CompressionParams,
) -> BenchResult<(Vec<u8>, CompressionMetadata)> {
    let bytes = std::fs::read(path)?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    compress_bytes(&source, &bytes, params)
}

/// メモリ上の画像バイト列を圧縮する
pub fn compress_bytes(
    source: &str,
    bytes: &[u8],
    params: &CompressionParams,
) -> BenchResult<(Vec<u8>, CompressionMetadata)> {
    let original_size_bytes = bytes.len() as u64;
    let decoded = image::load_from_memory(bytes)?;
    let original_dimensions = Dimensions::new(decoded.width(), decoded.height());
    let original_mode = color_mode_name(decoded.color());

    let normalized = normalize_color(decoded);
    let target = fit_within(original_dimensions, params.max_dimension);
    let prepared = if target != original_dimensions {
        normalized.resize_exact(target.width, target.height, FilterType::Lanczos3)
    } else {
        normalized
    };

    let mut quality = params.quality;
    let mut encoded = encode_jpeg(&prepared, quality)?;
    while encoded.len() as u64 > params.ceiling_bytes && quality > QUALITY_FLOOR {
        quality = quality.saturating_sub(QUALITY_STEP).max(1);
        encoded = encode_jpeg(&prepared, quality)?;
        debug!(
            source = %source,
            quality = quality,
            size_bytes = encoded.len(),
            "Re-encoded with lower quality"
        );
    }

    let compressed_size_bytes = encoded.len() as u64;
    let compression_ratio = if compressed_size_bytes > 0 {
        round_to(original_size_bytes as f64 / compressed_size_bytes as f64, 2)
    } else {
        0.0
    };

    let metadata = CompressionMetadata {
        source: source.to_string(),
        original_size_bytes,
        original_dimensions,
        original_mode: original_mode.to_string(),
        compressed_size_bytes,
        compressed_dimensions: target,
        final_quality: quality,
        compression_ratio,
        under_limit: compressed_size_bytes < params.ceiling_bytes,
    };

    Ok((encoded, metadata))
}

/// 長辺が `max_dimension` に収まるサイズを計算する（拡大しない）
pub fn fit_within(dimensions: Dimensions, max_dimension: u32) -> Dimensions {
    let Dimensions { width, height } = dimensions;
    if width <= max_dimension && height <= max_dimension {
        return dimensions;
    }
    let max = u64::from(max_dimension);
    if width >= height {
        let scaled = (u64::from(height) * max / u64::from(width)).max(1);
        Dimensions::new(max_dimension, scaled as u32)
    } else {
        let scaled = (u64::from(width) * max / u64::from(height)).max(1);
        Dimensions::new(scaled as u32, max_dimension)
    }
}

fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => image,
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> BenchResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image.write_with_encoder(encoder)?;
    Ok(buffer)
}

fn color_mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::BenchError;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn noise(width: u32, height: u32) -> DynamicImage {
        let mut state: u32 = 0x9E37_79B9;
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
            let mut next = || {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state & 0xFF) as u8
            };
            Rgb([next(), next(), next()])
        }))
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn params(ceiling_bytes: u64) -> CompressionParams {
        CompressionParams {
            ceiling_bytes,
            ..CompressionParams::default()
        }
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let dims = Dimensions::new(640, 480);
        assert_eq!(fit_within(dims, 1280), dims);
        let exact = Dimensions::new(1280, 1280);
        assert_eq!(fit_within(exact, 1280), exact);
    }

    #[test]
    fn test_fit_within_scales_larger_side_to_max() {
        assert_eq!(
            fit_within(Dimensions::new(2000, 1000), 1280),
            Dimensions::new(1280, 640)
        );
        assert_eq!(
            fit_within(Dimensions::new(3024, 4032), 1280),
            Dimensions::new(960, 1280)
        );
        assert_eq!(
            fit_within(Dimensions::new(10000, 3), 1280),
            Dimensions::new(1280, 1)
        );
    }

    #[test]
    fn test_small_image_is_not_resized() {
        let bytes = png_bytes(&gradient(64, 48));
        let (payload, metadata) = compress_bytes("small.png", &bytes, &params(DEFAULT_CEILING_BYTES))
            .expect("compression should succeed");

        assert_eq!(&payload[..2], &[0xFF, 0xD8]);
        assert_eq!(metadata.original_dimensions, Dimensions::new(64, 48));
        assert_eq!(metadata.compressed_dimensions, Dimensions::new(64, 48));
        assert_eq!(metadata.original_mode, "RGB");
        assert_eq!(metadata.final_quality, DEFAULT_QUALITY);
        assert_eq!(metadata.original_size_bytes, bytes.len() as u64);
        assert_eq!(metadata.compressed_size_bytes, payload.len() as u64);
        assert!(metadata.under_limit);
    }

    #[test]
    fn test_large_image_is_downscaled() {
        let bytes = png_bytes(&gradient(1600, 900));
        let (payload, metadata) =
            compress_bytes("large.png", &bytes, &params(DEFAULT_CEILING_BYTES)).unwrap();

        assert_eq!(metadata.compressed_dimensions, Dimensions::new(1280, 720));
        let decoded = image::load_from_memory(&payload).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1280, 720));
    }

    #[test]
    fn test_rgba_is_normalized_and_mode_reported() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 128])));
        let bytes = png_bytes(&rgba);
        let (payload, metadata) =
            compress_bytes("alpha.png", &bytes, &params(DEFAULT_CEILING_BYTES)).unwrap();

        assert_eq!(metadata.original_mode, "RGBA");
        let decoded = image::load_from_memory(&payload).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
    }

    #[test]
    fn test_quality_floor_reports_over_limit() {
        let bytes = png_bytes(&noise(256, 256));
        let (payload, metadata) = compress_bytes("noise.png", &bytes, &params(1024)).unwrap();

        // 85 -> 75 -> ... -> 25 -> 15
        assert_eq!(metadata.final_quality, 15);
        assert!(payload.len() as u64 > 1024);
        assert!(!metadata.under_limit);
    }

    #[test]
    fn test_output_never_larger_than_initial_encode() {
        let image = noise(256, 256);
        let bytes = png_bytes(&image);
        let baseline = encode_jpeg(&image, DEFAULT_QUALITY).unwrap().len();

        for ceiling in [1024, (baseline / 2) as u64, baseline as u64 * 2] {
            let (payload, _) = compress_bytes("noise.png", &bytes, &params(ceiling)).unwrap();
            assert!(payload.len() <= baseline);
        }
    }

    #[test]
    fn test_under_limit_is_strict() {
        let image = noise(128, 128);
        let bytes = png_bytes(&image);
        let baseline = encode_jpeg(&image, DEFAULT_QUALITY).unwrap().len() as u64;

        // 上限ちょうどは再エンコードしないが under_limit にもならない
        let (_, metadata) = compress_bytes("noise.png", &bytes, &params(baseline)).unwrap();
        assert_eq!(metadata.final_quality, DEFAULT_QUALITY);
        assert_eq!(metadata.compressed_size_bytes, baseline);
        assert!(!metadata.under_limit);

        let (_, metadata) = compress_bytes("noise.png", &bytes, &params(baseline + 1)).unwrap();
        assert!(metadata.under_limit);
    }

    #[test]
    fn test_compression_ratio_is_original_over_compressed() {
        let bytes = png_bytes(&gradient(300, 200));
        let (payload, metadata) =
            compress_bytes("ratio.png", &bytes, &params(DEFAULT_CEILING_BYTES)).unwrap();
        let expected = round_to(bytes.len() as f64 / payload.len() as f64, 2);
        assert_eq!(metadata.compression_ratio, expected);
    }

    #[test]
    fn test_invalid_bytes_are_an_image_error() {
        let result = compress_bytes("broken.png", b"not an image", &CompressionParams::default());
        assert!(matches!(result, Err(BenchError::Image(_))));
    }

    #[test]
    fn test_compress_image_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        std::fs::write(&path, png_bytes(&gradient(40, 30))).unwrap();

        let (_, metadata) = compress_image(&path, &CompressionParams::default()).unwrap();
        assert_eq!(metadata.source, "frame.png");
        assert_eq!(
            metadata.original_size_bytes,
            std::fs::metadata(&path).unwrap().len()
        );
    }
}
