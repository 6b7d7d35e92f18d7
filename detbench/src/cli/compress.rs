//! compress サブコマンド
//!
//! エンドポイントを呼ばずに、画像の圧縮結果だけを表示します。

use crate::compress::{CompressionParams, DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY};
use crate::config::{ceiling_from_mb, DEFAULT_IMAGE_FOLDER};
use crate::run::{discover_images, prepare_frames};
use clap::Args;
use std::path::PathBuf;

/// compress サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct CompressArgs {
    /// Folder containing test images
    #[arg(short, long, default_value = DEFAULT_IMAGE_FOLDER, env = "DETBENCH_IMAGE_FOLDER")]
    pub folder: PathBuf,

    /// Max image dimension for resizing
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION)]
    pub max_size: u32,

    /// JPEG compression quality 1-100
    #[arg(long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Payload ceiling in MB
    #[arg(long, default_value_t = 6.0)]
    pub max_payload_mb: f64,
}

/// Execute the compress command
pub async fn execute(args: &CompressArgs) -> Result<(), anyhow::Error> {
    if args.max_size == 0 {
        anyhow::bail!("max size must be greater than 0");
    }
    let params = CompressionParams {
        max_dimension: args.max_size,
        quality: args.quality,
        ceiling_bytes: ceiling_from_mb(args.max_payload_mb)?,
    };

    let images = discover_images(&args.folder)?;
    let frames = prepare_frames(&images, params).await?;

    println!("SOURCE\tORIGINAL\tCOMPRESSED\tQUALITY\tRATIO\tUNDER_LIMIT");
    for frame in &frames {
        let m = &frame.metadata;
        println!(
            "{}\t{:.2} MB ({})\t{:.2} MB ({})\t{}\t{}\t{}",
            m.source,
            m.original_size_mb(),
            m.original_dimensions,
            m.compressed_size_mb(),
            m.compressed_dimensions,
            m.final_quality,
            m.compression_ratio,
            m.under_limit
        );
    }

    let over = frames.iter().filter(|f| !f.metadata.under_limit).count();
    if over > 0 {
        println!("⚠️  {} of {} images still exceed the payload ceiling", over, frames.len());
    }
    Ok(())
}
