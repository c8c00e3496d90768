//! # peaks 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/peaks.rs`

use super::common::{DetectArgs, Space, TransformArgs};

use clap::Args;
use std::path::PathBuf;

/// peaks 子命令参数
#[derive(Args, Debug)]
pub struct PeaksArgs {
    /// Input scan file (.xrdml)
    pub input: PathBuf,

    /// Coordinate space of the reported peak positions
    #[arg(long, value_enum, default_value_t = Space::Reciprocal)]
    pub space: Space,

    #[command(flatten)]
    pub transform: TransformArgs,

    #[command(flatten)]
    pub detect: DetectArgs,

    /// Write detected peaks to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the smoothed (and not thresholded) map to this CSV file
    #[arg(long)]
    pub filtered: Option<PathBuf>,
}
