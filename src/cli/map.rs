//! # map 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/map.rs`

use super::common::{PlotArgs, Space, TransformArgs};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum MapOutputFormat {
    /// PNG heat map
    Png,
    /// SVG heat map
    Svg,
    /// CSV long table (x, y, intensity)
    Csv,
}

impl MapOutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MapOutputFormat::Png => "png",
            MapOutputFormat::Svg => "svg",
            MapOutputFormat::Csv => "csv",
        }
    }
}

/// map 子命令参数
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Input: scan file (.xrdml) or directory containing scan files
    pub input: PathBuf,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "rsm_map.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<MapOutputFormat>,

    /// Coordinate space of the map
    #[arg(long, value_enum, default_value_t = Space::Reciprocal)]
    pub space: Space,

    #[command(flatten)]
    pub transform: TransformArgs,

    #[command(flatten)]
    pub style: PlotArgs,

    /// Pixels below this intensity are not drawn
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Draw the outline of the scanned area
    #[arg(long, default_value_t = false)]
    pub border: bool,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: scan name)
    #[arg(long)]
    pub title: Option<String>,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode)
    #[arg(long, default_value = "*.xrdml,*.xml")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
