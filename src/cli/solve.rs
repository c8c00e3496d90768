//! # solve 子命令 CLI 定义
//!
//! 测量点来自命令行 (`--point`) 或扫描文件中检测到的峰 (`--input`)。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/solve.rs`

use super::common::{AlloyArgs, DetectArgs, PlotArgs, TransformArgs};
use crate::models::{AxisPair, ReciprocalPoint};
use crate::rsm::roots::RootMethod;

use clap::Args;
use std::path::PathBuf;

/// solve 子命令参数
#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Measured peak "qx,qy" (repeatable)
    #[arg(long, allow_hyphen_values = true, required_unless_present = "input")]
    pub point: Vec<ReciprocalPoint>,

    /// Scan file; every detected peak is solved
    #[arg(long, conflicts_with = "point")]
    pub input: Option<PathBuf>,

    /// Reference (substrate) peak "qx,qy" (default: relaxed endpoint B)
    #[arg(long, allow_hyphen_values = true)]
    pub reference: Option<ReciprocalPoint>,

    #[command(flatten)]
    pub alloy: AlloyArgs,

    #[command(flatten)]
    pub transform: TransformArgs,

    #[command(flatten)]
    pub detect: DetectArgs,

    /// Composition search interval "lower,upper"
    #[arg(long, default_value = "0,1")]
    pub interval: AxisPair,

    /// Root finding method: brentq or bisect
    #[arg(long, default_value = "brentq")]
    pub method: RootMethod,

    /// Absolute tolerance on the composition
    #[arg(long, default_value_t = 2e-12)]
    pub xtol: f64,

    /// Relative tolerance on the composition
    #[arg(long, default_value_t = 4.0 * f64::EPSILON)]
    pub rtol: f64,

    /// Maximum number of root finding iterations
    #[arg(long, default_value_t = 100)]
    pub max_iter: usize,

    /// Print every residual evaluation
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Write solutions to this CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Plot the map with peaks and relaxation lines (input mode, .png or .svg)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    #[command(flatten)]
    pub style: PlotArgs,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
