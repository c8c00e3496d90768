//! # 共享 CLI 参数
//!
//! 多个子命令共用的参数组，通过 `#[command(flatten)]` 嵌入。
//!
//! ## 依赖关系
//! - 被 `cli/map.rs`, `cli/peaks.rs`, `cli/solve.rs`, `cli/theory.rs` 使用

use crate::models::reciprocal::parse_number_list;
use crate::models::{AlloyType, AxisPair, Bowing, Hkl, Structure};
use crate::rsm::constants::DEFAULT_SCALE;
use crate::rsm::plot::ColorScale;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 绘图/检测所用的坐标空间
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Space {
    /// 2θ vs ω (degrees)
    Real,
    /// Qx vs Qy
    #[default]
    Reciprocal,
}

impl std::fmt::Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Space::Real => write!(f, "real"),
            Space::Reciprocal => write!(f, "reciprocal"),
        }
    }
}

/// 测量图的倒空间变换参数
#[derive(Args, Debug, Clone)]
pub struct TransformArgs {
    /// Multiplier applied to measured Qx and Qy
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    pub q_scale: f64,

    /// Offset added to measured (Qx, Qy), e.g. "0,0" or "-12.5,4"
    #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
    pub q_shift: AxisPair,

    /// Prefactor R of the transform (default: 1/λ)
    #[arg(long)]
    pub r_value: Option<f64>,

    /// Override the scan wavelength: line name (e.g. "K-Alpha 1", cu-ka) or value in Å
    #[arg(short, long)]
    pub wavelength: Option<String>,
}

/// 合金与反射参数
#[derive(Args, Debug, Clone)]
pub struct AlloyArgs {
    /// Alloy preset: AlGaN, InGaN or InAlN (default: InGaN; composition = fraction of the first element)
    #[arg(long, conflicts_with_all = ["binary_a", "binary_b"])]
    pub alloy: Option<String>,

    /// Endpoint A material name (composition t is the fraction of A)
    #[arg(long, requires = "binary_b")]
    pub binary_a: Option<String>,

    /// Endpoint B material name
    #[arg(long, requires = "binary_a")]
    pub binary_b: Option<String>,

    /// Extra materials CSV with columns name,a,c,c13,c33
    #[arg(long, env = "RSMKIT_MATERIALS")]
    pub materials: Option<PathBuf>,

    /// Bowing parameters for a, c, C13, C33
    #[arg(long, default_value = "0,0,0,0", allow_hyphen_values = true)]
    pub bowing: Bowing,

    /// Reflection, e.g. "105", "1,0,5" or "(1 1 4)"
    #[arg(long, default_value = "105", allow_hyphen_values = true)]
    pub hkl: Hkl,

    /// Crystal structure (only wurtzite is implemented)
    #[arg(long, default_value = "wurtzite")]
    pub structure: Structure,

    /// Alloy type (only ternary is implemented)
    #[arg(long, default_value = "ternary")]
    pub alloy_type: AlloyType,

    /// Scale of theoretical (Qx, Qy): one value or "x,y"
    #[arg(long, default_value = "10000")]
    pub scale: AxisPair,

    /// Offset of displayed theoretical (Qx, Qy): one value or "x,y" (not used when solving)
    #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
    pub shift: AxisPair,
}

/// 峰位检测参数
#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    /// Gaussian smoothing sigma in pixels (no smoothing if omitted)
    #[arg(long)]
    pub sigma: Option<f64>,

    /// Intensity threshold applied after smoothing
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Keep only the N most intense peaks (0 = all)
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

/// 热图显示参数
#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    /// Color scale: linear or log
    #[arg(long, default_value = "linear")]
    pub color_scale: ColorScale,

    /// Intensity range covered by the color scale "vmin,vmax" (default: data range)
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    pub v_range: Option<(f64, f64)>,

    /// Horizontal axis limits "min,max" (default: whole map)
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    pub x_range: Option<(f64, f64)>,

    /// Vertical axis limits "min,max" (default: whole map)
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    pub y_range: Option<(f64, f64)>,

    /// Draw a color bar next to the map
    #[arg(long, default_value_t = false)]
    pub colorbar: bool,

    /// Label of the color bar
    #[arg(long, requires = "colorbar")]
    pub colorbar_label: Option<String>,

    /// Number of intensity contour lines (0 = none)
    #[arg(long, default_value_t = 0)]
    pub contours: usize,
}

/// 解析 "下限,上限"
pub fn parse_range(s: &str) -> Result<(f64, f64), String> {
    match parse_number_list(s).map_err(|e| e.to_string())?.as_slice() {
        &[lo, hi] if lo < hi => Ok((lo, hi)),
        &[lo, hi] => Err(format!("lower bound {} must be below upper bound {}", lo, hi)),
        _ => Err(format!("expected \"lower,upper\", got '{}'", s)),
    }
}
