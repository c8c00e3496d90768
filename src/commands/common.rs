//! # 子命令共享逻辑
//!
//! 材料表加载、扫描读取与坐标网格构建。
//!
//! ## 依赖关系
//! - 被 `commands/map.rs`, `commands/peaks.rs`, `commands/solve.rs`,
//!   `commands/theory.rs` 使用
//! - 使用 `parsers/`, `rsm/`

use crate::cli::common::{AlloyArgs, PlotArgs, Space, TransformArgs};
use crate::error::{Result, RsmError};
use crate::models::{Grid2, ScanData, TernaryParameters};
use crate::parsers;
use crate::rsm::constants::parse_wavelength;
use crate::rsm::plot::MapPlotOptions;
use crate::rsm::reciprocal;
use crate::rsm::solver::SolverConfig;
use crate::rsm::MaterialTable;

use std::path::Path;

/// 读入的扫描及其绘图坐标
pub struct LoadedMap {
    pub scan: ScanData,
    pub x: Grid2,
    pub y: Grid2,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

/// 读取扫描并构建指定坐标空间的网格
pub fn load_map(path: &Path, transform: &TransformArgs, space: Space) -> Result<LoadedMap> {
    let scan = parsers::parse_scan_file(path)?;

    let (x, y, x_label, y_label) = match space {
        Space::Real => (scan.two_theta_grid(), scan.omega_grid(), "2θ (°)", "ω (°)"),
        Space::Reciprocal => {
            let r_value = r_value(&scan, transform)?;
            let map = reciprocal::scan_to_reciprocal(
                &scan,
                transform.q_shift,
                r_value,
                transform.q_scale,
            )?;
            (map.qx, map.qy, "Qx", "Qy")
        }
    };

    Ok(LoadedMap {
        scan,
        x,
        y,
        x_label,
        y_label,
    })
}

/// 变换前因子 R：未指定时取 1/λ（λ 可由 --wavelength 覆盖）
pub fn r_value(scan: &ScanData, transform: &TransformArgs) -> Result<f64> {
    if let Some(r) = transform.r_value {
        return Ok(r);
    }

    let wavelength = match &transform.wavelength {
        Some(input) => parse_wavelength(input)?,
        None => scan.wavelength,
    };

    if wavelength > 0.0 {
        Ok(1.0 / wavelength)
    } else {
        Err(RsmError::DomainError(format!(
            "scan '{}' has wavelength {}; pass --wavelength or --r-value",
            scan.name, wavelength
        )))
    }
}

/// 材料表：内置材料 + 可选的自定义 CSV
pub fn material_table(args: &AlloyArgs) -> Result<MaterialTable> {
    match &args.materials {
        Some(path) => MaterialTable::builtin().load_csv(path),
        None => Ok(MaterialTable::builtin()),
    }
}

/// 组装三元参数，返回 (合金名称, 参数)
pub fn load_alloy(args: &AlloyArgs) -> Result<(String, TernaryParameters)> {
    let table = material_table(args)?;

    let (label, params) = match (&args.alloy, &args.binary_a, &args.binary_b) {
        (Some(name), _, _) => (name.clone(), table.alloy(name)?),
        (None, Some(a), Some(b)) => (format!("{}-{}", a, b), table.pair(a, b)?),
        _ => ("InGaN".to_string(), table.alloy("InGaN")?),
    };

    Ok((label, params.with_bowing(args.bowing)))
}

/// 由合金参数构建求解配置（求根选项保持默认）
pub fn solver_config(args: &AlloyArgs) -> SolverConfig {
    SolverConfig {
        alloy_type: args.alloy_type,
        structure: args.structure,
        hkl: args.hkl,
        scale: args.scale,
        shift: args.shift,
        ..SolverConfig::default()
    }
}

/// 由显示参数构建绘图选项（尺寸、阈值等保持默认）
pub fn plot_options(style: &PlotArgs, map: &LoadedMap, title: String) -> MapPlotOptions {
    MapPlotOptions {
        title,
        x_label: map.x_label.to_string(),
        y_label: map.y_label.to_string(),
        color_scale: style.color_scale,
        x_range: style.x_range,
        y_range: style.y_range,
        v_range: style.v_range,
        colorbar: style.colorbar,
        colorbar_label: style.colorbar_label.clone(),
        contour_levels: style.contours,
        ..MapPlotOptions::default()
    }
}
