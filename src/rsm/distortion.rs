//! # 弹性畸变系数
//!
//! 纤锌矿双轴应变下的 D = −2·C13 / C33，决定倒空间中应变线的斜率。
//!
//! ## 依赖关系
//! - 被 `rsm/alloy.rs` 调用

use crate::error::{Result, RsmError};
use crate::models::Structure;
use crate::rsm::constants::DIVISION_EPSILON;

/// 计算畸变系数
pub fn distortion_coefficient(c13: f64, c33: f64, structure: Structure) -> Result<f64> {
    match structure.ensure_supported()? {
        Structure::Wurtzite => wurtzite_distortion(c13, c33),
        other => Err(RsmError::UnsupportedStructure(other.to_string())),
    }
}

fn wurtzite_distortion(c13: f64, c33: f64) -> Result<f64> {
    if c33.abs() < DIVISION_EPSILON {
        return Err(RsmError::DomainError(format!(
            "distortion coefficient undefined for C33 = {}",
            c33
        )));
    }
    Ok(-2.0 * c13 / c33)
}
