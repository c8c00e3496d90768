//! # 全局常量
//!
//! X 射线波长表与角度换算常数。只读查表，进程内共享。
//!
//! ## 依赖关系
//! - 被 `parsers/xrdml.rs` 用于把波长名称转换为数值
//! - 被 `rsm/reciprocal.rs` 使用角度换算常数
//! - 被 `cli/` 用于解析 `--wavelength`

use crate::error::{Result, RsmError};

use std::collections::HashMap;
use std::sync::LazyLock;

/// 1° = π/180 rad
pub const DEGREE_TO_RADIAN: f64 = std::f64::consts::PI / 180.0;

/// 倒空间坐标默认放大倍数（Qx, Qy 以 10⁻⁴ Å⁻¹ 为单位）
pub const DEFAULT_SCALE: f64 = 10_000.0;

/// 视为除零的阈值
pub const DIVISION_EPSILON: f64 = 1e-12;

/// X 射线波长表（Å），键为归一化名称（小写，去掉空格、连字符和下划线）
pub static WAVELENGTHS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // 仪器文件中的写法: "K-Alpha 1", "K-Alpha 2"
    m.insert("kalpha1", 1.5405980);
    m.insert("kalpha2", 1.5444260);

    // Cu
    m.insert("cuka", 1.5418);
    m.insert("cuka1", 1.5405980);
    m.insert("cuka2", 1.5444260);
    m.insert("cukb1", 1.3922);

    // Mo
    m.insert("moka", 0.7107);
    m.insert("moka1", 0.7093);

    // 其他靶材
    m.insert("coka", 1.7903);
    m.insert("feka", 1.9373);
    m.insert("crka", 2.2910);
    m.insert("agka", 0.5609);

    m
});

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// 按名称查找波长
pub fn lookup_wavelength(name: &str) -> Option<f64> {
    WAVELENGTHS.get(normalize_name(name).as_str()).copied()
}

/// 解析波长输入（辐射源名称或数值）
pub fn parse_wavelength(input: &str) -> Result<f64> {
    if let Some(wl) = lookup_wavelength(input) {
        return Ok(wl);
    }

    match input.trim().parse::<f64>() {
        Ok(wl) if wl > 0.0 => Ok(wl),
        _ => Err(RsmError::InvalidArgument(format!(
            "Invalid wavelength '{}'. Use a positive number (e.g., 1.540598) or a name: K-Alpha 1, K-Alpha 2, cu-ka, mo-ka, co-ka, fe-ka, cr-ka, ag-ka",
            input
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_names() {
        assert_eq!(lookup_wavelength("K-Alpha 1"), Some(1.5405980));
        assert_eq!(lookup_wavelength("K-Alpha 2"), Some(1.5444260));
        assert_eq!(lookup_wavelength("Cu-Ka1"), Some(1.5405980));
        assert_eq!(lookup_wavelength("unknown"), None);
    }

    #[test]
    fn test_parse_wavelength() {
        assert!((parse_wavelength("0.424589").unwrap() - 0.424589).abs() < 1e-12);
        assert!((parse_wavelength("mo-ka").unwrap() - 0.7107).abs() < 1e-12);
        assert!(parse_wavelength("-1").is_err());
        assert!(parse_wavelength("abc").is_err());
    }

    #[test]
    fn test_degree_to_radian() {
        assert!((DEGREE_TO_RADIAN - 0.017453292519943295).abs() < 1e-18);
        assert!((180.0 * DEGREE_TO_RADIAN - std::f64::consts::PI).abs() < 1e-15);
    }
}
