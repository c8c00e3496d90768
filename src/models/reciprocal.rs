//! # 倒空间坐标数据模型
//!
//! 定义倒空间点 (Qx, Qy)、Miller 指数以及分轴缩放/平移参数。
//!
//! ## 依赖关系
//! - 被 `rsm/reciprocal.rs`, `rsm/solver.rs` 和 `cli/` 使用
//! - 使用 `regex` 解析 hkl 字符串

use crate::error::{Result, RsmError};

use regex::Regex;
use serde::Serialize;
use std::str::FromStr;
use std::sync::LazyLock;

/// 倒空间中的一个点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReciprocalPoint {
    pub qx: f64,
    pub qy: f64,
}

impl ReciprocalPoint {
    pub fn new(qx: f64, qy: f64) -> Self {
        Self { qx, qy }
    }
}

impl std::fmt::Display for ReciprocalPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.qx, self.qy)
    }
}

/// 解析 "qx,qy" 形式的坐标
impl FromStr for ReciprocalPoint {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        match parse_number_list(s)?.as_slice() {
            [qx, qy] => Ok(ReciprocalPoint::new(*qx, *qy)),
            _ => Err(RsmError::InvalidArgument(format!(
                "Expected a point 'qx,qy', got '{}'",
                s
            ))),
        }
    }
}

/// 解析以逗号或空白分隔的数值列表
pub(crate) fn parse_number_list(s: &str) -> Result<Vec<f64>> {
    s.split([',', ' '])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| RsmError::InvalidArgument(format!("Invalid number '{}' in '{}'", p, s)))
        })
        .collect()
}

/// 分轴参数（缩放或平移）
///
/// 标量会同时作用于两个轴。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPair {
    pub x: f64,
    pub y: f64,
}

impl AxisPair {
    pub const ZERO: AxisPair = AxisPair { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(value: f64) -> Self {
        Self { x: value, y: value }
    }
}

impl From<f64> for AxisPair {
    fn from(value: f64) -> Self {
        AxisPair::uniform(value)
    }
}

impl From<(f64, f64)> for AxisPair {
    fn from((x, y): (f64, f64)) -> Self {
        AxisPair::new(x, y)
    }
}

impl From<[f64; 2]> for AxisPair {
    fn from([x, y]: [f64; 2]) -> Self {
        AxisPair::new(x, y)
    }
}

/// 解析 "v" 或 "x,y"
impl FromStr for AxisPair {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        let values = parse_number_list(s)?;

        match values.as_slice() {
            [v] => Ok(AxisPair::uniform(*v)),
            [x, y] => Ok(AxisPair::new(*x, *y)),
            _ => Err(RsmError::InvalidArgument(format!(
                "Expected one value or an 'x,y' pair, got '{}'",
                s
            ))),
        }
    }
}

/// Miller 指数 (hkl)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hkl {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl Hkl {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        Self { h, k, l }
    }
}

impl Default for Hkl {
    /// 非对称 (105) 反射
    fn default() -> Self {
        Hkl::new(1, 0, 5)
    }
}

impl std::fmt::Display for Hkl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.h, self.k, self.l)
    }
}

static HKL_SEPARATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?\s*(-?\d+)[\s,]+(-?\d+)[\s,]+(-?\d+)\s*\)?$").unwrap()
});

static HKL_COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?(-?\d)(-?\d)(-?\d)\)?$").unwrap());

/// 解析 "105", "1,0,5", "(1 0 5)", "1 0 -5"
impl FromStr for Hkl {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let caps = HKL_SEPARATED
            .captures(s)
            .or_else(|| HKL_COMPACT.captures(s))
            .ok_or_else(|| RsmError::InvalidArgument(format!("Invalid hkl '{}'", s)))?;

        let index = |i: usize| -> Result<i32> {
            caps[i]
                .parse()
                .map_err(|_| RsmError::InvalidArgument(format!("Invalid hkl '{}'", s)))
        };

        Ok(Hkl::new(index(1)?, index(2)?, index(3)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hkl_parse_forms() {
        let expected = Hkl::new(1, 0, 5);
        assert_eq!("105".parse::<Hkl>().unwrap(), expected);
        assert_eq!("1,0,5".parse::<Hkl>().unwrap(), expected);
        assert_eq!("(1 0 5)".parse::<Hkl>().unwrap(), expected);
        assert_eq!("1 0 -5".parse::<Hkl>().unwrap(), Hkl::new(1, 0, -5));
        assert_eq!("(11 0 2)".parse::<Hkl>().unwrap(), Hkl::new(11, 0, 2));
        assert!("10".parse::<Hkl>().is_err());
        assert!("abc".parse::<Hkl>().is_err());
    }

    #[test]
    fn test_axis_pair_parse() {
        assert_eq!("10000".parse::<AxisPair>().unwrap(), AxisPair::uniform(10000.0));
        assert_eq!(
            "1.5, -2".parse::<AxisPair>().unwrap(),
            AxisPair::new(1.5, -2.0)
        );
        assert!("1,2,3".parse::<AxisPair>().is_err());
        assert!("x".parse::<AxisPair>().is_err());
    }

    #[test]
    fn test_axis_pair_from_scalar_and_pair() {
        assert_eq!(AxisPair::from(2.0), AxisPair::new(2.0, 2.0));
        assert_eq!(AxisPair::from((1.0, 3.0)), AxisPair::new(1.0, 3.0));
        assert_eq!(AxisPair::from([4.0, 5.0]), AxisPair::new(4.0, 5.0));
    }

    #[test]
    fn test_point_requires_two_values() {
        let p: ReciprocalPoint = "3608.4,9615.4".parse().unwrap();
        assert!((p.qx - 3608.4).abs() < 1e-9);
        assert!((p.qy - 9615.4).abs() < 1e-9);
        assert!("3608.4".parse::<ReciprocalPoint>().is_err());
    }
}
