//! # 合金参数数据模型
//!
//! 定义二元端点材料参数、三元合金插值结果以及结构/合金类型。
//!
//! ## 依赖关系
//! - 被 `rsm/alloy.rs`, `rsm/distortion.rs`, `rsm/materials.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, RsmError};
use crate::models::reciprocal::parse_number_list;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 晶体结构类型
///
/// 目前只实现了纤锌矿 (wurtzite)。闪锌矿可以被识别，但任何计算都会返回
/// `UnsupportedStructure`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Structure {
    #[default]
    Wurtzite,
    ZincBlende,
}

impl Structure {
    /// 检查结构是否已实现
    pub fn ensure_supported(self) -> Result<Self> {
        match self {
            Structure::Wurtzite => Ok(self),
            other => Err(RsmError::UnsupportedStructure(other.to_string())),
        }
    }
}

impl std::fmt::Display for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Structure::Wurtzite => write!(f, "wurtzite"),
            Structure::ZincBlende => write!(f, "zincblende"),
        }
    }
}

impl FromStr for Structure {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "wurtzite" | "wz" => Ok(Structure::Wurtzite),
            "zincblende" | "zinc-blende" | "zb" => Ok(Structure::ZincBlende),
            other => Err(RsmError::UnsupportedStructure(other.to_string())),
        }
    }
}

/// 合金类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlloyType {
    #[default]
    Ternary,
    Quaternary,
}

impl AlloyType {
    /// 检查合金类型是否已实现
    pub fn ensure_supported(self) -> Result<Self> {
        match self {
            AlloyType::Ternary => Ok(self),
            other => Err(RsmError::UnsupportedAlloyType(other.to_string())),
        }
    }
}

impl std::fmt::Display for AlloyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlloyType::Ternary => write!(f, "ternary"),
            AlloyType::Quaternary => write!(f, "quaternary"),
        }
    }
}

impl FromStr for AlloyType {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ternary" => Ok(AlloyType::Ternary),
            "quaternary" => Ok(AlloyType::Quaternary),
            other => Err(RsmError::UnsupportedAlloyType(other.to_string())),
        }
    }
}

/// 二元化合物端点参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryEndpointParameters {
    /// 面内晶格常数 a（Å）
    pub lattice_a: f64,
    /// 面外晶格常数 c（Å）
    pub lattice_c: f64,
    /// 弹性常数 C13（GPa）
    pub elastic_c13: f64,
    /// 弹性常数 C33（GPa）
    pub elastic_c33: f64,
}

impl BinaryEndpointParameters {
    pub fn new(lattice_a: f64, lattice_c: f64, elastic_c13: f64, elastic_c33: f64) -> Self {
        Self {
            lattice_a,
            lattice_c,
            elastic_c13,
            elastic_c33,
        }
    }
}

/// 各参数的弯曲系数
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bowing {
    pub lattice_a: f64,
    pub lattice_c: f64,
    pub elastic_c13: f64,
    pub elastic_c33: f64,
}

/// 解析 "a,c,c13,c33" 四个弯曲系数
impl FromStr for Bowing {
    type Err = RsmError;

    fn from_str(s: &str) -> Result<Self> {
        match parse_number_list(s)?.as_slice() {
            &[a, c, c13, c33] => Ok(Bowing {
                lattice_a: a,
                lattice_c: c,
                elastic_c13: c13,
                elastic_c33: c33,
            }),
            other => Err(RsmError::InvalidArgument(format!(
                "bowing needs 4 values (a,c,c13,c33), got {}",
                other.len()
            ))),
        }
    }
}

/// 三元合金输入：两个二元端点加弯曲系数
///
/// 组分 t 表示端点 A 的含量：t = 1 时为纯 A，t = 0 时为纯 B。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryParameters {
    pub endpoint_a: BinaryEndpointParameters,
    pub endpoint_b: BinaryEndpointParameters,
    pub bowing: Bowing,
}

impl TernaryParameters {
    pub fn new(endpoint_a: BinaryEndpointParameters, endpoint_b: BinaryEndpointParameters) -> Self {
        Self {
            endpoint_a,
            endpoint_b,
            bowing: Bowing::default(),
        }
    }

    pub fn with_bowing(mut self, bowing: Bowing) -> Self {
        self.bowing = bowing;
        self
    }
}

/// 组分 t 处的合金参数（含畸变系数 D）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlloyParameterSet {
    pub a: f64,
    pub c: f64,
    pub c13: f64,
    pub c33: f64,
    /// 畸变系数 D = -2 C13 / C33
    pub d: f64,
}
