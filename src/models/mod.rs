//! # 数据模型模块
//!
//! 定义合金参数、倒空间坐标、扫描数据和求解结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `rsm/` 和 `commands/` 使用
//! - 子模块: alloy, reciprocal, scan, solution

pub mod alloy;
pub mod reciprocal;
pub mod scan;
pub mod solution;

pub use alloy::{
    AlloyParameterSet, AlloyType, BinaryEndpointParameters, Bowing, Structure, TernaryParameters,
};
pub use reciprocal::{AxisPair, Hkl, ReciprocalPoint};
pub use scan::{Grid2, ScanData};
pub use solution::SolutionResult;
