//! # 组分/弛豫求解结果
//!
//! ## 依赖关系
//! - 被 `rsm/solver.rs` 创建
//! - 被 `commands/solve.rs`, `rsm/export.rs` 使用

use crate::models::{AlloyParameterSet, ReciprocalPoint};

/// 单个峰的求解结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionResult {
    /// 合金组分 t ∈ [0, 1]
    pub composition: f64,
    /// 应变弛豫（%）
    pub relaxation_percent: f64,
    /// 求根是否收敛（返回的结果总是 true）
    pub converged: bool,
    /// 求根迭代次数
    pub iterations: usize,
    /// t* 处的合金参数
    pub alloy: AlloyParameterSet,
    /// 无应变点：t* 处的理论峰位
    pub no_strain_point: ReciprocalPoint,
    /// 完全应变点：与参考峰 Qx 相同、位于斜率 D 的应变线上
    pub full_strain_point: ReciprocalPoint,
}
