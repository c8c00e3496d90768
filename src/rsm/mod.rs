//! # 倒空间图 (RSM) 分析模块
//!
//! 外延纤锌矿三元合金薄膜的组分与应变弛豫分析。
//!
//! ## 子模块
//! - `constants`: 角度换算、默认缩放、X 射线波长表
//! - `materials`: 二元端点材料数据库
//! - `alloy`: 三元合金参数插值
//! - `distortion`: 弹性畸变系数
//! - `reciprocal`: 实空间 → 倒空间变换与理论峰位
//! - `roots`: 区间求根（Brent / 二分）
//! - `solver`: 组分与弛豫求解
//! - `peaks`: 峰位检测
//! - `plot`: 热图生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`

pub mod alloy;
pub mod constants;
pub mod distortion;
pub mod export;
pub mod materials;
pub mod peaks;
pub mod plot;
pub mod reciprocal;
pub mod roots;
pub mod solver;

pub use materials::MaterialTable;
