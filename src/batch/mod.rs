//! # 批量处理模块
//!
//! 提供统一的批量处理能力。
//!
//! ## 功能
//! - 收集目录下匹配的扫描文件
//! - 并行处理（文件级和峰级）
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/map.rs`, `commands/solve.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, ProcessResult};
