//! # 统一错误处理模块
//!
//! 定义 rsmkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// rsmkit 统一错误类型
#[derive(Error, Debug)]
pub enum RsmError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 物理模型错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported structure type '{0}' (only 'wurtzite' is implemented)")]
    UnsupportedStructure(String),

    #[error("Unsupported alloy type '{0}' (only 'ternary' is implemented)")]
    UnsupportedAlloyType(String),

    #[error("Undefined quantity: {0}")]
    DomainError(String),

    // ─────────────────────────────────────────────────────────────
    // 求根错误
    // ─────────────────────────────────────────────────────────────
    #[error("Root finding did not converge after {iterations} iterations (last estimate {estimate:.6e}). Try another method or interval")]
    RootNotConverged { iterations: usize, estimate: f64 },

    #[error("Interval [{lower}, {upper}] does not bracket a root: f(lower) = {f_lower:.6e}, f(upper) = {f_upper:.6e}")]
    InvalidBracket {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, RsmError>;
