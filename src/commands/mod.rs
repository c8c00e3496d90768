//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。终端输出只在这一层进行。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `rsm/`, `batch/`, `utils/`
//! - 子模块: common, map, peaks, solve, theory

pub mod common;
pub mod map;
pub mod peaks;
pub mod solve;
pub mod theory;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Map(args) => map::execute(args),
        Commands::Peaks(args) => peaks::execute(args),
        Commands::Solve(args) => solve::execute(args),
        Commands::Theory(args) => theory::execute(args),
    }
}
